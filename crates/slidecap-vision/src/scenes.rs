//! 장면 경계 감지.
//!
//! 약 1초 간격으로 샘플링한 프레임 사이의 거친 차이만으로 큰 시각적
//! 전환을 싸게 찾는다. 슬라이드 수준 비교보다 낮은 임계값(reject 전용)을
//! 쓰고, 최소/최대 장면 길이 제약을 지킨다. 이 패스는 읽기 전용이며
//! 디코드 비용이 지배적이라 순차 스캔으로 충분하다.

use std::sync::atomic::{AtomicBool, Ordering};

use image::DynamicImage;
use slidecap_core::config::{ComparatorConfig, SceneConfig};
use slidecap_core::error::CoreError;
use slidecap_core::ports::frame_source::FrameSource;
use tracing::{debug, info, warn};

use crate::histogram;
use crate::ssim;

/// 장면 경계 프레임 인덱스 목록 감지.
///
/// 반환 목록은 정렬·중복 제거되며 항상 0과 `total_frames - 1`을 포함한다.
/// 인접 경계는 `min_scene_secs` 이상 떨어져 있고, `max_scene_secs`를
/// 넘기면 변화가 없어도 경계를 강제 삽입한다.
pub fn detect_scene_boundaries(
    source: &dyn FrameSource,
    comparator: &ComparatorConfig,
    scene: &SceneConfig,
    stop: &AtomicBool,
) -> Result<Vec<u64>, CoreError> {
    let fps = source.fps();
    let total_frames = source.frame_count();

    let sample_rate = (fps.round() as u64).max(1);
    let min_scene_frames = (fps * scene.min_scene_secs) as u64;
    let max_scene_frames = (fps * scene.max_scene_secs) as u64;
    let threshold = comparator.scene_threshold();

    let mut boundaries: Vec<u64> = vec![0];
    let mut prev_sample: Option<DynamicImage> = None;
    let mut last_boundary = 0u64;

    let mut index = 0u64;
    while index < total_frames {
        if stop.load(Ordering::Relaxed) {
            info!("장면 감지 중단 요청 (경계 {}개 확보)", boundaries.len());
            break;
        }

        // 마지막 경계에 너무 가까우면 디코드 없이 건너뜀
        if index - last_boundary < min_scene_frames {
            index += sample_rate;
            continue;
        }

        // 최대 장면 길이 초과 — 변화가 없어도 경계 강제 삽입
        if index - last_boundary > max_scene_frames {
            boundaries.push(index);
            last_boundary = index;
            index += sample_rate;
            continue;
        }

        let frame = match source.fetch_frame(index) {
            Ok(f) => f,
            Err(e) => {
                warn!("장면 샘플 {index} 디코드 실패 (건너뜀): {e}");
                index += sample_rate;
                continue;
            }
        };

        if let Some(prev) = &prev_sample {
            let diff = match coarse_difference(prev, &frame, comparator) {
                Ok(d) => d,
                Err(e) => {
                    // 계산 실패는 보수적으로 큰 전환으로 취급
                    warn!("장면 샘플 {index} 비교 실패 (경계로 간주): {e}");
                    1.0
                }
            };

            if diff > threshold {
                debug!("장면 경계 감지: frame {index} (diff {diff:.3})");
                boundaries.push(index);
                last_boundary = index;
            }
        }

        prev_sample = Some(frame);
        index += sample_rate;
    }

    // 마지막 프레임은 항상 포함
    if total_frames > 0 {
        boundaries.push(total_frames - 1);
    }

    boundaries.sort_unstable();
    boundaries.dedup();

    info!("장면 감지 완료: 경계 {}개", boundaries.len());
    Ok(boundaries)
}

/// 거친 프레임 차이 (0 = 동일, 1 = 완전히 다름).
///
/// 히스토그램이 확실히 크면 즉시 결론 내고, 애매한 경우에만 SSIM으로
/// 에스컬레이션한다 — 슬라이드 분류기와 같은 2단계 패턴.
pub(crate) fn coarse_difference(
    a: &DynamicImage,
    b: &DynamicImage,
    comparator: &ComparatorConfig,
) -> Result<f32, CoreError> {
    let hist = histogram::distance(a, b)?;
    if hist > comparator.histogram_threshold + 0.1 {
        return Ok(1.0);
    }

    let s = ssim::similarity(&a.to_luma8(), &b.to_luma8())?;
    Ok(1.0 - s)
}
