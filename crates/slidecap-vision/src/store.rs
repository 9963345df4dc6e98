//! 슬라이드 스토어와 사후 중복 제거.
//!
//! 스토어는 추출 중에는 append-only다. 추출이 끝난 뒤 중복 제거 패스가
//! 시간순으로 전체를 재검사해, 순차 분류기가 합치지 못한 근접 중복을
//! 같은 해밍 게이트(더 공격적인 단일 구간)로 걸러낸다. 항상 먼저 나온
//! 슬라이드가 정본으로 남는다.

use chrono::Utc;
use image::DynamicImage;
use serde::Serialize;
use slidecap_core::config::ComparatorConfig;
use slidecap_core::error::CoreError;
use slidecap_core::models::frame::DecodedFrame;
use slidecap_core::models::slide::{Slide, SlideImage};
use tracing::{debug, info, warn};

use crate::encoder::{self, WebPQuality};
use crate::phash;
use crate::resize;
use crate::ssim;

/// 추출 중 수락된 슬라이드의 단독 소유자
#[derive(Default)]
pub struct SlideStore {
    slides: Vec<Slide>,
    next_id: u64,
}

/// 이미지 바이트를 제외한 슬라이드 메타데이터 (외부 인덱스용)
#[derive(Debug, Serialize)]
struct SlideMetaView {
    id: u64,
    frame_index: u64,
    timestamp_secs: f64,
    extracted_at: chrono::DateTime<Utc>,
    format: String,
    hash: String,
    has_text: bool,
}

impl SlideStore {
    /// 빈 스토어 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 수락된 후보를 WebP로 인코딩해 슬라이드로 승격. 부여된 id 반환.
    pub fn accept(&mut self, frame: &DecodedFrame) -> Result<u64, CoreError> {
        let hash = phash::compute(&frame.image)?;
        let data = encoder::encode_webp(&frame.image, WebPQuality::High)?;

        let id = self.next_id;
        self.next_id += 1;

        debug!(
            "슬라이드 #{id} 수락: frame {} ({:.1}s, {} bytes)",
            frame.meta.index,
            frame.meta.timestamp_secs,
            data.len()
        );

        self.slides.push(Slide {
            id,
            frame_index: frame.meta.index,
            timestamp_secs: frame.meta.timestamp_secs,
            extracted_at: Utc::now(),
            image: SlideImage {
                data,
                format: "webp".to_string(),
            },
            hash,
            cached_text: None,
        });

        Ok(id)
    }

    /// 현재 슬라이드 수
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// 슬라이드 목록 참조
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// 소유권을 넘기며 슬라이드 목록 반환
    pub fn into_slides(self) -> Vec<Slide> {
        self.slides
    }

    /// 슬라이드 텍스트 lazy 조회 — 첫 요청 시에만 OCR을 수행하고 캐시한다
    pub fn slide_text(
        &mut self,
        id: u64,
        extractor: &dyn slidecap_core::ports::text_extractor::TextExtractor,
    ) -> Result<String, CoreError> {
        let slide = self
            .slides
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::Validation {
                field: "slide_id".to_string(),
                message: format!("슬라이드 #{id} 없음"),
            })?;

        if let Some(text) = &slide.cached_text {
            return Ok(text.clone());
        }

        let image = encoder::decode_webp(&slide.image.data)?;
        let text = extractor.extract_text(&image)?;
        slide.cached_text = Some(text.clone());
        Ok(text)
    }

    /// 이미지 바이트를 제외한 메타데이터 JSON
    pub fn metadata_json(&self) -> Result<String, CoreError> {
        let views: Vec<SlideMetaView> = self
            .slides
            .iter()
            .map(|s| SlideMetaView {
                id: s.id,
                frame_index: s.frame_index,
                timestamp_secs: s.timestamp_secs,
                extracted_at: s.extracted_at,
                format: s.image.format.clone(),
                hash: s.hash.to_string(),
                has_text: s.cached_text.is_some(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&views)?)
    }
}

/// 사후 중복 제거 패스.
///
/// 시간순으로 각 슬라이드를 현재까지 *유지된* 모든 슬라이드와 비교한다.
/// 해밍 거리가 `dedup_hash_band` 미만이면 즉시 중복, `dedup_escalate_band`
/// 이하의 경계 구간은 저장된 이미지를 디코드해 SSIM으로 직접 확인한다.
/// 이 패스는 저장 이미지만 쓰므로 프레임별 영역 정보(마스킹)는 없다.
/// 중복으로 판정된 나중 슬라이드가 제거되고 백킹 바이트도 함께 해제된다.
pub fn deduplicate(slides: Vec<Slide>, cfg: &ComparatorConfig) -> Vec<Slide> {
    if slides.len() <= 1 {
        return slides;
    }

    let total = slides.len();
    let mut slides = slides;
    slides.sort_by(|a, b| {
        a.timestamp_secs
            .partial_cmp(&b.timestamp_secs)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });

    let mut kept: Vec<Slide> = Vec::with_capacity(total);

    for slide in slides {
        let mut duplicate_of = None;

        for existing in &kept {
            let hash_dist = slide.hash.distance(existing.hash);

            if hash_dist < cfg.dedup_hash_band {
                duplicate_of = Some(existing.id);
                break;
            }

            // 경계 구간 — 저장 이미지를 직접 비교
            if hash_dist <= cfg.dedup_escalate_band {
                match escalated_duplicate(&slide, existing, cfg) {
                    Ok(true) => {
                        duplicate_of = Some(existing.id);
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        // 비교 불능이면 유지가 안전하다 — 슬라이드 손실 방지
                        warn!("중복 에스컬레이션 비교 실패 (유지): {e}");
                    }
                }
            }
        }

        match duplicate_of {
            Some(original) => {
                debug!("슬라이드 #{} 제거 — #{original}의 중복", slide.id);
            }
            None => kept.push(slide),
        }
    }

    if kept.len() < total {
        info!("중복 제거: {}개 → {}개", total, kept.len());
    }
    kept
}

/// 저장된 두 슬라이드 이미지를 디코드해 SSIM으로 중복 여부 판정
fn escalated_duplicate(
    candidate: &Slide,
    original: &Slide,
    cfg: &ComparatorConfig,
) -> Result<bool, CoreError> {
    let img_cand = encoder::decode_webp(&candidate.image.data)?;
    let img_orig = encoder::decode_webp(&original.image.data)?;

    // 해상도가 다르면 후보 기준으로 정합
    let img_orig: DynamicImage = if img_orig.width() != img_cand.width()
        || img_orig.height() != img_cand.height()
    {
        resize::fast_resize(&img_orig, img_cand.width(), img_cand.height())?
    } else {
        img_orig
    };

    let s = ssim::similarity(&img_cand.to_luma8(), &img_orig.to_luma8())?;
    Ok(s > cfg.similarity_threshold - cfg.ssim_override_offset)
}
