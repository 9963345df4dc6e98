//! 슬라이드 추출 오케스트레이터.
//!
//! 장면 감지 → 적응 샘플링 → 병렬 디코드 → 순차 분류 → 중복 제거.
//! 디코드는 프레임별로 독립이라 제한된 워커 풀에서 병렬화하고, 결과는
//! 반드시 타임스탬프 순으로 재정렬해 분류기에 공급한다 — 각 판정이
//! 마지막 수락 슬라이드에 의존하므로 분류 단계는 엄격히 순차적이다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use slidecap_core::config::ExtractorConfig;
use slidecap_core::error::CoreError;
use slidecap_core::models::frame::{DecodedFrame, FrameMeta};
use slidecap_core::models::slide::Slide;
use slidecap_core::ports::frame_source::FrameSource;
use slidecap_core::ports::pipeline::SlidePipeline;
use slidecap_core::ports::region_detector::RegionDetector;
use slidecap_core::ports::text_extractor::TextExtractor;
use tracing::{info, warn};

use crate::classifier::{SlideChangeClassifier, Verdict};
use crate::sampler;
use crate::scenes;
use crate::store::{self, SlideStore};
use crate::text_cache::TextCache;

/// 슬라이드 추출 파이프라인 — [`SlidePipeline`] 포트 구현
pub struct SlideExtractor {
    source: Arc<dyn FrameSource>,
    region_detector: Option<Arc<dyn RegionDetector>>,
    text_extractor: Option<Arc<dyn TextExtractor>>,
    config: ExtractorConfig,
    stop: Arc<AtomicBool>,
}

impl SlideExtractor {
    /// 새 추출기 생성. 설정은 이 시점에 한 번 검증되고 이후 불변이다.
    pub fn new(source: Arc<dyn FrameSource>, config: ExtractorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            source,
            region_detector: None,
            text_extractor: None,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// 프레젠터 영역 감지기 주입
    pub fn with_region_detector(mut self, detector: Arc<dyn RegionDetector>) -> Self {
        self.region_detector = Some(detector);
        self
    }

    /// OCR 텍스트 추출기 주입
    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text_extractor = Some(extractor);
        self
    }

    /// 설정의 tessdata 경로로 내장 Tesseract 추출기 구성 (`ocr` feature)
    #[cfg(feature = "ocr")]
    pub fn with_builtin_ocr(mut self) -> Self {
        let extractor = crate::ocr::LeptessTextExtractor::new(self.config.ocr.tessdata_path.clone())
            .with_max_chars(self.config.ocr.max_chars);
        self.text_extractor = Some(Arc::new(extractor));
        self
    }

    /// 협조적 중단 플래그 핸들 — 다른 스레드/태스크에서 중단 요청용
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// 전체 추출 실행
    pub async fn extract_slides(&mut self) -> Result<Vec<Slide>, CoreError> {
        let frame_count = self.source.frame_count();
        let fps = self.source.fps();

        // 유일한 치명적 조건 — 나머지 에러는 모두 보수적 폴백으로 흡수된다
        if frame_count == 0 || fps <= 0.0 {
            return Err(CoreError::EmptySource { frame_count, fps });
        }

        info!(
            "추출 시작: {frame_count}프레임, {fps:.2}fps ({:.1}초)",
            frame_count as f64 / fps
        );

        let candidates = self.candidate_frames()?;
        info!("후보 프레임 {}개 분석 예정", candidates.len());

        let frames = self.decode_candidates(candidates).await;

        let mut classifier = SlideChangeClassifier::new(
            self.config.comparator.clone(),
            TextCache::new(self.config.ocr.text_cache_capacity),
            self.config.ocr.min_plausibility,
        );
        if self.config.mask_presenter_regions {
            if let Some(detector) = &self.region_detector {
                classifier = classifier.with_region_detector(Arc::clone(detector));
            }
        }
        if let Some(extractor) = &self.text_extractor {
            classifier = classifier.with_text_extractor(Arc::clone(extractor));
        }

        let mut slide_store = SlideStore::new();
        for frame in &frames {
            if self.stop.load(Ordering::Relaxed) {
                info!(
                    "중단 요청 — 수락된 슬라이드 {}개는 유효하게 유지",
                    slide_store.len()
                );
                break;
            }

            match classifier.observe(frame)? {
                Verdict::Accepted => {
                    // 저장 실패(손상 버퍼 등)는 해당 슬라이드만 포기한다
                    if let Err(e) = slide_store.accept(frame) {
                        warn!("슬라이드 저장 실패 (건너뜀): {e}");
                    }
                }
                Verdict::Rejected => {}
            }
        }

        let accepted = slide_store.len();
        let slides = store::deduplicate(slide_store.into_slides(), &self.config.comparator);
        info!("추출 완료: 수락 {accepted}개 → 중복 제거 후 {}개", slides.len());

        Ok(slides)
    }

    /// 후보 프레임 목록 결정 (장면 기반 적응 또는 고정 간격)
    fn candidate_frames(&self) -> Result<Vec<u64>, CoreError> {
        let fps = self.source.fps();
        let total_frames = self.source.frame_count();

        if self.config.sampling.adaptive {
            let boundaries = scenes::detect_scene_boundaries(
                self.source.as_ref(),
                &self.config.comparator,
                &self.config.scene,
                &self.stop,
            )?;
            Ok(sampler::adaptive_frame_numbers(&boundaries, fps, total_frames))
        } else {
            Ok(sampler::fixed_frame_numbers(
                self.config.sampling.fixed_interval_secs,
                fps,
                total_frames,
            ))
        }
    }

    /// 후보 프레임 병렬 디코드 (워커 수 제한) 후 타임스탬프 순 정렬.
    ///
    /// 디코드 실패는 해당 후보만 건너뛴다.
    async fn decode_candidates(&self, frame_numbers: Vec<u64>) -> Vec<DecodedFrame> {
        let fps = self.source.fps();
        let workers = self.config.decode_workers;

        let tasks = frame_numbers.into_iter().map(|index| {
            let source = Arc::clone(&self.source);
            async move {
                tokio::task::spawn_blocking(move || match source.fetch_frame(index) {
                    Ok(image) => Some(DecodedFrame {
                        meta: FrameMeta::from_index(index, fps),
                        image,
                    }),
                    Err(e) => {
                        warn!("프레임 {index} 디코드 실패 (건너뜀): {e}");
                        None
                    }
                })
                .await
                .unwrap_or_else(|e| {
                    warn!("디코드 작업 조인 실패: {e}");
                    None
                })
            }
        });

        let results: Vec<Option<DecodedFrame>> = futures::stream::iter(tasks)
            .buffer_unordered(workers)
            .collect()
            .await;

        // 분류는 순차 상태 머신이므로 도착 순서와 무관하게 재정렬
        let mut decoded: Vec<DecodedFrame> = results.into_iter().flatten().collect();
        decoded.sort_by_key(|f| f.meta.index);
        decoded
    }
}

#[async_trait]
impl SlidePipeline for SlideExtractor {
    async fn extract(&mut self) -> Result<Vec<Slide>, CoreError> {
        self.extract_slides().await
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
