//! 슬라이드 전환 분류기.
//!
//! 비용 오름차순 다단계 판정: 지각 해시 → 히스토그램 → SSIM → OCR 텍스트.
//! 싼 게이트가 확신할 수 있으면 즉시 결론 내고, 불확실 구간만 다음
//! 단계로 넘긴다. 상태를 가진다 — 현재 후보를 직전 후보가 아니라
//! *마지막으로 수락된* 슬라이드 프레임과 비교하므로, 후보는 반드시
//! 타임스탬프 오름차순으로 공급해야 한다.

use std::sync::Arc;

use image::DynamicImage;
use slidecap_core::config::ComparatorConfig;
use slidecap_core::error::CoreError;
use slidecap_core::models::frame::DecodedFrame;
use slidecap_core::models::slide::PerceptualHash;
use slidecap_core::ports::region_detector::RegionDetector;
use slidecap_core::ports::text_extractor::TextExtractor;
use tracing::{debug, warn};

use crate::histogram;
use crate::mask;
use crate::phash;
use crate::resize;
use crate::ssim;
use crate::text;
use crate::text_cache::TextCache;

/// 후보 프레임 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 새 슬라이드로 수락 — 호출 측은 스토어에 추가하고 기준 프레임이 교체된다
    Accepted,
    /// 기존 슬라이드와 같음 — 후보 폐기, 기준 프레임 유지
    Rejected,
}

/// 다단계 슬라이드 전환 분류기
pub struct SlideChangeClassifier {
    comparator: ComparatorConfig,
    text_cache: TextCache,
    min_plausibility: f32,
    region_detector: Option<Arc<dyn RegionDetector>>,
    text_extractor: Option<Arc<dyn TextExtractor>>,
    /// 마지막으로 수락된 슬라이드의 프레임 버퍼
    last_accepted: Option<DynamicImage>,
    /// 순서 계약 검증용 — 마지막으로 관찰한 타임스탬프
    last_timestamp: f64,
}

impl SlideChangeClassifier {
    /// 새 분류기 생성.
    ///
    /// `text_cache`는 호출자 소유 객체를 넘겨받는다 — 전역 캐시 대신
    /// 추출 실행 단위로 수명이 명확한 캐시를 쓴다.
    pub fn new(
        comparator: ComparatorConfig,
        text_cache: TextCache,
        min_plausibility: f32,
    ) -> Self {
        Self {
            comparator,
            text_cache,
            min_plausibility,
            region_detector: None,
            text_extractor: None,
            last_accepted: None,
            last_timestamp: f64::NEG_INFINITY,
        }
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

    /// 후보 프레임 관찰.
    ///
    /// 첫 후보는 무조건 수락된다. 타임스탬프가 역행하는 후보는
    /// 순서 계약 위반으로 [`CoreError::Validation`]을 반환한다.
    pub fn observe(&mut self, frame: &DecodedFrame) -> Result<Verdict, CoreError> {
        if frame.meta.timestamp_secs < self.last_timestamp {
            return Err(CoreError::Validation {
                field: "candidate_order".to_string(),
                message: format!(
                    "후보 타임스탬프 역행: {:.3}s < {:.3}s (타임스탬프 오름차순 공급 필요)",
                    frame.meta.timestamp_secs, self.last_timestamp
                ),
            });
        }
        self.last_timestamp = frame.meta.timestamp_secs;

        let verdict = match self.last_accepted.clone() {
            None => Verdict::Accepted,
            Some(reference) => {
                if self.is_different(&reference, &frame.image) {
                    Verdict::Accepted
                } else {
                    Verdict::Rejected
                }
            }
        };

        if verdict == Verdict::Accepted {
            debug!(
                "슬라이드 전환 수락: frame {} ({:.1}s)",
                frame.meta.index, frame.meta.timestamp_secs
            );
            self.last_accepted = Some(frame.image.clone());
        }

        Ok(verdict)
    }

    /// 두 프레임이 다른 슬라이드인지 판정.
    ///
    /// 비교 자체가 실패하면 "다른 슬라이드"로 간주한다 — 과분할은
    /// 사후 중복 제거가 흡수하지만, 놓친 전환은 복구할 수 없다.
    fn is_different(&mut self, reference: &DynamicImage, candidate: &DynamicImage) -> bool {
        match self.compare(reference, candidate) {
            Ok(different) => different,
            Err(e) => {
                warn!("슬라이드 비교 실패, 다른 슬라이드로 간주: {e}");
                true
            }
        }
    }

    fn compare(
        &mut self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> Result<bool, CoreError> {
        // 1. 마스킹 (선택) — 영역이 하나라도 감지되면 양쪽 다 중앙 영역만
        let (reference, candidate) = self.masked_pair(reference, candidate);

        let cfg = self.comparator.clone();
        let text_extractor = self.text_extractor.clone();
        let mut lookup = |frame: &DynamicImage, hash: PerceptualHash| -> String {
            self.cached_text(text_extractor.as_deref(), frame, hash)
        };

        staged_compare(&reference, &candidate, &cfg, Some(&mut lookup))
    }

    /// 영역 감지 결과에 따라 두 프레임에 동일한 마스킹 적용.
    ///
    /// 감지 실패는 치명적이지 않다 — 해당 비교만 마스킹 없이 진행.
    fn masked_pair(
        &self,
        reference: &DynamicImage,
        candidate: &DynamicImage,
    ) -> (DynamicImage, DynamicImage) {
        let unmasked = || (reference.clone(), candidate.clone());

        let Some(detector) = &self.region_detector else {
            return unmasked();
        };

        let regions_ref = match detector.detect_exclusion_regions(reference) {
            Ok(r) => r,
            Err(e) => {
                warn!("영역 감지 실패, 마스킹 없이 비교: {e}");
                return unmasked();
            }
        };
        let regions_cand = match detector.detect_exclusion_regions(candidate) {
            Ok(r) => r,
            Err(e) => {
                warn!("영역 감지 실패, 마스킹 없이 비교: {e}");
                return unmasked();
            }
        };

        if regions_ref.is_empty() && regions_cand.is_empty() {
            return unmasked();
        }

        debug!(
            "제외 영역 감지 ({} / {}개) — 중앙 영역만 비교",
            regions_ref.len(),
            regions_cand.len()
        );
        (mask::central_region(reference), mask::central_region(candidate))
    }

    /// OCR 텍스트 조회 (해시 키 LRU 캐시 경유).
    ///
    /// 추출기 부재/실패는 빈 텍스트로 강등되고, 타당성이 낮은 출력도
    /// 잡음으로 보고 빈 텍스트로 취급한다.
    fn cached_text(
        &mut self,
        extractor: Option<&dyn TextExtractor>,
        frame: &DynamicImage,
        hash: PerceptualHash,
    ) -> String {
        if let Some(hit) = self.text_cache.get(&hash) {
            return hit.clone();
        }

        let Some(extractor) = extractor else {
            return String::new();
        };

        let raw = match extractor.extract_text(frame) {
            Ok(t) => t,
            Err(e) => {
                warn!("OCR 실패, 빈 텍스트로 취급: {e}");
                String::new()
            }
        };

        let score = text::plausibility(&raw);
        let validated = if score < self.min_plausibility {
            if !raw.is_empty() {
                debug!("OCR 출력 타당성 미달 ({score:.2}) — 폐기");
            }
            String::new()
        } else {
            raw
        };

        self.text_cache.put(hash, validated.clone());
        validated
    }
}

/// 다단계 비교 파이프라인.
///
/// `text_lookup`이 없으면 텍스트 게이트는 SSIM 폴백으로 대체된다.
fn staged_compare(
    reference: &DynamicImage,
    candidate: &DynamicImage,
    cfg: &ComparatorConfig,
    text_lookup: Option<&mut dyn FnMut(&DynamicImage, PerceptualHash) -> String>,
) -> Result<bool, CoreError> {
    // 2. 해시 게이트 — 가장 싼 판정
    let hash_ref = phash::compute(reference)?;
    let hash_cand = phash::compute(candidate)?;
    let hash_dist = hash_ref.distance(hash_cand);

    if hash_dist < cfg.hash_accept_band {
        debug!("해시 게이트 수락 (거리 {hash_dist})");
        return Ok(false);
    }
    if hash_dist > cfg.hash_reject_band {
        debug!("해시 게이트 거부 (거리 {hash_dist})");
        return Ok(true);
    }

    // 불확실 구간 — 축소본으로 느린 비교기 진행
    let ref_small = resize::scale(reference, cfg.resize_factor)?;
    let cand_small = resize::scale(candidate, cfg.resize_factor)?;

    // 3. 히스토그램 게이트
    let hist = histogram::distance(&ref_small, &cand_small)?;
    if hist > cfg.histogram_threshold {
        // 경계 구간은 SSIM으로 재확인 — 히스토그램만 믿기엔 거칠다
        if hist < cfg.histogram_threshold + cfg.histogram_margin {
            let s = ssim::similarity(&ref_small.to_luma8(), &cand_small.to_luma8())?;
            if s > cfg.similarity_threshold - cfg.ssim_override_offset {
                debug!("히스토그램 거부를 SSIM이 뒤집음 (hist {hist:.3}, ssim {s:.3})");
                return Ok(false);
            }
        }
        debug!("히스토그램 게이트 거부 ({hist:.3})");
        return Ok(true);
    }

    // 4. SSIM 게이트
    let s = ssim::similarity(&ref_small.to_luma8(), &cand_small.to_luma8())?;
    if s < cfg.similarity_threshold - cfg.ssim_reject_offset {
        debug!("SSIM 게이트 거부 ({s:.3})");
        return Ok(true);
    }
    if s > cfg.similarity_threshold - cfg.ssim_accept_offset {
        debug!("SSIM 게이트 수락 ({s:.3})");
        return Ok(false);
    }

    // 5. 텍스트 게이트 — 진짜 경계 사례만 도달하는 가장 느린 단계
    let ssim_fallback = s < cfg.similarity_threshold;

    let Some(lookup) = text_lookup else {
        return Ok(ssim_fallback);
    };

    let text_ref = lookup(reference, hash_ref);
    let text_cand = lookup(candidate, hash_cand);

    match text::word_overlap_ratio(&text_ref, &text_cand, cfg.min_text_words) {
        Some(ratio) => {
            debug!("텍스트 게이트: 단어 차이 비율 {ratio:.2}");
            Ok(ratio > cfg.text_diff_threshold)
        }
        // 단어가 너무 적으면 OCR을 믿을 수 없다
        None => Ok(ssim_fallback),
    }
}

/// 상태 없는 단일 비교 — 마스킹/OCR 없이 해시→히스토그램→SSIM 게이트만 적용.
///
/// 비교 실패는 보수적으로 "다른 슬라이드"다.
pub fn is_different_slide(
    candidate: &DynamicImage,
    reference: &DynamicImage,
    config: &ComparatorConfig,
) -> bool {
    match staged_compare(reference, candidate, config, None) {
        Ok(different) => different,
        Err(e) => {
            warn!("프레임 비교 실패, 다른 슬라이드로 간주: {e}");
            true
        }
    }
}
