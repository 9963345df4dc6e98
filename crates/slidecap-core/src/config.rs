//! 추출 파이프라인 설정 구조체.
//!
//! 비교기 임계값, 장면 감지 파라미터, 샘플링 전략, OCR 설정을 정의한다.
//! 경험적으로 튜닝된 값들은 모두 기본값이지 상수가 아니다 — 해상도나
//! 압축 수준이 다른 코퍼스에서는 조정이 필요할 수 있다.
//! `config_manager`를 통해 JSON 파일에서 로드.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 최상위 추출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// 비교기(분류기) 임계값
    #[serde(default)]
    pub comparator: ComparatorConfig,
    /// 장면 감지 설정
    #[serde(default)]
    pub scene: SceneConfig,
    /// 샘플링 전략 설정
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// OCR 텍스트 게이트 설정
    #[serde(default)]
    pub ocr: OcrConfig,
    /// 프레임 디코드 워커 수 상한
    #[serde(default = "default_decode_workers")]
    pub decode_workers: usize,
    /// 프레젠터 영역 마스킹 사용 여부 (RegionDetector가 주입된 경우)
    #[serde(default = "default_true")]
    pub mask_presenter_regions: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            comparator: ComparatorConfig::default(),
            scene: SceneConfig::default(),
            sampling: SamplingConfig::default(),
            ocr: OcrConfig::default(),
            decode_workers: default_decode_workers(),
            mask_presenter_regions: true,
        }
    }
}

impl ExtractorConfig {
    /// 설정 유효성 검증.
    ///
    /// 파이프라인 구성 시 한 번 호출되며, 이후 설정은 불변이다.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.comparator.validate()?;
        self.scene.validate()?;
        self.sampling.validate()?;

        if self.decode_workers == 0 {
            return Err(CoreError::Validation {
                field: "decode_workers".to_string(),
                message: "1 이상이어야 함".to_string(),
            });
        }
        Ok(())
    }
}

/// 다단계 슬라이드 비교기 임계값.
///
/// 구성 시 한 번 주입되고 실행 중 변경되지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// SSIM 기준값 (1.0 = 동일)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    /// 히스토그램(Bhattacharyya) 거리 기준값
    #[serde(default = "default_histogram_threshold")]
    pub histogram_threshold: f32,
    /// 히스토그램 기준 초과 시 SSIM 재확인이 적용되는 경계 구간 폭
    #[serde(default = "default_histogram_margin")]
    pub histogram_margin: f32,
    /// 해밍 거리 수락 구간 — 미만이면 즉시 "같은 슬라이드"
    #[serde(default = "default_hash_accept_band")]
    pub hash_accept_band: u32,
    /// 해밍 거리 거부 구간 — 초과면 즉시 "다른 슬라이드"
    #[serde(default = "default_hash_reject_band")]
    pub hash_reject_band: u32,
    /// SSIM 수락 오프셋 — `similarity_threshold - offset` 초과면 "같음"
    #[serde(default = "default_ssim_accept_offset")]
    pub ssim_accept_offset: f32,
    /// SSIM 재확인 오프셋 — 히스토그램/중복 제거 에스컬레이션에서 사용
    #[serde(default = "default_ssim_override_offset")]
    pub ssim_override_offset: f32,
    /// SSIM 거부 오프셋 — `similarity_threshold - offset` 미만이면 "다름"
    #[serde(default = "default_ssim_reject_offset")]
    pub ssim_reject_offset: f32,
    /// 단어 차이 비율 기준 — 초과면 "다른 슬라이드" (의도적으로 관대)
    #[serde(default = "default_text_diff_threshold")]
    pub text_diff_threshold: f32,
    /// 텍스트 게이트가 유효하려면 양쪽에 필요한 최소 단어 수
    #[serde(default = "default_min_text_words")]
    pub min_text_words: usize,
    /// 히스토그램/SSIM 단계 전 프레임 축소 배율
    #[serde(default = "default_resize_factor")]
    pub resize_factor: f32,
    /// 중복 제거: 해밍 거리 미만이면 즉시 중복
    #[serde(default = "default_dedup_hash_band")]
    pub dedup_hash_band: u32,
    /// 중복 제거: 이 값 이하의 경계 구간은 SSIM 직접 비교로 에스컬레이션
    #[serde(default = "default_dedup_escalate_band")]
    pub dedup_escalate_band: u32,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            histogram_threshold: default_histogram_threshold(),
            histogram_margin: default_histogram_margin(),
            hash_accept_band: default_hash_accept_band(),
            hash_reject_band: default_hash_reject_band(),
            ssim_accept_offset: default_ssim_accept_offset(),
            ssim_override_offset: default_ssim_override_offset(),
            ssim_reject_offset: default_ssim_reject_offset(),
            text_diff_threshold: default_text_diff_threshold(),
            min_text_words: default_min_text_words(),
            resize_factor: default_resize_factor(),
            dedup_hash_band: default_dedup_hash_band(),
            dedup_escalate_band: default_dedup_escalate_band(),
        }
    }
}

impl ComparatorConfig {
    /// 장면 감지용 거친 임계값 — 큰 전환만 싸게 찾기 위한 reject-only 값
    pub fn scene_threshold(&self) -> f32 {
        (self.similarity_threshold - 0.3).max(0.3)
    }

    fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("histogram_threshold", self.histogram_threshold),
            ("text_diff_threshold", self.text_diff_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Validation {
                    field: field.to_string(),
                    message: format!("0.0~1.0 범위여야 함 (현재 {value})"),
                });
            }
        }

        if self.hash_accept_band > self.hash_reject_band {
            return Err(CoreError::Validation {
                field: "hash_accept_band".to_string(),
                message: format!(
                    "hash_reject_band({}) 이하여야 함 (현재 {})",
                    self.hash_reject_band, self.hash_accept_band
                ),
            });
        }

        if self.dedup_hash_band > self.dedup_escalate_band {
            return Err(CoreError::Validation {
                field: "dedup_hash_band".to_string(),
                message: format!(
                    "dedup_escalate_band({}) 이하여야 함 (현재 {})",
                    self.dedup_escalate_band, self.dedup_hash_band
                ),
            });
        }

        if !(self.resize_factor > 0.0 && self.resize_factor <= 1.0) {
            return Err(CoreError::Validation {
                field: "resize_factor".to_string(),
                message: format!("0.0 초과 1.0 이하여야 함 (현재 {})", self.resize_factor),
            });
        }

        Ok(())
    }
}

/// 장면 감지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 최소 장면 길이 (초) — 이보다 가까운 경계는 무시
    #[serde(default = "default_min_scene_secs")]
    pub min_scene_secs: f64,
    /// 최대 장면 길이 (초) — 초과 시 경계를 강제 삽입
    #[serde(default = "default_max_scene_secs")]
    pub max_scene_secs: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            min_scene_secs: default_min_scene_secs(),
            max_scene_secs: default_max_scene_secs(),
        }
    }
}

impl SceneConfig {
    fn validate(&self) -> Result<(), CoreError> {
        if self.min_scene_secs <= 0.0 || self.max_scene_secs <= self.min_scene_secs {
            return Err(CoreError::Validation {
                field: "scene".to_string(),
                message: format!(
                    "0 < min_scene_secs < max_scene_secs 여야 함 (현재 {} / {})",
                    self.min_scene_secs, self.max_scene_secs
                ),
            });
        }
        Ok(())
    }
}

/// 후보 프레임 샘플링 전략
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// 장면 기반 적응 샘플링 사용 여부
    #[serde(default = "default_true")]
    pub adaptive: bool,
    /// 적응 샘플링 비활성화 시 고정 샘플링 간격 (초)
    #[serde(default = "default_fixed_interval_secs")]
    pub fixed_interval_secs: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            fixed_interval_secs: default_fixed_interval_secs(),
        }
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), CoreError> {
        if self.fixed_interval_secs <= 0.0 {
            return Err(CoreError::Validation {
                field: "fixed_interval_secs".to_string(),
                message: "0보다 커야 함".to_string(),
            });
        }
        Ok(())
    }
}

/// OCR 텍스트 게이트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// 텍스트 캐시 최대 항목 수 (LRU)
    #[serde(default = "default_text_cache_capacity")]
    pub text_cache_capacity: usize,
    /// 추출 텍스트 타당성 하한 — 미만이면 빈 텍스트로 취급 (OCR 잡음 차단)
    #[serde(default = "default_min_plausibility")]
    pub min_plausibility: f32,
    /// 최대 추출 문자 수 (0이면 무제한)
    #[serde(default)]
    pub max_chars: usize,
    /// Tesseract 데이터 경로 (None이면 시스템 기본값)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            text_cache_capacity: default_text_cache_capacity(),
            min_plausibility: default_min_plausibility(),
            max_chars: 0,
            tessdata_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_decode_workers() -> usize {
    4
}

fn default_similarity_threshold() -> f32 {
    0.98
}

fn default_histogram_threshold() -> f32 {
    0.95
}

fn default_histogram_margin() -> f32 {
    0.25
}

fn default_hash_accept_band() -> u32 {
    20
}

fn default_hash_reject_band() -> u32 {
    25
}

fn default_ssim_accept_offset() -> f32 {
    0.1
}

fn default_ssim_override_offset() -> f32 {
    0.15
}

fn default_ssim_reject_offset() -> f32 {
    0.2
}

fn default_text_diff_threshold() -> f32 {
    0.7
}

fn default_min_text_words() -> usize {
    3
}

fn default_resize_factor() -> f32 {
    0.5
}

fn default_dedup_hash_band() -> u32 {
    25
}

fn default_dedup_escalate_band() -> u32 {
    35
}

fn default_min_scene_secs() -> f64 {
    5.0
}

fn default_max_scene_secs() -> f64 {
    30.0
}

fn default_fixed_interval_secs() -> f64 {
    5.0
}

fn default_text_cache_capacity() -> usize {
    256
}

fn default_min_plausibility() -> f32 {
    0.15
}
