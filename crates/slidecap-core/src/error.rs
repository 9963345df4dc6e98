//! SLIDECAP 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 에러 타입에서 `#[from] CoreError`로 래핑한다.
//! 추출 파이프라인에서 치명적인 에러는 [`CoreError::EmptySource`] 하나뿐이며,
//! 나머지는 단계별 보수적 폴백("다른 슬라이드로 간주")으로 흡수된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 빈 프레임 소스 — 추출 전체를 중단하는 유일한 조건
    #[error("빈 프레임 소스: frame_count={frame_count}, fps={fps}")]
    EmptySource {
        /// 소스가 보고한 총 프레임 수
        frame_count: u64,
        /// 소스가 보고한 fps
        fps: f64,
    },

    /// 프레임 디코드 실패 — 해당 후보만 건너뛰고 계속 진행
    #[error("프레임 {index} 디코드 실패: {message}")]
    FrameDecode {
        /// 실패한 프레임 인덱스
        index: u64,
        /// 실패 사유
        message: String,
    },

    /// 유사도 프리미티브 계산 실패 — 해당 단계에서 "다른 슬라이드"로 간주
    #[error("유사도 계산 에러: {0}")]
    PrimitiveCompute(String),

    /// 제외 영역 감지 실패 — 마스킹 없이 비교 진행
    #[error("영역 감지 에러: {0}")]
    RegionProvider(String),

    /// OCR 사용 불가 — 양쪽 모두 0 단어로 취급, SSIM 폴백
    #[error("OCR 사용 불가: {0}")]
    OcrUnavailable(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}
