//! 텍스트 추출(OCR) 포트.
//!
//! 단일 주입 capability — OCR 설정 변형(언어 팩, psm 모드 등)은
//! 구현체의 소관이며 코어는 하나의 문서화된 동작만 소비한다.
//! 블로킹 동기 연산으로 모델링된다.

use image::DynamicImage;

use crate::error::CoreError;

/// 텍스트 추출기 — Tesseract 등 OCR 엔진의 추상화
///
/// 구현체: `slidecap-vision::ocr::LeptessTextExtractor` (feature `ocr`)
pub trait TextExtractor: Send + Sync {
    /// 프레임에서 텍스트 추출.
    ///
    /// 엔진을 쓸 수 없으면 [`CoreError::OcrUnavailable`]을 반환하며,
    /// 호출 측은 "양쪽 모두 0 단어"로 취급해 SSIM 폴백으로 내려간다.
    fn extract_text(&self, frame: &DynamicImage) -> Result<String, CoreError>;
}
