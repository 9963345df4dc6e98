//! OCR 텍스트 추출 어댑터.
//!
//! `leptess` 기반 Tesseract 래퍼로 [`TextExtractor`] 포트를 구현한다.
//! `ocr` feature flag 활성화 시에만 빌드된다.
//!
//! Tesseract 핸들은 스레드 간 공유가 안전하지 않아 호출마다 새로
//! 연다. 게이트 도달 빈도가 낮고 결과가 해시 키 캐시에 저장되므로
//! 초기화 비용은 전체에서 무시할 수준이다.

use std::path::PathBuf;

use image::DynamicImage;
use slidecap_core::error::CoreError;
use slidecap_core::ports::text_extractor::TextExtractor;
use thiserror::Error;

/// OCR 에러 타입
#[derive(Debug, Error)]
pub enum OcrError {
    /// Tesseract 초기화 실패
    #[error("OCR 초기화 실패: {0}")]
    Init(String),

    /// 이미지 설정 실패
    #[error("OCR 이미지 설정 실패: {0}")]
    ImageSetup(String),

    /// 텍스트 추출 실패
    #[error("OCR 텍스트 추출 실패: {0}")]
    Extraction(String),

    /// 빈 이미지 입력
    #[error("빈 이미지: 너비 또는 높이가 0")]
    EmptyImage,
}

impl From<OcrError> for CoreError {
    fn from(e: OcrError) -> Self {
        CoreError::OcrUnavailable(e.to_string())
    }
}

/// leptess 기반 텍스트 추출기 — [`TextExtractor`] 포트 구현
pub struct LeptessTextExtractor {
    /// Tesseract 데이터 경로 (None이면 시스템 기본값)
    tessdata_path: Option<PathBuf>,
    /// 최대 추출 문자 수 (0이면 무제한)
    max_chars: usize,
}

impl LeptessTextExtractor {
    /// 새 추출기 생성
    pub fn new(tessdata_path: Option<PathBuf>) -> Self {
        Self {
            tessdata_path,
            max_chars: 0,
        }
    }

    /// 최대 문자 수 제한 설정
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// tessdata 경로 반환
    pub fn tessdata_path(&self) -> Option<&PathBuf> {
        self.tessdata_path.as_ref()
    }

    fn extract_inner(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let rgba = image.to_rgba8();
        let (w, h) = (rgba.width(), rgba.height());

        if w == 0 || h == 0 {
            return Err(OcrError::EmptyImage);
        }

        let tessdata = self
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());

        let mut lt = leptess::LepTess::new(tessdata.as_deref(), "eng")
            .map_err(|e| OcrError::Init(format!("{e}")))?;

        lt.set_image_from_mem(rgba.as_raw(), w as i32, h as i32, 4, (w * 4) as i32)
            .map_err(|_| OcrError::ImageSetup("이미지 메모리 설정 실패".to_string()))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::Extraction(format!("{e}")))?;

        let result = text.trim().to_string();

        // 최대 문자 수 제한
        if self.max_chars > 0 && result.len() > self.max_chars {
            Ok(result.chars().take(self.max_chars).collect())
        } else {
            Ok(result)
        }
    }
}

impl TextExtractor for LeptessTextExtractor {
    fn extract_text(&self, frame: &DynamicImage) -> Result<String, CoreError> {
        Ok(self.extract_inner(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_returns_error() {
        let extractor = LeptessTextExtractor::new(None);
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(0, 0));
        let result = extractor.extract_inner(&img);
        assert!(matches!(result, Err(OcrError::EmptyImage)));
    }

    #[test]
    fn error_display_messages() {
        let e1 = OcrError::Init("테스트".to_string());
        assert!(e1.to_string().contains("초기화"));

        let e2 = OcrError::ImageSetup("테스트".to_string());
        assert!(e2.to_string().contains("이미지"));

        let e3 = OcrError::EmptyImage;
        assert!(e3.to_string().contains("빈 이미지"));
    }

    #[test]
    fn ocr_error_maps_to_core_error() {
        let core: CoreError = OcrError::EmptyImage.into();
        assert!(matches!(core, CoreError::OcrUnavailable(_)));
    }

    #[test]
    fn extractor_creation() {
        let extractor = LeptessTextExtractor::new(None);
        assert!(extractor.tessdata_path().is_none());

        let path = PathBuf::from("/usr/share/tessdata");
        let extractor = LeptessTextExtractor::new(Some(path.clone()));
        assert_eq!(extractor.tessdata_path(), Some(&path));
    }

    #[test]
    fn max_chars_builder() {
        let extractor = LeptessTextExtractor::new(None).with_max_chars(100);
        assert_eq!(extractor.max_chars, 100);
    }
}
