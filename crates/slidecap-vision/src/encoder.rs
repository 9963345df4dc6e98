//! WebP 인코더/디코더.
//!
//! 수락된 슬라이드 프레임을 WebP로 인코딩해 스토어에 보관한다.
//! 중복 제거 패스는 저장된 바이트를 다시 디코드해 SSIM 비교에 쓴다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use image::DynamicImage;
use slidecap_core::error::CoreError;
use tracing::debug;

/// WebP 품질 프리셋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebPQuality {
    /// 낮은 품질 (60%) — 미리보기용
    Low = 60,
    /// 중간 품질 (75%)
    Medium = 75,
    /// 높은 품질 (85%) — 슬라이드 보관용
    High = 85,
}

/// WebP 인코딩
pub fn encode_webp(image: &DynamicImage, quality: WebPQuality) -> Result<Vec<u8>, CoreError> {
    let rgba = image.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());

    if w == 0 || h == 0 {
        return Err(CoreError::Internal("빈 이미지는 인코딩 불가".to_string()));
    }

    let encoder = webp::Encoder::from_rgba(&rgba, w, h);
    let encoded = encoder.encode(quality as u8 as f32);
    let encoded_vec = encoded.to_vec();

    debug!(
        "WebP 인코딩: {}x{} → {} bytes (품질 {})",
        w,
        h,
        encoded_vec.len(),
        quality as u8
    );

    Ok(encoded_vec)
}

/// WebP 인코딩 후 Base64 반환 — 외부 저장소/전송 계층용
pub fn encode_webp_base64(image: &DynamicImage, quality: WebPQuality) -> Result<String, CoreError> {
    let bytes = encode_webp(image, quality)?;
    Ok(B64.encode(&bytes))
}

/// WebP 디코드 — 저장된 슬라이드 이미지 복원
pub fn decode_webp(data: &[u8]) -> Result<DynamicImage, CoreError> {
    let decoder = webp::Decoder::new(data);
    let decoded = decoder
        .decode()
        .ok_or_else(|| CoreError::PrimitiveCompute("WebP 디코드 실패".to_string()))?;
    Ok(decoded.to_image())
}
