//! 고속 리사이즈.
//!
//! fast_image_resize 기반. 히스토그램/SSIM 단계 전 프레임 축소와
//! 중복 제거 패스의 해상도 정합에 사용한다.

use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};
use slidecap_core::error::CoreError;

/// 고속 리사이즈
pub fn fast_resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage, CoreError> {
    let (src_w, src_h) = (image.width(), image.height());

    // 동일 크기면 복제 반환
    if src_w == width && src_h == height {
        return Ok(image.clone());
    }

    if src_w == 0 || src_h == 0 {
        return Err(CoreError::PrimitiveCompute("소스 이미지 크기 0".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::PrimitiveCompute("목표 이미지 크기 0".to_string()));
    }

    let src_rgba = image.to_rgba8();

    let src_image = FirImage::from_vec_u8(
        src_w,
        src_h,
        src_rgba.into_raw(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| CoreError::PrimitiveCompute(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(width, height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::PrimitiveCompute(format!("리사이즈 실패: {e}")))?;

    let result = RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::PrimitiveCompute("결과 이미지 생성 실패".to_string()))?;

    Ok(DynamicImage::ImageRgba8(result))
}

/// 배율 축소 — 비교 단계 전처리용
pub fn scale(image: &DynamicImage, factor: f32) -> Result<DynamicImage, CoreError> {
    if (factor - 1.0).abs() < f32::EPSILON {
        return Ok(image.clone());
    }

    let width = ((image.width() as f32 * factor).round() as u32).max(1);
    let height = ((image.height() as f32 * factor).round() as u32).max(1);
    fast_resize(image, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbaImage};

    fn make_test_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([100, 150, 200, 255]),
        ))
    }

    #[test]
    fn resize_basic() {
        let img = make_test_image(1920, 1080);
        let out = fast_resize(&img, 480, 270).unwrap();
        assert_eq!(out.dimensions(), (480, 270));
    }

    #[test]
    fn same_size_noop() {
        let img = make_test_image(480, 270);
        let out = fast_resize(&img, 480, 270).unwrap();
        assert_eq!(out.dimensions(), (480, 270));
    }

    #[test]
    fn scale_half() {
        let img = make_test_image(640, 480);
        let out = scale(&img, 0.5).unwrap();
        assert_eq!(out.dimensions(), (320, 240));
    }

    #[test]
    fn scale_one_is_noop() {
        let img = make_test_image(100, 100);
        let out = scale(&img, 1.0).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
    }

    #[test]
    fn tiny_scale_clamps_to_one_pixel() {
        let img = make_test_image(8, 8);
        let out = scale(&img, 0.01).unwrap();
        assert_eq!(out.dimensions(), (1, 1));
    }

    #[test]
    fn zero_size_source_error() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(fast_resize(&img, 100, 100).is_err());
    }

    #[test]
    fn zero_size_target_error() {
        let img = make_test_image(100, 100);
        assert!(fast_resize(&img, 0, 100).is_err());
    }
}
