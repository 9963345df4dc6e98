//! 구조적 유사도 (SSIM).
//!
//! 8×8 윈도우 단위 SSIM의 평균. 1.0 = 동일.
//! 해상도가 다르면 두 번째 이미지를 첫 번째에 맞춰 리사이즈한다.

use image::{imageops::FilterType, GrayImage};
use slidecap_core::error::CoreError;

/// SSIM 윈도우 한 변 (픽셀)
const WINDOW: u32 = 8;

/// 안정화 상수 (K1=0.01, K2=0.03, L=255)
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// 그레이스케일 윈도우 SSIM (0.0 ~ 1.0)
pub fn similarity(a: &GrayImage, b: &GrayImage) -> Result<f32, CoreError> {
    if a.width() == 0 || a.height() == 0 || b.width() == 0 || b.height() == 0 {
        return Err(CoreError::PrimitiveCompute(
            "빈 프레임은 SSIM 계산 불가".to_string(),
        ));
    }

    // 해상도 불일치 시 b를 a에 맞춘다
    let resized;
    let b = if a.dimensions() != b.dimensions() {
        resized = image::imageops::resize(b, a.width(), a.height(), FilterType::Triangle);
        &resized
    } else {
        b
    };

    let (w, h) = a.dimensions();
    let mut total = 0.0f64;
    let mut windows = 0u32;

    let mut y = 0;
    while y < h {
        let y_end = (y + WINDOW).min(h);
        let mut x = 0;
        while x < w {
            let x_end = (x + WINDOW).min(w);
            total += window_ssim(a, b, x, y, x_end, y_end);
            windows += 1;
            x += WINDOW;
        }
        y += WINDOW;
    }

    // 음수 윈도우(역상관 구조)가 평균을 끌어내릴 수 있으므로 0~1로 제한
    Ok((total / windows as f64).clamp(0.0, 1.0) as f32)
}

/// 단일 윈도우 SSIM
fn window_ssim(a: &GrayImage, b: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
    let n = ((x1 - x0) * (y1 - y0)) as f64;

    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            sum_a += a.get_pixel(x, y)[0] as f64;
            sum_b += b.get_pixel(x, y)[0] as f64;
        }
    }
    let mean_a = sum_a / n;
    let mean_b = sum_b / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut cov = 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let da = a.get_pixel(x, y)[0] as f64 - mean_a;
            let db = b.get_pixel(x, y)[0] as f64 - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
    }
    var_a /= n;
    var_b /= n;
    cov /= n;

    ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
        / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| image::Luma([((x + y) % 256) as u8]))
    }

    #[test]
    fn identical_images_score_one() {
        let img = gradient(64, 64);
        let s = similarity(&img, &img).unwrap();
        assert!((s - 1.0).abs() < 1e-4, "동일 이미지 SSIM {s}");
    }

    #[test]
    fn black_vs_white_near_zero() {
        let black = GrayImage::from_pixel(64, 64, image::Luma([0]));
        let white = GrayImage::from_pixel(64, 64, image::Luma([255]));
        let s = similarity(&black, &white).unwrap();
        assert!(s < 0.01, "흑백 SSIM {s}");
    }

    #[test]
    fn anticorrelated_texture_clamps_to_zero() {
        // 체커 패턴과 그 반전 — 공분산이 음수가 되어 0으로 클램프
        let checker = GrayImage::from_fn(64, 64, |x, y| {
            image::Luma([if (x / 2 + y / 2) % 2 == 0 { 64 } else { 192 }])
        });
        let inverted = GrayImage::from_fn(64, 64, |x, y| {
            image::Luma([if (x / 2 + y / 2) % 2 == 0 { 192 } else { 64 }])
        });
        let s = similarity(&checker, &inverted).unwrap();
        assert!(s < 0.1, "역상관 SSIM {s}");
    }

    #[test]
    fn mismatched_dimensions_resized() {
        let a = gradient(64, 64);
        let b = gradient(128, 128);
        // 리사이즈 경로가 에러 없이 동작해야 함
        let s = similarity(&a, &b).unwrap();
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn partial_window_edges_handled() {
        // 윈도우 크기로 나누어떨어지지 않는 해상도
        let a = gradient(30, 22);
        let s = similarity(&a, &a).unwrap();
        assert!((s - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_image_is_error() {
        let empty = GrayImage::new(0, 0);
        let img = gradient(16, 16);
        assert!(similarity(&empty, &img).is_err());
    }
}
