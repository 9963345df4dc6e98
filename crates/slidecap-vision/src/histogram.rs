//! 컬러 히스토그램 거리.
//!
//! 채널당 8구간의 3D RGB 히스토그램을 min-max 정규화한 뒤
//! Bhattacharyya 거리(0 = 동일, 1 = 완전히 다름)를 계산한다.
//! SSIM보다 훨씬 싸서 거친 선별 단계에 쓰인다.

use image::DynamicImage;
use slidecap_core::error::CoreError;

/// 채널당 히스토그램 구간 수
const BINS: usize = 8;

/// 두 프레임의 Bhattacharyya 히스토그램 거리 (0.0 ~ 1.0)
pub fn distance(a: &DynamicImage, b: &DynamicImage) -> Result<f32, CoreError> {
    let ha = build(a)?;
    let hb = build(b)?;
    Ok(bhattacharyya(&ha, &hb))
}

/// 3D 컬러 히스토그램 생성 + min-max 정규화
fn build(img: &DynamicImage) -> Result<Vec<f32>, CoreError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(CoreError::PrimitiveCompute(
            "빈 프레임은 히스토그램 계산 불가".to_string(),
        ));
    }

    let rgb = img.to_rgb8();
    let mut hist = vec![0f32; BINS * BINS * BINS];

    for p in rgb.pixels() {
        let r = p[0] as usize * BINS / 256;
        let g = p[1] as usize * BINS / 256;
        let b = p[2] as usize * BINS / 256;
        hist[(r * BINS + g) * BINS + b] += 1.0;
    }

    // min-max 정규화 (0~1)
    let max = hist.iter().cloned().fold(f32::MIN, f32::max);
    let min = hist.iter().cloned().fold(f32::MAX, f32::min);
    if max > min {
        for v in hist.iter_mut() {
            *v = (*v - min) / (max - min);
        }
    }

    Ok(hist)
}

/// Bhattacharyya 거리
fn bhattacharyya(h1: &[f32], h2: &[f32]) -> f32 {
    let sum1: f64 = h1.iter().map(|&v| v as f64).sum();
    let sum2: f64 = h2.iter().map(|&v| v as f64).sum();

    // 한쪽이 완전히 비면 비교 불능 — 최대 거리로 보수적 처리
    if sum1 <= f64::EPSILON || sum2 <= f64::EPSILON {
        return 1.0;
    }

    let bc: f64 = h1
        .iter()
        .zip(h2.iter())
        .map(|(&a, &b)| (a as f64 * b as f64).sqrt())
        .sum();

    let coeff = (bc / (sum1 * sum2).sqrt()).clamp(0.0, 1.0);
    ((1.0 - coeff).sqrt()) as f32
}
