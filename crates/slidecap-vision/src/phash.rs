//! 지각 해시 (pHash).
//!
//! 32×32 그레이스케일 축소 → 8×8 축소 → 2D DCT → 저주파 8×8 블록을
//! 블록 중앙값과 비교한 64비트 부호 패턴. 경미한 재압축/블러/프레젠터
//! 흔들림에는 둔감하고 슬라이드 전환에는 민감하다.

use image::{imageops::FilterType, DynamicImage};
use slidecap_core::error::CoreError;
use slidecap_core::models::slide::PerceptualHash;

/// DCT 블록 크기
const DCT_SIZE: usize = 8;

/// 프레임의 64비트 지각 해시 계산
pub fn compute(frame: &DynamicImage) -> Result<PerceptualHash, CoreError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CoreError::PrimitiveCompute(
            "빈 프레임은 해시 계산 불가".to_string(),
        ));
    }

    // 32×32 그레이스케일로 축소한 뒤 8×8로 한 번 더 줄인다.
    // 두 단계 축소가 한 번에 8×8로 가는 것보다 고주파 잡음에 강하다.
    let gray = frame.resize_exact(32, 32, FilterType::Triangle).to_luma8();
    let tiny = image::imageops::resize(&gray, 8, 8, FilterType::Triangle);

    let mut block = [[0f64; DCT_SIZE]; DCT_SIZE];
    for (y, row) in block.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = tiny.get_pixel(x as u32, y as u32)[0] as f64;
        }
    }

    let dct = dct_2d(&block);

    // 저주파 블록 전체의 중앙값을 기준으로 부호 패턴 생성
    let mut coeffs: Vec<f64> = dct.iter().flatten().copied().collect();
    let med = median(&mut coeffs);

    let mut bits = 0u64;
    for row in dct.iter() {
        for &c in row.iter() {
            bits <<= 1;
            if c > med {
                bits |= 1;
            }
        }
    }

    Ok(PerceptualHash(bits))
}

/// 2D DCT-II (8×8 직접 계산)
fn dct_2d(block: &[[f64; DCT_SIZE]; DCT_SIZE]) -> [[f64; DCT_SIZE]; DCT_SIZE] {
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    let n = DCT_SIZE as f64;
    let mut out = [[0f64; DCT_SIZE]; DCT_SIZE];

    for (u, out_row) in out.iter_mut().enumerate() {
        for (v, out_cell) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for (y, row) in block.iter().enumerate() {
                for (x, &val) in row.iter().enumerate() {
                    sum += val
                        * ((2 * y + 1) as f64 * u as f64 * PI / (2.0 * n)).cos()
                        * ((2 * x + 1) as f64 * v as f64 * PI / (2.0 * n)).cos();
                }
            }
            let cu = if u == 0 { FRAC_1_SQRT_2 } else { 1.0 };
            let cv = if v == 0 { FRAC_1_SQRT_2 } else { 1.0 };
            *out_cell = 0.25 * cu * cv * sum;
        }
    }

    out
}

/// 중앙값 — 짝수 개면 가운데 두 값의 평균
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// 바이트 열 해밍 거리 — 길이가 다르면 짧은 쪽까지만 센다
pub fn hamming_bytes(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// LCG 기반 결정적 블록 패턴 (32px 셀 8×8)
    fn block_pattern(seed: u64, lo: u8, hi: u8) -> DynamicImage {
        let mut state = seed;
        let mut bits = [false; 64];
        for b in bits.iter_mut() {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *b = (state >> 62) & 1 == 1;
        }
        let img = RgbImage::from_fn(256, 256, |x, y| {
            let cell = (y / 32) * 8 + (x / 32);
            let v = if bits[cell as usize] { hi } else { lo };
            Rgb([v, v, v])
        });
        DynamicImage::ImageRgb8(img)
    }

    /// 포토메트릭 반전 — 해시가 거의 완전히 뒤집힌다
    fn invert(img: &DynamicImage) -> DynamicImage {
        let rgb = img.to_rgb8();
        let inv = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let p = rgb.get_pixel(x, y);
            Rgb([255 - p[0], 255 - p[1], 255 - p[2]])
        });
        DynamicImage::ImageRgb8(inv)
    }

    #[test]
    fn identical_image_zero_distance() {
        let img = block_pattern(7, 40, 215);
        let h1 = compute(&img).unwrap();
        let h2 = compute(&img).unwrap();
        assert_eq!(h1.distance(h2), 0);
    }

    #[test]
    fn hash_discrimination_distinct_patterns() {
        // 반전 이미지는 DCT 부호가 뒤집혀 해밍 거리가 크게 벌어진다
        let a = block_pattern(7, 40, 215);
        let b = invert(&a);
        let d = compute(&a).unwrap().distance(compute(&b).unwrap());
        assert!(d > 25, "반전 패턴 거리 {d} <= 25");
    }

    #[test]
    fn hash_stability_under_jpeg_recompress() {
        let img = block_pattern(7, 40, 215);

        // 경미한 JPEG 재압축 시뮬레이션
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 85);
        img.to_rgb8().write_with_encoder(encoder).unwrap();
        let recompressed = image::load_from_memory(&buf).unwrap();

        let d = compute(&img)
            .unwrap()
            .distance(compute(&recompressed).unwrap());
        assert!(d < 20, "재압축 후 거리 {d} >= 20");
    }

    #[test]
    fn empty_frame_is_error() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            compute(&img),
            Err(CoreError::PrimitiveCompute(_))
        ));
    }

    #[test]
    fn hamming_bytes_counts_bits() {
        assert_eq!(hamming_bytes(&[0x00], &[0xFF]), 8);
        assert_eq!(hamming_bytes(&[0b1010], &[0b0101]), 4);
        // 길이가 다르면 짧은 쪽까지만
        assert_eq!(hamming_bytes(&[0xFF, 0xFF], &[0x00]), 8);
        assert_eq!(hamming_bytes(&[], &[0xFF]), 0);
    }

    #[test]
    fn median_even_and_odd() {
        let mut even = [1.0, 3.0, 2.0, 4.0];
        assert!((median(&mut even) - 2.5).abs() < f64::EPSILON);
        let mut odd = [5.0, 1.0, 3.0];
        assert!((median(&mut odd) - 3.0).abs() < f64::EPSILON);
    }
}
