//! slidecap-vision 성능 벤치마크
//!
//! 실행: cargo bench -p slidecap-vision
//!
//! 벤치마크 대상:
//! - 지각 해시 (phash::compute)
//! - 히스토그램 거리 (histogram::distance)
//! - SSIM (ssim::similarity)
//! - 상태 없는 다단계 비교 (is_different_slide)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, Rgba, RgbaImage};
use slidecap_core::config::ComparatorConfig;
use slidecap_vision::{histogram, is_different_slide, phash, ssim};

/// 테스트용 랜덤 이미지 생성
fn create_test_image(width: u32, height: u32, seed: u8) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = (x as u8).wrapping_add(seed).wrapping_mul(17);
        let g = (y as u8).wrapping_add(seed).wrapping_mul(31);
        let b = (x as u8).wrapping_add(y as u8).wrapping_add(seed);
        *pixel = Rgba([r, g, b, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

/// 부분 변경된 이미지 생성
fn create_modified_image(base: &DynamicImage, change_ratio: f32) -> DynamicImage {
    let mut img = base.to_rgba8();
    let (w, h) = img.dimensions();
    let change_width = (w as f32 * change_ratio.sqrt()) as u32;
    let change_height = (h as f32 * change_ratio.sqrt()) as u32;

    // 좌상단 영역만 변경
    for y in 0..change_height.min(h) {
        for x in 0..change_width.min(w) {
            let pixel = img.get_pixel_mut(x, y);
            pixel[0] = pixel[0].wrapping_add(50);
            pixel[1] = pixel[1].wrapping_add(30);
        }
    }
    DynamicImage::ImageRgba8(img)
}

/// 지각 해시 벤치마크
fn bench_phash(c: &mut Criterion) {
    let mut group = c.benchmark_group("perceptual_hash");

    let resolutions = [(640, 480), (1280, 720), (1920, 1080)];

    for (width, height) in resolutions {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let img = create_test_image(width, height, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &img,
            |b, img| {
                b.iter(|| black_box(phash::compute(img).unwrap()));
            },
        );
    }

    group.finish();
}

/// 히스토그램 거리 벤치마크
fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram_distance");

    let prev = create_test_image(1280, 720, 42);
    let curr = create_modified_image(&prev, 0.25);

    group.throughput(Throughput::Elements(1280 * 720));
    group.bench_function("1280x720_25%_change", |b| {
        b.iter(|| black_box(histogram::distance(&prev, &curr).unwrap()));
    });

    group.finish();
}

/// SSIM 벤치마크
fn bench_ssim(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssim");

    let resolutions = [(640, 480), (1280, 720)];

    for (width, height) in resolutions {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let prev = create_test_image(width, height, 42).to_luma8();
        let curr = create_modified_image(&create_test_image(width, height, 42), 0.10).to_luma8();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &(&prev, &curr),
            |b, (prev, curr)| {
                b.iter(|| black_box(ssim::similarity(prev, curr).unwrap()));
            },
        );
    }

    group.finish();
}

/// 다단계 비교 벤치마크 — 해시 게이트에서 일찍 끝나는 경우와
/// 느린 단계까지 내려가는 경우의 비용 차이를 본다
fn bench_staged_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("staged_compare");
    let config = ComparatorConfig::default();

    let base = create_test_image(1280, 720, 42);
    let identical = base.clone();
    let slight = create_modified_image(&base, 0.05);
    let different = create_test_image(1280, 720, 200);

    group.bench_function("identical_frames", |b| {
        b.iter(|| black_box(is_different_slide(&identical, &base, &config)));
    });
    group.bench_function("slight_change", |b| {
        b.iter(|| black_box(is_different_slide(&slight, &base, &config)));
    });
    group.bench_function("different_frames", |b| {
        b.iter(|| black_box(is_different_slide(&different, &base, &config)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_phash,
    bench_histogram,
    bench_ssim,
    bench_staged_compare
);
criterion_main!(benches);
