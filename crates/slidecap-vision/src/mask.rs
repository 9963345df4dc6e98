//! 프레젠터 영역 마스킹.
//!
//! 감지 박스의 크기/위치가 프레임마다 흔들리므로 박스별 합성 마스크를
//! 만드는 대신, 영역이 하나라도 감지되면 양쪽 프레임을 동일한 중앙
//! 영역(각 변 20% 마진)으로 잘라 비교한다. 마진 안에서 일어나는
//! 프레젠터 움직임은 통째로 무시된다.

use image::DynamicImage;

/// 각 변에서 잘라낼 마진 비율
pub const MARGIN_RATIO: f32 = 0.2;

/// 프레임의 중앙 영역만 잘라 반환
///
/// 마진을 적용할 수 없을 만큼 작은 프레임은 그대로 반환한다.
pub fn central_region(frame: &DynamicImage) -> DynamicImage {
    let (w, h) = (frame.width(), frame.height());
    let mx = (w as f32 * MARGIN_RATIO) as u32;
    let my = (h as f32 * MARGIN_RATIO) as u32;

    let cw = w.saturating_sub(2 * mx);
    let ch = h.saturating_sub(2 * my);
    if cw == 0 || ch == 0 {
        return frame.clone();
    }

    frame.crop_imm(mx, my, cw, ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn crops_to_central_sixty_percent() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 200));
        let cropped = central_region(&img);
        assert_eq!(cropped.dimensions(), (60, 120));
    }

    #[test]
    fn margin_content_excluded() {
        // 테두리는 흰색, 중앙은 검은색
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(100, 100, |x, y| {
            if (20..80).contains(&x) && (20..80).contains(&y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }));
        let cropped = central_region(&img).to_rgb8();
        assert!(cropped.pixels().all(|p| p[0] == 0), "마진 픽셀이 남아 있음");
    }

    #[test]
    fn tiny_frame_returned_whole() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let cropped = central_region(&img);
        assert_eq!(cropped.dimensions(), (2, 2));
    }
}
