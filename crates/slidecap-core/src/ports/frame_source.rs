//! 프레임 소스 포트.
//!
//! 구현: 영상 디코더 어댑터 (임베딩 애플리케이션 소관).
//! 프레임 단위 디코드는 블로킹 연산으로 모델링된다 — 요청마다
//! 독립적인 디코더 핸들을 열 수 있으므로 호출 측에서 병렬화해도 된다.

use image::DynamicImage;

use crate::error::CoreError;

/// 프레임 소스 — 프레임 단위 디코드 capability
pub trait FrameSource: Send + Sync {
    /// 지정 인덱스의 프레임을 픽셀 버퍼로 반환.
    ///
    /// 프레임이 없거나 손상된 경우 [`CoreError::FrameDecode`]를 반환하며,
    /// 호출 측은 해당 후보를 건너뛰고 계속 진행한다.
    fn fetch_frame(&self, index: u64) -> Result<DynamicImage, CoreError>;

    /// 총 프레임 수
    fn frame_count(&self) -> u64;

    /// 초당 프레임 수
    fn fps(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    /// 단색 프레임을 돌려주는 최소 구현
    struct SolidSource {
        frames: u64,
    }

    impl FrameSource for SolidSource {
        fn fetch_frame(&self, index: u64) -> Result<DynamicImage, CoreError> {
            if index >= self.frames {
                return Err(CoreError::FrameDecode {
                    index,
                    message: "범위 밖".to_string(),
                });
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                16,
                16,
                image::Rgba([0, 0, 0, 255]),
            )))
        }

        fn frame_count(&self) -> u64 {
            self.frames
        }

        fn fps(&self) -> f64 {
            30.0
        }
    }

    #[test]
    fn out_of_range_is_decode_error() {
        let source = SolidSource { frames: 10 };
        assert!(source.fetch_frame(0).is_ok());
        let err = source.fetch_frame(10).unwrap_err();
        assert!(matches!(err, CoreError::FrameDecode { index: 10, .. }));
    }
}
