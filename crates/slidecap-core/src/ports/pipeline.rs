//! 슬라이드 추출 파이프라인 포트.
//!
//! 구현: `slidecap-vision` crate. 임베딩 애플리케이션은
//! `Arc<dyn …>` 대신 구현체를 직접 소유해도 되지만, 포트를 통해
//! 와이어링하면 테스트에서 파이프라인 전체를 대체할 수 있다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::slide::Slide;

/// 슬라이드 추출 파이프라인 — 장면 감지 → 적응 샘플링 → 분류 → 중복 제거
#[async_trait]
pub trait SlidePipeline: Send {
    /// 전체 추출 실행. 수락된 슬라이드를 시간순으로 반환한다.
    ///
    /// 비교 연산은 CPU 바운드이므로 이벤트 루프가 아닌 전용
    /// 워커/스레드에서 실행하는 것을 전제로 한다.
    async fn extract(&mut self) -> Result<Vec<Slide>, CoreError>;

    /// 협조적 중단 요청. 후보 프레임 사이와 장면 샘플 사이에서
    /// 확인되며, 이미 수락된 슬라이드는 유효하게 남는다.
    fn request_stop(&self);
}
