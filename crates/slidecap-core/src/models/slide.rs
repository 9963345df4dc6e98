//! 슬라이드 모델과 지각 해시.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 64비트 지각 해시 (pHash).
///
/// 32×32 그레이스케일 축소 → 8×8 축소 → 2D DCT 저주파 8×8 블록을
/// 블록 중앙값과 비교한 부호 패턴. 동일 슬라이드의 재압축본은 해밍
/// 거리 20 미만, 시각적으로 다른 슬라이드는 25 초과로 떨어진다.
/// 20~25 구간은 의도된 불확실 구간이며 느린 비교기로 에스컬레이션된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    /// 두 해시의 해밍 거리 (0~64)
    pub fn distance(self, other: PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// 인코딩된 슬라이드 이미지 — 코어 바깥 저장소로 넘겨지는 불투명 바이트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideImage {
    /// 인코딩된 이미지 바이트
    pub data: Vec<u8>,
    /// 이미지 포맷 (예: "webp")
    pub format: String,
}

/// 추출된 슬라이드.
///
/// 생성부터 중복 제거 판정까지 `SlideStore`가 단독 소유한다.
/// `cached_text`는 첫 OCR 요청 시에만 lazy하게 채워지며, 제거는
/// 중복 제거 패스가 나중 슬라이드를 탈락시킬 때만 일어난다
/// (먼저 나온 슬라이드가 항상 정본으로 유지된다).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 단조 증가 식별자 (추출 순서)
    pub id: u64,
    /// 원본 프레임 인덱스
    pub frame_index: u64,
    /// 영상 내 시각 (초)
    pub timestamp_secs: f64,
    /// 추출 시각 (벽시계)
    pub extracted_at: DateTime<Utc>,
    /// 인코딩된 슬라이드 이미지
    pub image: SlideImage,
    /// 지각 해시 (중복 제거 패스에서 재사용)
    pub hash: PerceptualHash,
    /// OCR 텍스트 캐시 (첫 요청 시 채워짐)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_text: Option<String>,
}
