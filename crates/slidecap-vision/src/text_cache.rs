//! OCR 텍스트 캐시.
//!
//! 지각 해시를 키로 하는 호출자 소유 LRU 캐시. 같은 프레임(특히 마지막
//! 수락 슬라이드)이 후보마다 반복 비교되므로 OCR 결과를 재사용한다.
//! 크기가 제한되어 긴 영상에서도 무한히 자라지 않는다.

use std::num::NonZeroUsize;

use lru::LruCache;
use slidecap_core::models::slide::PerceptualHash;

/// 지각 해시 키 LRU 텍스트 캐시
pub struct TextCache {
    entries: LruCache<PerceptualHash, String>,
}

impl TextCache {
    /// 최대 항목 수를 지정해 생성 (0이면 1로 올림)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity must be > 0");
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// 캐시 조회 (히트 시 최근 사용으로 갱신)
    pub fn get(&mut self, hash: &PerceptualHash) -> Option<&String> {
        self.entries.get(hash)
    }

    /// 캐시 저장
    pub fn put(&mut self, hash: PerceptualHash, text: String) {
        self.entries.put(hash, text);
    }

    /// 현재 항목 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 최대 용량
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_and_miss() {
        let mut cache = TextCache::new(4);
        let h = PerceptualHash(0xAB);
        assert!(cache.get(&h).is_none());

        cache.put(h, "hello".to_string());
        assert_eq!(cache.get(&h).map(String::as_str), Some("hello"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = TextCache::new(2);
        let (h1, h2, h3) = (PerceptualHash(1), PerceptualHash(2), PerceptualHash(3));

        cache.put(h1, "a".to_string());
        cache.put(h2, "b".to_string());

        // h1을 최근 사용으로 갱신 → h2가 축출 대상
        cache.get(&h1);
        cache.put(h3, "c".to_string());

        assert!(cache.get(&h1).is_some());
        assert!(cache.get(&h2).is_none());
        assert!(cache.get(&h3).is_some());
    }

    #[test]
    fn zero_capacity_raised_to_one() {
        let mut cache = TextCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(PerceptualHash(1), "a".to_string());
        cache.put(PerceptualHash(2), "b".to_string());
        assert_eq!(cache.len(), 1);
    }
}
