//! 텍스트 게이트 프리미티브.
//!
//! OCR 결과의 단어 집합 겹침 비율과 타당성 점수(깨진 OCR 출력 감지).
//! 느린 단계이므로 앞선 게이트들이 모두 결론을 내지 못한 경계 사례에만
//! 도달한다.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// 흔한 영어/강의 단어 목록 — OCR 출력 타당성 판별용
static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "this", "that", "from", "have", "not", "are", "was",
        "were", "will", "would", "should", "could", "can", "may", "might", "must", "shall",
        "who", "what", "where", "when", "why", "how", "all", "any", "both", "each", "few",
        "more", "most", "other", "some", "such", "than", "too", "very", "one", "two",
        "three", "four", "five", "first", "last", "next", "example", "note", "definition",
        "theorem", "equation", "function", "variable", "value", "data", "result",
        "analysis", "figure", "table", "chart", "graph", "slide", "page", "chapter",
        "section", "part", "introduction", "conclusion",
    ]
    .into_iter()
    .collect()
});

/// 번호가 따라붙는 강의 자료 키워드 ("Figure 3", "Eq. 2" 등)
const NUMBERED_KEYWORDS: &[&str] = &["fig", "figure", "eq", "equation", "table", "chapter", "section"];

/// 단어 차이 비율: `1 - |공통 단어| / max(|단어1|, |단어2|)`
///
/// 어느 한쪽이라도 `min_words` 미만이면 `None` — 거의 빈 영역의 OCR은
/// 신뢰할 수 없으므로 호출 측이 SSIM 폴백을 쓴다.
pub fn word_overlap_ratio(text1: &str, text2: &str, min_words: usize) -> Option<f32> {
    let words1: HashSet<&str> = text1.split_whitespace().collect();
    let words2: HashSet<&str> = text2.split_whitespace().collect();

    if words1.len() < min_words || words2.len() < min_words {
        return None;
    }

    let common = words1.intersection(&words2).count();
    let total = words1.len().max(words2.len());
    Some(1.0 - common as f32 / total as f32)
}

/// OCR 텍스트 타당성 점수 (0 ~ 1)
///
/// 알파벳 2자 이상 단어 중 흔한 단어의 비율. 그림/수식/표/장/절 번호
/// 패턴이 보이면 가산된다. 점수가 낮으면 OCR 잡음으로 간주한다.
pub fn plausibility(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }

    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| w.len() >= 2)
        .collect();

    if words.is_empty() {
        return 0.0;
    }

    let mut valid = words
        .iter()
        .filter(|w| COMMON_WORDS.contains(*w))
        .count();

    if has_numbered_keyword(&lower) {
        valid += 2;
    }

    (valid as f32 / words.len() as f32).min(1.0)
}

/// "figure 3", "eq. 2" 같은 번호 키워드 패턴 감지
fn has_numbered_keyword(lower: &str) -> bool {
    for keyword in NUMBERED_KEYWORDS {
        let mut rest = lower;
        while let Some(pos) = rest.find(keyword) {
            let after = &rest[pos + keyword.len()..];
            // 키워드 뒤 구두점/공백 몇 글자 안에 숫자가 오면 매치
            let trimmed = after.trim_start_matches(['.', ' ', '\t']);
            if trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return true;
            }
            rest = &rest[pos + keyword.len()..];
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_zero_ratio() {
        let r = word_overlap_ratio("binary search tree rotation", "binary search tree rotation", 3);
        assert_eq!(r, Some(0.0));
    }

    #[test]
    fn disjoint_text_full_ratio() {
        let r = word_overlap_ratio("alpha beta gamma", "delta epsilon zeta", 3).unwrap();
        assert!((r - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_overlap_ratio() {
        // 4단어 중 2단어 공통 → 1 - 2/4 = 0.5
        let r = word_overlap_ratio("one two three four", "one two five six", 3).unwrap();
        assert!((r - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn too_few_words_is_none() {
        assert_eq!(word_overlap_ratio("hi there", "one two three", 3), None);
        assert_eq!(word_overlap_ratio("one two three", "", 3), None);
    }

    #[test]
    fn plausible_lecture_text_scores_high() {
        let score = plausibility("This slide shows the first example of the function");
        assert!(score > 0.5, "강의 문장 점수 {score}");
    }

    #[test]
    fn gibberish_scores_low() {
        let score = plausibility("xq zvw kjh qqp mzx wvv bnm");
        assert!(score < 0.15, "깨진 텍스트 점수 {score}");
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(plausibility(""), 0.0);
        assert_eq!(plausibility("12 34 !!"), 0.0);
    }

    #[test]
    fn numbered_keyword_boosts_score() {
        let without = plausibility("xq zvw kjh qqp mzx");
        let with = plausibility("xq zvw kjh qqp mzx figure 3");
        assert!(with > without);
    }

    #[test]
    fn numbered_keyword_detection() {
        assert!(has_numbered_keyword("see figure 12 for details"));
        assert!(has_numbered_keyword("eq. 4 defines the loss"));
        assert!(!has_numbered_keyword("the figure was blurry"));
    }
}
