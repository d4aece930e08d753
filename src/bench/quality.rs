//! Heuristic 0–10 quality score for benchmark answers.
//!
//! | Rule                                                   | Points |
//! |--------------------------------------------------------|--------|
//! | more than 10 characters                                | 2      |
//! | contains a character above U+3000                      | 2      |
//! | kind-specific content (see [`score`])                  | 2      |
//! | 51–999 characters (or 1 point for more than 20)        | 2      |
//! | contains `。` or `.`                                   | 2      |

use lazy_static::lazy_static;
use regex::Regex;

use super::prompts::PromptKind;

/// Highest possible score
pub const MAX_SCORE: u8 = 10;

lazy_static! {
    static ref JAPANESE: Option<Regex> = Regex::new(r"[\x{3001}-\x{10FFFF}]").ok();
    static ref MATH: Option<Regex> = Regex::new(r"[0-9+\-*/=]").ok();
    static ref SENTENCE_END: Option<Regex> = Regex::new(r"[。.]").ok();
}

fn matches(pattern: Option<&Regex>, text: &str) -> bool {
    pattern.is_some_and(|re| re.is_match(text))
}

/// Whether the text contains CJK/Japanese characters (anything above U+3000)
pub fn has_japanese(text: &str) -> bool {
    matches(JAPANESE.as_ref(), text)
}

/// Score an answer for a prompt of the given kind.
///
/// Kind-specific points: math reasoning needs a digit or one of `+-*/=`, code
/// needs `def` or `function`, translation needs an ASCII character, every
/// other kind gets the points unconditionally.
pub fn score(response: &str, kind: PromptKind) -> u8 {
    let length = response.chars().count();
    let mut points = 0;

    if length > 10 {
        points += 2;
    }

    if has_japanese(response) {
        points += 2;
    }

    let kind_specific = match kind {
        k if k.is_math() => matches(MATH.as_ref(), response),
        PromptKind::CodeGeneration => response.contains("def") || response.contains("function"),
        PromptKind::Translation => response.chars().any(|c| c.is_ascii()),
        _ => true,
    };
    if kind_specific {
        points += 2;
    }

    if (51..1000).contains(&length) {
        points += 2;
    } else if length > 20 {
        points += 1;
    }

    if matches(SENTENCE_END.as_ref(), response) {
        points += 2;
    }

    points.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_japanese() {
        assert!(has_japanese("こんにちは"));
        assert!(has_japanese("漢字"));
        assert!(has_japanese("abc、"));
        assert!(!has_japanese("hello world"));
        // U+3000 (ideographic space) itself does not count
        assert!(!has_japanese("\u{3000}"));
    }

    #[test]
    fn test_full_marks() {
        let answer = "おつりは500 - (100×3 + 150×2) = -100円ではなく、合計600円なので支払いが足りません。";
        assert_eq!(score(answer, PromptKind::MathReasoning), 10);
    }

    #[test]
    fn test_empty_response_scores_default_kind_only() {
        assert_eq!(score("", PromptKind::Roleplay), 2);
        assert_eq!(score("", PromptKind::MathReasoning), 0);
        assert_eq!(score("", PromptKind::SimpleMath), 2);
    }

    #[test]
    fn test_code_rule() {
        let with_def = "def dedupe(items): return list(dict.fromkeys(items))";
        let without = "リストを集合に変換してからリストに戻すと重複が消えます";
        assert_eq!(score(with_def, PromptKind::CodeGeneration), 2 + 2 + 2 + 2);
        assert_eq!(score(without, PromptKind::CodeGeneration), 2 + 2 + 1);
    }

    #[test]
    fn test_translation_needs_ascii() {
        assert_eq!(score("ありがとう", PromptKind::Translation), 2);
        assert_eq!(score("Thank you", PromptKind::Translation), 2);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 30 Japanese characters: 90 bytes but only 30 chars, so 1 length point
        let answer = "あ".repeat(30);
        assert_eq!(score(&answer, PromptKind::Greeting), 2 + 2 + 2 + 1);
    }

    #[test]
    fn test_very_long_answer_gets_one_length_point() {
        let answer = "a".repeat(1000);
        assert_eq!(score(&answer, PromptKind::Greeting), 2 + 2 + 1);
    }

    #[test]
    fn test_simple_math_gets_default_kind_points() {
        assert_eq!(score("さんびゃく", PromptKind::SimpleMath), 2 + 2);
        assert_eq!(score("さんびゃく", PromptKind::MathReasoning), 2);
    }
}
