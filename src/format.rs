//! Field Formatter - Pure Display Transforms
//!
//! Nothing here fails. Input that cannot be interpreted is passed through.

use crate::document::Inline;

/// Minus sign for negative modifiers. An en dash, not a hyphen.
pub const MINUS: char = '\u{2013}';

/// Trigger substring emphasised in ability text.
pub const HIT_MARKER: &str = "Hit:";

/// Expand a one-letter size code. Unknown codes pass through.
pub fn size_name(code: &str) -> &str {
    match code {
        "G" => "Gargantuan",
        "H" => "Huge",
        "L" => "Large",
        "M" => "Medium",
        "S" => "Small",
        "T" => "Tiny",
        other => other,
    }
}

/// `"<size> <type>, <alignment>"`
pub fn subtitle(size: &str, creature_type: &str, alignment: &str) -> String {
    format!("{} {}, {}", size_name(size), creature_type, alignment)
}

/// `floor((score - 10) / 2)`, rounding toward negative infinity.
/// Widened so every `i32` score has a modifier; the result always fits.
pub fn ability_modifier(score: i32) -> i32 {
    (i64::from(score) - 10).div_euclid(2) as i32
}

pub fn formatted_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("{}{}", MINUS, modifier.unsigned_abs())
    }
}

/// `"16 (+3)"`. The score is shown as written; non-numeric scores are
/// returned unchanged.
pub fn ability_text(score: &str) -> String {
    let written = score.trim();
    match written.parse::<i32>() {
        Ok(value) => format!("{} ({})", written, formatted_modifier(ability_modifier(value))),
        Err(_) => score.to_string(),
    }
}

/// Split a paragraph so every `"Hit:"` becomes an emphasis span.
pub fn mark_hits(text: &str) -> Vec<Inline> {
    let mut spans = vec![];
    let mut rest = text;
    while let Some(idx) = rest.find(HIT_MARKER) {
        if idx > 0 {
            spans.push(Inline::Plain(rest[..idx].to_string()));
        }
        spans.push(Inline::Emphasis(HIT_MARKER.to_string()));
        rest = &rest[idx + HIT_MARKER.len()..];
    }
    if !rest.is_empty() || spans.is_empty() {
        spans.push(Inline::Plain(rest.to_string()));
    }
    spans
}

/// Leading value of an AC or HP line: `"15 (natural armor)"` -> `"15"`.
pub fn short_value(text: &str) -> &str {
    match text.split_once(' ') {
        Some((head, _)) => head,
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, -5)]
    #[case(8, -1)]
    #[case(9, -1)]
    #[case(10, 0)]
    #[case(11, 0)]
    #[case(16, 3)]
    #[case(20, 5)]
    #[case(30, 10)]
    #[case(i32::MIN, -1_073_741_829)]
    #[case(i32::MAX, 1_073_741_818)]
    fn test_ability_modifier(#[case] score: i32, #[case] expected: i32) {
        assert_eq!(ability_modifier(score), expected);
    }

    #[rstest]
    #[case("16", "16 (+3)")]
    #[case("10", "10 (+0)")]
    #[case("9", "9 (\u{2013}1)")]
    #[case("1", "1 (\u{2013}5)")]
    #[case(" 12 ", "12 (+1)")]
    #[case("--", "--")]
    #[case("14 (see text)", "14 (see text)")]
    #[case("012", "012 (+1)")]
    #[case("+5", "+5 (\u{2013}3)")]
    #[case("-2147483648", "-2147483648 (\u{2013}1073741829)")]
    #[case("2147483647", "2147483647 (+1073741818)")]
    #[case("99999999999", "99999999999")]
    fn test_ability_text(#[case] score: &str, #[case] expected: &str) {
        assert_eq!(ability_text(score), expected);
    }

    #[test]
    fn test_negative_modifier_uses_en_dash() {
        let text = formatted_modifier(-2);
        assert!(!text.contains('-'));
        assert!(text.starts_with(MINUS));
    }

    #[rstest]
    #[case("G", "Gargantuan")]
    #[case("H", "Huge")]
    #[case("L", "Large")]
    #[case("M", "Medium")]
    #[case("S", "Small")]
    #[case("T", "Tiny")]
    #[case("X", "X")]
    #[case("", "")]
    fn test_size_name(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(size_name(code), expected);
    }

    #[test]
    fn test_subtitle_punctuation() {
        assert_eq!(subtitle("M", "humanoid (orc)", "chaotic evil"), "Medium humanoid (orc), chaotic evil");
    }

    #[test]
    fn test_mark_hits_every_occurrence() {
        let spans = mark_hits("Hit: 5 damage. Hit: again");
        assert_eq!(
            spans,
            vec![
                Inline::Emphasis("Hit:".into()),
                Inline::Plain(" 5 damage. ".into()),
                Inline::Emphasis("Hit:".into()),
                Inline::Plain(" again".into()),
            ]
        );
    }

    #[test]
    fn test_mark_hits_leaves_no_bare_trigger() {
        let spans = mark_hits("Melee Weapon Attack: +4 to hit. Hit: 5 (1d6 + 2). Hit:Hit:");
        for span in &spans {
            if let Inline::Plain(text) = span {
                assert!(!text.contains(HIT_MARKER));
            }
        }
        let emphasised = spans.iter().filter(|s| matches!(s, Inline::Emphasis(_))).count();
        assert_eq!(emphasised, 3);
    }

    #[test]
    fn test_mark_hits_plain_text_untouched() {
        assert_eq!(mark_hits("no trigger, hit: lowercase"), vec![Inline::Plain("no trigger, hit: lowercase".into())]);
        assert_eq!(mark_hits(""), vec![Inline::Plain(String::new())]);
    }

    #[test]
    fn test_short_value() {
        assert_eq!(short_value("15 (natural armor)"), "15");
        assert_eq!(short_value("45 (6d10 + 12)"), "45");
        assert_eq!(short_value("12"), "12");
        assert_eq!(short_value(""), "");
    }
}
