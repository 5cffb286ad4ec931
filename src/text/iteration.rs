//! Expansion of iteration marks (odoriji) into literal text.
//!
//! Each mark repeats the one or two characters in front of it. The passes
//! run one after another over an owned string: a later pass must see the
//! output of the earlier ones (`あゝゞ` only expands fully because the `ゞ`
//! pass sees the `あ` produced by the `ゝ` pass).

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;
use unicode_normalization::char::compose;

/// Combining voiced sound mark.
const COMBINING_DAKUTEN: char = '\u{3099}';

/// An iteration mark and the rule for expanding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSymbol {
    /// The mark as it appears in the text.
    pub glyph: &'static str,
    /// Number of preceding characters the mark repeats.
    pub span: usize,
    /// Whether the repeated characters take a dakuten.
    pub voiced: bool,
}

/// Recognised marks, in the order their passes run.
pub const REPEAT_SYMBOLS: [RepeatSymbol; 4] = [
    RepeatSymbol {
        glyph: "ゝ",
        span: 1,
        voiced: false,
    },
    // The voiced kana mark is copied literally; the preceding kana is
    // already written in the form the reading needs.
    RepeatSymbol {
        glyph: "ゞ",
        span: 1,
        voiced: false,
    },
    RepeatSymbol {
        glyph: "／＼",
        span: 2,
        voiced: false,
    },
    RepeatSymbol {
        glyph: "／″＼",
        span: 2,
        voiced: true,
    },
];

impl RepeatSymbol {
    /// Matches `span` characters on the same line followed by the mark.
    fn pattern(&self) -> Regex {
        let source = format!(r"([^\r\n]{{{}}}){}", self.span, regex::escape(self.glyph));
        Regex::new(&source).expect("Invalid iteration mark pattern")
    }

    fn repeat(&self, segment: &str) -> String {
        if self.voiced {
            voice(segment)
        } else {
            segment.to_string()
        }
    }
}

static PASSES: LazyLock<Vec<(RepeatSymbol, Regex)>> = LazyLock::new(|| {
    REPEAT_SYMBOLS
        .iter()
        .map(|symbol| (*symbol, symbol.pattern()))
        .collect()
});

/// Occurrences of a mark that no pass could expand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationMarkAnomaly {
    pub symbol: &'static str,
    pub unexpanded: usize,
}

/// Result of expanding every iteration mark in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    pub anomalies: Vec<IterationMarkAnomaly>,
}

/// Replaces every expandable iteration mark with the text it stands for.
///
/// Marks that have nothing to repeat (start of a line, or a predecessor
/// already consumed by another match) stay in place and are reported.
pub fn expand(text: &str) -> Expansion {
    let mut anomalies = Vec::new();

    let text = PASSES
        .iter()
        .fold(text.to_string(), |working, (symbol, pattern)| {
            let (expanded, anomaly) = expand_symbol(working, symbol, pattern);
            anomalies.extend(anomaly);
            expanded
        });

    Expansion { text, anomalies }
}

fn expand_symbol(
    text: String,
    symbol: &RepeatSymbol,
    pattern: &Regex,
) -> (String, Option<IterationMarkAnomaly>) {
    let occurrences = text.matches(symbol.glyph).count();
    if occurrences == 0 {
        return (text, None);
    }

    let mut expanded = 0usize;
    let result = pattern
        .replace_all(&text, |caps: &Captures| {
            expanded += 1;
            let segment = &caps[1];
            format!("{}{}", segment, symbol.repeat(segment))
        })
        .into_owned();

    let unexpanded = occurrences.saturating_sub(expanded);
    let anomaly = (unexpanded > 0).then_some(IterationMarkAnomaly {
        symbol: symbol.glyph,
        unexpanded,
    });

    (result, anomaly)
}

/// Converts kana to their voiced (dakuten) forms.
///
/// Characters without a voiced counterpart are returned unchanged.
pub fn voice(segment: &str) -> String {
    segment
        .chars()
        .map(|c| compose(c, COMBINING_DAKUTEN).unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_without_marks_is_unchanged() {
        let text = "吾輩は猫である。\r\n名前はまだ無い。";
        let expansion = expand(text);
        assert_eq!(expansion.text, text);
        assert!(expansion.anomalies.is_empty());
    }

    #[test]
    fn test_single_kana_marks() {
        assert_eq!(expand("こゝろ").text, "こころ");
        assert_eq!(expand("みすゞ").text, "みすす");
    }

    #[test]
    fn test_two_character_repeat() {
        assert_eq!(expand("いろ／＼な").text, "いろいろな");
    }

    #[test]
    fn test_voiced_two_character_repeat() {
        assert_eq!(expand("ほと／″＼").text, "ほとぼど");
        assert_eq!(expand("しみ／″＼と").text, "しみじみと");
        assert_eq!(expand("カタ／″＼").text, "カタガダ");
    }

    #[test]
    fn test_voice_leaves_unvoiceable_characters() {
        assert_eq!(voice("かさたは"), "がざだば");
        assert_eq!(voice("あん"), "あん");
        assert_eq!(voice("が"), "が");
        assert_eq!(voice("う"), "ゔ");
    }

    #[test]
    fn test_passes_run_in_order() {
        // The ゞ pass repeats the あ written by the ゝ pass.
        assert_eq!(expand("あゝゞ").text, "あああ");
    }

    #[test]
    fn test_mark_at_start_is_reported() {
        let expansion = expand("ゝから");
        assert_eq!(expansion.text, "ゝから");
        assert_eq!(
            expansion.anomalies,
            vec![IterationMarkAnomaly {
                symbol: "ゝ",
                unexpanded: 1
            }]
        );
    }

    #[test]
    fn test_mark_does_not_cross_lines() {
        let expansion = expand("ろ\n／＼");
        assert_eq!(expansion.text, "ろ\n／＼");
        assert_eq!(expansion.anomalies.len(), 1);
        assert_eq!(expansion.anomalies[0].symbol, "／＼");
    }

    #[test]
    fn test_mark_after_lone_carriage_return() {
        let expansion = expand("あ\rゝ");
        assert_eq!(expansion.text, "あ\rゝ");
        assert_eq!(expansion.anomalies[0].symbol, "ゝ");
    }

    #[test]
    fn test_consecutive_marks_expand_once() {
        let expansion = expand("いろ／＼／＼");
        assert_eq!(expansion.text, "いろいろ／＼");
        assert_eq!(expansion.anomalies[0].unexpanded, 1);
    }

    #[test]
    fn test_plain_and_voiced_repeats_do_not_interfere() {
        assert_eq!(expand("時々／＼さら／″＼").text, "時々時々さらざら");
    }
}
