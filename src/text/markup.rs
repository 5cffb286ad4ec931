//! Removal of ruby glosses, editorial instructions and typographic markers.

use regex::Regex;
use std::sync::LazyLock;

/// Ruby reading gloss: `漢字《かんじ》`.
static RUBY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"《[^\r\n]+?》").expect("Invalid RUBY_REGEX"));

/// Editorial instruction or gaiji description: `［＃改ページ］`.
static BRACKET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"［＃[^\r\n]*?］").expect("Invalid BRACKET_REGEX"));

/// Ruby start marker and the doubled horizontal bar.
pub const MARKUP_SYMBOLS: [&str; 2] = ["｜", "――"];

/// Removes every `《...》` gloss together with its delimiters.
pub fn strip_ruby(text: &str) -> String {
    RUBY_REGEX.replace_all(text, "").into_owned()
}

/// Removes every `［＃...］` instruction together with its delimiters.
pub fn strip_brackets(text: &str) -> String {
    BRACKET_REGEX.replace_all(text, "").into_owned()
}

/// Deletes the literal markup symbols.
pub fn strip_symbols(text: &str) -> String {
    MARKUP_SYMBOLS
        .iter()
        .fold(text.to_string(), |acc, symbol| acc.replace(symbol, ""))
}
