//! Character encoding detection and decoding.
//!
//! Aozora Bunko texts are distributed mostly as Shift_JIS, but mirrors and
//! re-encodings in EUC-JP, ISO-2022-JP and the Unicode formats are common.
//! Detection works on byte patterns first (BOMs, escape sequences, NUL
//! bytes) and falls back to scoring strict decodes of the multibyte
//! candidates.

use crate::error::EncodingError;
use encoding_rs::{EUC_JP, Encoding, ISO_2022_JP, SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Minimum share of plausible characters for a statistical match.
const MIN_PLAUSIBILITY: f64 = 0.6;

/// UTF-32 byte-order marks, little and big endian.
const UTF32_BOMS: [&[u8]; 2] = [b"\xFF\xFE\x00\x00", b"\x00\x00\xFE\xFF"];

/// A character encoding the decoder supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingTag {
    Ascii,
    Utf8,
    Utf16Le,
    Utf16Be,
    Iso2022Jp,
    EucJp,
    ShiftJis,
}

impl EncodingTag {
    /// Returns the canonical label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            EncodingTag::Ascii => "ASCII",
            EncodingTag::Utf8 => "UTF-8",
            EncodingTag::Utf16Le => "UTF-16LE",
            EncodingTag::Utf16Be => "UTF-16BE",
            EncodingTag::Iso2022Jp => "ISO-2022-JP",
            EncodingTag::EucJp => "EUC-JP",
            EncodingTag::ShiftJis => "Shift_JIS",
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            // ASCII is decoded as its UTF-8 superset.
            EncodingTag::Ascii | EncodingTag::Utf8 => UTF_8,
            EncodingTag::Utf16Le => UTF_16LE,
            EncodingTag::Utf16Be => UTF_16BE,
            EncodingTag::Iso2022Jp => ISO_2022_JP,
            EncodingTag::EucJp => EUC_JP,
            EncodingTag::ShiftJis => SHIFT_JIS,
        }
    }

    fn bom(self) -> Option<&'static [u8]> {
        match self {
            EncodingTag::Utf8 => Some(&b"\xEF\xBB\xBF"[..]),
            EncodingTag::Utf16Le => Some(&b"\xFF\xFE"[..]),
            EncodingTag::Utf16Be => Some(&b"\xFE\xFF"[..]),
            _ => None,
        }
    }
}

impl std::fmt::Display for EncodingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for EncodingTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Text decoded from a raw buffer, together with the encoding it was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub encoding: EncodingTag,
    pub text: String,
}

/// Detects the encoding of `bytes` and decodes them.
pub fn decode(bytes: &[u8]) -> Result<Decoded, EncodingError> {
    if bytes.is_empty() {
        return Ok(Decoded {
            encoding: EncodingTag::Ascii,
            text: String::new(),
        });
    }

    if UTF32_BOMS.iter().any(|bom| bytes.starts_with(bom)) {
        return Err(EncodingError::Unsupported("UTF-32"));
    }

    for encoding in [EncodingTag::Utf8, EncodingTag::Utf16Le, EncodingTag::Utf16Be] {
        if encoding.bom().is_some_and(|bom| bytes.starts_with(bom)) {
            let text = decode_as(bytes, encoding)?;
            return Ok(Decoded { encoding, text });
        }
    }

    // NUL bytes never occur in the legacy encodings; only UTF-16 can explain them.
    if let Some(encoding) = utf16_orientation(bytes) {
        if let Some(decoded) = decode_utf16(bytes, encoding) {
            return Ok(decoded);
        }
    }

    if is_binary(bytes) {
        return Err(EncodingError::Unsupported("binary"));
    }

    if bytes.is_ascii() {
        let encoding = if has_iso2022_escape(bytes) {
            EncodingTag::Iso2022Jp
        } else {
            EncodingTag::Ascii
        };
        let text = decode_as(bytes, encoding)?;
        return Ok(Decoded { encoding, text });
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Decoded {
            encoding: EncodingTag::Utf8,
            text: text.to_string(),
        });
    }

    best_candidate(bytes, &[EncodingTag::ShiftJis, EncodingTag::EucJp]).ok_or_else(|| {
        EncodingError::Undetermined(
            "no Japanese multibyte encoding decoded the input plausibly".to_string(),
        )
    })
}

/// Decodes `bytes` strictly as `encoding`, dropping a leading BOM.
///
/// Malformed sequences fail the decode instead of being replaced.
pub fn decode_as(bytes: &[u8], encoding: EncodingTag) -> Result<String, EncodingError> {
    let body = encoding
        .bom()
        .and_then(|bom| bytes.strip_prefix(bom))
        .unwrap_or(bytes);

    encoding
        .encoding()
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or(EncodingError::Malformed(encoding.label()))
}

/// Decodes with every candidate and keeps the most plausible result.
///
/// Candidates are listed in order of preference; ties keep the earlier one.
fn best_candidate(bytes: &[u8], candidates: &[EncodingTag]) -> Option<Decoded> {
    let mut best: Option<(f64, Decoded)> = None;

    for &encoding in candidates {
        let Ok(text) = decode_as(bytes, encoding) else {
            continue;
        };
        let score = plausibility(&text);
        if score < MIN_PLAUSIBILITY {
            continue;
        }
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, Decoded { encoding, text }));
        }
    }

    best.map(|(_, decoded)| decoded)
}

/// Guesses the byte order of BOM-less UTF-16 from where the zero bytes fall.
///
/// ASCII code units put their zero in the high byte, so the side holding
/// more zeros is the high side. Buffers of odd length, without zeros, or
/// with zeros spread evenly are not UTF-16.
fn utf16_orientation(bytes: &[u8]) -> Option<EncodingTag> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let (mut even, mut odd) = (0usize, 0usize);
    for pair in bytes.chunks_exact(2) {
        even += usize::from(pair[0] == 0);
        odd += usize::from(pair[1] == 0);
    }

    match even.cmp(&odd) {
        Ordering::Less => Some(EncodingTag::Utf16Le),
        Ordering::Greater => Some(EncodingTag::Utf16Be),
        Ordering::Equal => None,
    }
}

/// Accepts a UTF-16 decode only if it reads as text.
fn decode_utf16(bytes: &[u8], encoding: EncodingTag) -> Option<Decoded> {
    let text = decode_as(bytes, encoding).ok()?;
    if text.chars().any(is_forbidden_control) || plausibility(&text) < MIN_PLAUSIBILITY {
        return None;
    }
    Some(Decoded { encoding, text })
}

/// C0 controls other than tab and line breaks.
fn is_forbidden_control(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Control bytes that never appear in a text file.
fn is_binary(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .any(|&b| matches!(b, 0x00..=0x06 | 0x7F | 0xFF))
}

fn has_iso2022_escape(bytes: &[u8]) -> bool {
    bytes
        .windows(2)
        .any(|w| w[0] == 0x1B && matches!(w[1], b'$' | b'('))
}

/// Share of characters that plausibly belong to Japanese prose.
///
/// Half-width katakana is left out on purpose: it is what EUC-JP bytes look
/// like when misread as Shift_JIS.
fn plausibility(text: &str) -> f64 {
    let mut total = 0usize;
    let mut plausible = 0usize;

    for c in text.chars() {
        total += 1;
        if is_plausible_char(c) {
            plausible += 1;
        }
    }

    if total == 0 {
        return 1.0;
    }
    plausible as f64 / total as f64
}

fn is_plausible_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | ' '..='~'
        | '\u{0391}'..='\u{044F}'   // Greek and Cyrillic
        | '\u{2000}'..='\u{206F}'   // general punctuation
        | '\u{2190}'..='\u{25FF}'   // arrows, math, box drawing, shapes
        | '\u{3000}'..='\u{30FF}'   // CJK punctuation, hiragana, katakana
        | '\u{4E00}'..='\u{9FFF}'   // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}'   // CJK compatibility ideographs
        | '\u{FF01}'..='\u{FF60}'   // full-width forms
        | '\u{FFE0}'..='\u{FFEF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "吾輩は猫である。名前はまだ無い。\r\nどこで生れたかとんと見当がつかぬ。";

    fn encode(encoding: &'static Encoding, text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = encoding.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_empty_buffer_is_ascii() {
        let decoded = decode(&[]).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Ascii);
        assert!(decoded.text.is_empty());
    }

    #[test]
    fn test_detect_ascii() {
        let decoded = decode(b"plain text\r\n").unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Ascii);
        assert_eq!(decoded.text, "plain text\r\n");
    }

    #[test]
    fn test_detect_utf8() {
        let decoded = decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Utf8);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Utf8);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_detect_shift_jis() {
        let bytes = encode(SHIFT_JIS, SAMPLE);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::ShiftJis);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_detect_euc_jp() {
        let bytes = encode(EUC_JP, SAMPLE);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::EucJp);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_detect_iso_2022_jp() {
        let bytes = encode(ISO_2022_JP, SAMPLE);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Iso2022Jp);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_detect_utf16_with_and_without_bom() {
        let le: Vec<u8> = SAMPLE.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let decoded = decode(&le).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Utf16Le);
        assert_eq!(decoded.text, SAMPLE);

        let mut be = b"\xFE\xFF".to_vec();
        be.extend(SAMPLE.encode_utf16().flat_map(u16::to_be_bytes));
        let decoded = decode(&be).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Utf16Be);
        assert_eq!(decoded.text, SAMPLE);
    }

    #[test]
    fn test_utf16_with_ideographic_spaces() {
        // U+3000 puts a zero in the low byte, opposite to the ASCII zeros.
        let text = "\u{3000}吾輩は猫である。\r\n\u{3000}名前はまだ無い。\r\n";
        let le: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let decoded = decode(&le).unwrap();
        assert_eq!(decoded.encoding, EncodingTag::Utf16Le);
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn test_binary_with_nul_is_not_utf16() {
        // Decodes as two ideographs and U+0001 in UTF-16BE.
        let err = decode(&[0x89, b'P', b'N', b'G', 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, EncodingError::Unsupported("binary")));

        let err = decode(&[b'a', 0x00, b'b']).unwrap_err();
        assert!(matches!(err, EncodingError::Unsupported("binary")));
    }

    #[test]
    fn test_utf32_is_unsupported() {
        let err = decode(b"\xFF\xFE\x00\x00a\x00\x00\x00").unwrap_err();
        assert!(matches!(err, EncodingError::Unsupported("UTF-32")));
    }

    #[test]
    fn test_binary_is_unsupported() {
        let err = decode(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x02, 0xFF]).unwrap_err();
        assert!(matches!(err, EncodingError::Unsupported("binary")));
    }

    #[test]
    fn test_undetermined_multibyte() {
        // Valid in neither Shift_JIS, EUC-JP nor UTF-8.
        let err = decode(&[0x81, 0x20, 0xA0, 0x80, 0xFD, 0xFE]).unwrap_err();
        assert!(matches!(err, EncodingError::Undetermined(_)));
    }

    #[test]
    fn test_decode_as_is_strict() {
        let err = decode_as(&[0xE3, 0x81], EncodingTag::Utf8).unwrap_err();
        assert!(matches!(err, EncodingError::Malformed("UTF-8")));
    }

    #[test]
    fn test_encoding_tag_serializes_as_label() {
        let json = serde_json::to_string(&EncodingTag::ShiftJis).unwrap();
        assert_eq!(json, "\"Shift_JIS\"");
    }
}
