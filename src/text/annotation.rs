//! Removal of the front-matter legend block and the bibliographic footer.

/// Separator line around the notation legend of an Aozora Bunko text.
pub const ANNOTATION_DELIMITER: &str = "-------------------------------------------------------";

/// Token that opens the trailing bibliographic notes ("source text:").
pub const FOOTER_MARKER: &str = "底本：";

/// A text divided into its header and narrative body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitResult {
    /// Text before the first delimiter (title, author).
    pub header: String,
    /// Text after the second delimiter.
    pub body: String,
}

/// Splits off the header and drops the legend between the first two delimiters.
///
/// With fewer than two delimiters the whole text is body and the header is empty.
pub fn split_annotation(text: &str, delimiter: &str) -> SplitResult {
    if delimiter.is_empty() {
        return whole_body(text);
    }

    let mut parts = text.splitn(3, delimiter);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(_legend), Some(body)) => SplitResult {
            header: header.to_string(),
            body: skip_line_break(body).to_string(),
        },
        _ => whole_body(text),
    }
}

/// Cuts the body at the first footer marker.
pub fn trim_footer<'a>(body: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return body;
    }

    match body.find(marker) {
        Some(index) => &body[..index],
        None => body,
    }
}

fn whole_body(text: &str) -> SplitResult {
    SplitResult {
        header: String::new(),
        body: text.to_string(),
    }
}

/// The line break ending the delimiter line belongs to the separator.
fn skip_line_break(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}
