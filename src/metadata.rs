//! Work metadata read from the header block.
//!
//! An Aozora Bunko header opens with the title, optionally a subtitle, and
//! the author, one per line, followed by a blank line.

use serde::Serialize;

/// Characters that are not allowed in file names on common filesystems.
const FORBIDDEN_FILE_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum file name length in bytes on common filesystems.
const MAX_FILE_NAME_BYTES: usize = 255;

const OUTPUT_EXTENSION: &str = ".txt";

/// Title, subtitle and author of a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl WorkInfo {
    /// Reads the leading lines of a header.
    ///
    /// Returns `None` when the header has no non-empty line.
    pub fn from_header(header: &str) -> Option<Self> {
        let lines: Vec<&str> = header
            .lines()
            .map(str::trim)
            .skip_while(|line| line.is_empty())
            .take_while(|line| !line.is_empty())
            .collect();

        match lines.as_slice() {
            [] => None,
            [title] => Some(Self {
                title: title.to_string(),
                subtitle: None,
                author: None,
            }),
            [title, author] => Some(Self {
                title: title.to_string(),
                subtitle: None,
                author: Some(author.to_string()),
            }),
            [title, subtitle, author, ..] => Some(Self {
                title: title.to_string(),
                subtitle: Some(subtitle.to_string()),
                author: Some(author.to_string()),
            }),
        }
    }

    /// Builds an output file name prefixed with the input file name.
    ///
    /// Forbidden characters are dropped and the name is shortened to fit the
    /// filesystem limit.
    pub fn file_name(&self, input_name: &str) -> String {
        let mut name = input_name.to_string();
        for part in [Some(&self.title), self.subtitle.as_ref(), self.author.as_ref()]
            .into_iter()
            .flatten()
        {
            name.push('_');
            name.push_str(part);
        }

        name.retain(|c| !FORBIDDEN_FILE_NAME_CHARS.contains(&c));
        while name.len() + OUTPUT_EXTENSION.len() >= MAX_FILE_NAME_BYTES {
            name.pop();
        }

        format!("{}{}", name, OUTPUT_EXTENSION)
    }
}
