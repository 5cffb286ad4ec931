//! Normalisation of Aozora Bunko notation into plain reading text.
//!
//! The stages run in a fixed order, each consuming the full output of the
//! previous one:
//! 1. iteration marks are expanded
//! 2. the header is split off and the legend dropped
//! 3. the bibliographic footer is cut
//! 4. ruby glosses, editorial instructions and markup symbols are removed
//!
//! The header is carried through untouched and prepended to the cleaned body.

pub mod annotation;
pub mod iteration;
pub mod markup;

pub use annotation::{ANNOTATION_DELIMITER, FOOTER_MARKER, SplitResult};
pub use iteration::{IterationMarkAnomaly, REPEAT_SYMBOLS, RepeatSymbol};

use crate::config::NormalizeConfig;
use tracing::{debug, warn};

/// Output of the normalisation stages for one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Header (title and author lines), unmodified.
    pub header: String,
    /// Narrative body with all markup removed.
    pub body: String,
    /// Iteration marks that could not be expanded.
    pub anomalies: Vec<IterationMarkAnomaly>,
}

impl Normalized {
    /// Returns the text written to the output file.
    pub fn output(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

/// Runs the normalisation stages with a given delimiter and footer marker.
#[derive(Debug, Clone)]
pub struct Normalizer {
    delimiter: String,
    footer_marker: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ANNOTATION_DELIMITER, FOOTER_MARKER)
    }
}

impl Normalizer {
    /// Creates a normalizer with explicit delimiter and footer marker.
    pub fn new(delimiter: impl Into<String>, footer_marker: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            footer_marker: footer_marker.into(),
        }
    }

    /// Creates a normalizer from the `[normalize]` config section.
    pub fn from_config(config: &NormalizeConfig) -> Self {
        Self::new(&config.annotation_delimiter, &config.footer_marker)
    }

    /// Normalises a decoded text.
    pub fn normalize(&self, text: &str) -> Normalized {
        let expansion = iteration::expand(text);
        for anomaly in &expansion.anomalies {
            warn!(
                symbol = anomaly.symbol,
                unexpanded = anomaly.unexpanded,
                "iteration mark left unexpanded"
            );
        }
        debug!("iteration marks expanded");

        let split = annotation::split_annotation(&expansion.text, &self.delimiter);
        if split.header.is_empty() {
            debug!("no legend block found, keeping whole text as body");
        } else {
            debug!("legend block removed");
        }

        let body = annotation::trim_footer(&split.body, &self.footer_marker);
        debug!("footer trimmed");

        let body = markup::strip_ruby(body);
        debug!("ruby removed");
        let body = markup::strip_brackets(&body);
        debug!("brackets removed");
        let body = markup::strip_symbols(&body);
        debug!("symbols removed");

        Normalized {
            header: split.header,
            body,
            anomalies: expansion.anomalies,
        }
    }
}
