//! Removal of internal-reasoning spans from generated text.
//!
//! A span runs from a begin marker to the nearest following end marker,
//! markers included, across newlines. A begin marker with no end marker
//! is left in place.

use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_BEGIN: &str = "<think>";
pub const DEFAULT_END: &str = "</think>";

static THINK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&span_pattern(DEFAULT_BEGIN, DEFAULT_END)).unwrap());

fn span_pattern(begin: &str, end: &str) -> String {
    format!("(?s){}.*?{}", regex::escape(begin), regex::escape(end))
}

/// Strip `<think>` … `</think>` spans.
pub fn sanitize(text: &str) -> String {
    strip_spans(&THINK_SPAN, text)
}

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("markup markers must not be empty")]
    EmptyMarker,

    #[error("invalid markup pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Sanitizer for a configured marker pair.
#[derive(Debug, Clone)]
pub struct MarkupSanitizer {
    span: Regex,
}

impl MarkupSanitizer {
    pub fn new(begin: &str, end: &str) -> Result<Self, MarkupError> {
        if begin.is_empty() || end.is_empty() {
            return Err(MarkupError::EmptyMarker);
        }
        Ok(Self {
            span: Regex::new(&span_pattern(begin, end))?,
        })
    }

    pub fn sanitize(&self, text: &str) -> String {
        strip_spans(&self.span, text)
    }
}

impl Default for MarkupSanitizer {
    fn default() -> Self {
        Self {
            span: THINK_SPAN.clone(),
        }
    }
}

// Removal repeats until nothing matches: dropping one span can join the
// halves of a marker around it into a new span.
fn strip_spans(span: &Regex, text: &str) -> String {
    let mut current = text.to_string();
    while span.is_match(&current) {
        current = span.replace_all(&current, "").into_owned();
    }
    current
}
