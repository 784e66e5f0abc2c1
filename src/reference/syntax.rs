//! Reference syntax and scanner
//!
//! Values refer to other tokens with `{path.to.token}`. The scanner splits a
//! value string into literal text and reference segments so resolution and
//! cycle tracking work on explicit paths instead of regex matches.

use serde::{Deserialize, Serialize};

/// Delimiters used to recognise references inside string values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceSyntax {
    pub opening: char,
    pub closing: char,
    pub separator: char,
}

impl Default for ReferenceSyntax {
    fn default() -> Self {
        Self {
            opening: '{',
            closing: '}',
            separator: '.',
        }
    }
}

/// One piece of a scanned value string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Reference(Vec<String>),
}

impl ReferenceSyntax {
    /// Split `input` into literal and reference segments.
    ///
    /// An opening delimiter only starts a reference when a closing delimiter
    /// follows before any other opening delimiter and the enclosed path is
    /// non-empty; anything else is literal text.
    pub fn scan(&self, input: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = input;

        while let Some(start) = rest.find(self.opening) {
            let after_open = &rest[start + self.opening.len_utf8()..];
            match self.reference_body(after_open) {
                Some((path, consumed)) => {
                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Reference(path));
                    rest = &after_open[consumed..];
                }
                None => {
                    let literal_end = start + self.opening.len_utf8();
                    literal.push_str(&rest[..literal_end]);
                    rest = &rest[literal_end..];
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments
    }

    /// Parse the text following an opening delimiter. Returns the path and the
    /// number of bytes consumed including the closing delimiter.
    fn reference_body(&self, input: &str) -> Option<(Vec<String>, usize)> {
        for (index, ch) in input.char_indices() {
            if ch == self.closing {
                let path = self.parse_path(&input[..index])?;
                return Some((path, index + ch.len_utf8()));
            }
            if ch == self.opening {
                return None;
            }
        }
        None
    }

    fn parse_path(&self, body: &str) -> Option<Vec<String>> {
        let body = body.trim();
        if body.is_empty() {
            return None;
        }

        let mut path: Vec<String> = body
            .split(self.separator)
            .map(|segment| segment.trim().to_string())
            .collect();
        if path.iter().any(String::is_empty) {
            return None;
        }

        // `{color.base.value}` addresses the token `color.base`
        if path.len() > 1 && path.last().map(String::as_str) == Some("value") {
            path.pop();
        }
        Some(path)
    }

    /// Whether `input` contains at least one reference.
    pub fn contains_reference(&self, input: &str) -> bool {
        self.scan(input)
            .iter()
            .any(|segment| matches!(segment, Segment::Reference(_)))
    }

    /// Referenced paths in order of appearance.
    pub fn references(&self, input: &str) -> Vec<Vec<String>> {
        self.scan(input)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Reference(path) => Some(path),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Render a path back into reference syntax.
    pub fn format_reference(&self, path: &[String]) -> String {
        let separator = self.separator.to_string();
        format!("{}{}{}", self.opening, path.join(&separator), self.closing)
    }
}
