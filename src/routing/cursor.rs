//! Path cursor.
//!
//! Tracks how far matching has progressed through the request path. The
//! consumed prefix and the remaining suffix always concatenate back to the
//! original path; a successful `consume` moves exactly one anchored match
//! from the right-hand side to the left-hand side.

use regex::Regex;

use crate::routing::error::DefinitionError;

/// Group body used for placeholders and the wildcard guard.
pub const SEGMENT: &str = r"([^/]+)";

/// A compiled `^/(body)(/|$)` matcher.
///
/// The first group is the consumed segment, the last group is the trailing
/// separator, anything in between is a capture.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
    body: String,
    regex: Regex,
}

impl SegmentPattern {
    /// Compile a group body. Metacharacters in `body` are not escaped.
    pub fn new(body: impl Into<String>) -> Result<Self, DefinitionError> {
        let body = body.into();
        let regex = Regex::new(&format!("^/({})(/|$)", body)).map_err(|source| {
            DefinitionError::InvalidPattern {
                pattern: body.clone(),
                source,
            }
        })?;
        Ok(Self { body, regex })
    }

    /// Single-segment wildcard.
    pub fn segment() -> Self {
        Self::new(SEGMENT).expect("segment pattern compiles")
    }

    /// The group body as written by the route author.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Number of capture groups contributed by the body itself.
    pub fn capture_count(&self) -> usize {
        // Total groups minus the implicit whole match, the segment group and
        // the trailing separator group.
        self.regex.captures_len().saturating_sub(3)
    }
}

/// Split between the matched prefix and the unmatched suffix of the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCursor {
    consumed: String,
    remaining: String,
}

impl PathCursor {
    /// Start a cursor at the beginning of `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            consumed: String::new(),
            remaining: path.into(),
        }
    }

    /// Start a cursor whose prefix was already consumed elsewhere.
    pub fn mounted(consumed: impl Into<String>, remaining: impl Into<String>) -> Self {
        Self {
            consumed: consumed.into(),
            remaining: remaining.into(),
        }
    }

    /// Portion of the path already matched.
    pub fn consumed(&self) -> &str {
        &self.consumed
    }

    /// Portion of the path not yet matched.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// The full path, `consumed ++ remaining`.
    pub fn path(&self) -> String {
        format!("{}{}", self.consumed, self.remaining)
    }

    /// Try to match `pattern` against the start of the remaining path.
    ///
    /// On success the matched segment moves to the consumed prefix, the
    /// trailing separator is pushed back onto the remaining path, and every
    /// inner capture is appended to `captures` in left-to-right order. On
    /// failure nothing changes.
    pub fn consume(&mut self, pattern: &SegmentPattern, captures: &mut Vec<String>) -> bool {
        let Some(caps) = pattern.regex.captures(&self.remaining) else {
            return false;
        };

        let groups = caps.len();
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        // Group 0 is the whole match, 1 the segment, the last one the separator.
        let whole_end = caps.get(0).map_or(0, |m| m.end());
        let segment = group(1).to_string();
        let remaining = format!("{}{}", group(groups - 1), &self.remaining[whole_end..]);

        // Groups that did not participate still occupy their position.
        captures.extend((2..groups - 1).map(|i| group(i).to_string()));

        self.consumed.push('/');
        self.consumed.push_str(&segment);
        self.remaining = remaining;
        true
    }
}
