//! Guard evaluation.
//!
//! # Responsibilities
//! - Evaluate a single guard against the cursor of a [`Context`]
//! - Route path guards through `consume`, predicates through user code
//!
//! # Design Decisions
//! - Exhaustive over [`Guard`]; there is no open-ended matcher trait
//! - A miss is `Ok(false)`, never an error
//! - Predicates own their atomicity: captures they push before returning
//!   `false` stay pushed until the next attempt resets the list

use std::sync::LazyLock;

use crate::routing::context::Context;
use crate::routing::cursor::SegmentPattern;
use crate::routing::error::BoxError;
use crate::routing::guard::Guard;

static WILDCARD: LazyLock<SegmentPattern> = LazyLock::new(SegmentPattern::segment);

impl Context<'_> {
    /// Evaluate `guard` against the current cursor.
    ///
    /// Only predicate guards can fail, and only by returning an error
    /// themselves.
    pub fn matches(&mut self, guard: &Guard) -> Result<bool, BoxError> {
        let matched = match guard {
            Guard::Literal { pattern, .. } | Guard::Pattern(pattern) => self.consume(pattern),
            Guard::Wildcard => self.consume(&WILDCARD),
            Guard::Predicate(predicate) => predicate.call(self)?,
            Guard::Boolean(value) => *value,
        };

        debug_assert_eq!(
            self.cursor().path(),
            self.request().path(),
            "cursor no longer spans the request path"
        );
        Ok(matched)
    }

    /// Consume one anchored match of `pattern` from the remaining path.
    pub fn consume(&mut self, pattern: &SegmentPattern) -> bool {
        let (cursor, captures) = self.cursor_mut();
        cursor.consume(pattern, captures)
    }
}
