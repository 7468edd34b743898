//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, host, headers, path)
//!     → app.rs (fresh Context per request, root block)
//!     → context.rs (on: snapshot cursor, reset captures)
//!     → matcher.rs (evaluate each guard)
//!     → cursor.rs (consume path segments, collect captures)
//!     → body(ctx, captures)
//!     → halt: finished Response straight back to app.rs
//!
//! No halt at all:
//!     → app.rs answers 404
//! ```
//!
//! # Design Decisions
//! - Route trees are immutable and shared; all mutable state is per request
//! - A matched route is final: no fall-through to sibling routes
//! - Halting is a returned value (`Interrupt`), not a panic or global
//! - Patterns compile when guards are built; bad patterns fail at definition time
//! - No route precompilation into tables: routes are tried in the order written

pub mod app;
pub mod captures;
pub mod context;
pub mod cursor;
pub mod error;
pub mod guard;
pub mod matcher;

pub use app::{App, AppBuilder, RESERVED_NAMES};
pub use captures::Captures;
pub use context::Context;
pub use cursor::{PathCursor, SegmentPattern};
pub use error::{BoxError, CaptureError, DefinitionError, DispatchError, Flow, Interrupt};
pub use guard::Guard;
