//! Routing error taxonomy.
//!
//! Only definition problems and user code failures are errors. A guard that
//! does not match, a request nobody answers, and a `halt` are all ordinary
//! control flow and never show up here.

use thiserror::Error;

use crate::http::Response;

/// Boxed error raised by a route body or predicate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Problems detected while building a route tree.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A pattern guard did not compile.
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A named guard collides with a reserved identifier.
    #[error("`{0}` is a reserved name and cannot be used for a named guard")]
    ReservedName(String),

    /// A media type that is not a valid header value.
    #[error("invalid media type `{0}`")]
    InvalidMimeType(String),

    /// The same name was registered twice.
    #[error("named guard `{0}` is defined more than once")]
    DuplicateName(String),

    /// The route tree has no root block.
    #[error("route tree has no root block")]
    MissingRoot,
}

/// Failure raised while dispatching a request.
///
/// The dispatcher never produces this for unmatched requests; those become a
/// 404 response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A route body or guard predicate returned an error.
    #[error("route handler failed: {0}")]
    Handler(#[source] BoxError),
}

/// A capture could not be converted to the requested type.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no capture at position {0}")]
    Missing(usize),

    #[error("capture {index} (`{value}`) is not a valid {expected}")]
    Parse {
        index: usize,
        value: String,
        expected: &'static str,
    },
}

/// Non-local exit out of a route tree.
///
/// Route bodies return [`Flow`]. `Ok(())` means "keep going", an `Err` unwinds
/// every enclosing attempt back to the dispatcher.
#[derive(Debug)]
pub enum Interrupt {
    /// A finished response is ready; stop all further matching.
    Halt(Response),
    /// User code failed.
    Error(BoxError),
}

/// Result of evaluating a route block.
pub type Flow = Result<(), Interrupt>;

impl<E> From<E> for Interrupt
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Interrupt::Error(Box::new(err))
    }
}
