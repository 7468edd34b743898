//! Guard values and their construction helpers.
//!
//! A guard is a stateless condition evaluated against a [`Context`]. Guards
//! are built once, usually outside the route block, and shared read-only by
//! every request.

use std::fmt;
use std::sync::{Arc, LazyLock};

use axum::http::{header, HeaderValue, Method};
use regex::Regex;

use crate::routing::context::Context;
use crate::routing::cursor::{SegmentPattern, SEGMENT};
use crate::routing::error::{BoxError, DefinitionError};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\w+").expect("placeholder regex compiles"));

type PredicateFn = dyn Fn(&mut Context<'_>) -> Result<bool, BoxError> + Send + Sync;

/// Callable guard. May push captures or touch the response as a side effect.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub(crate) fn call(&self, ctx: &mut Context<'_>) -> Result<bool, BoxError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A routing condition.
#[derive(Debug, Clone)]
pub enum Guard {
    /// Path segment text with optional `:name` placeholders.
    Literal {
        source: String,
        pattern: SegmentPattern,
    },
    /// Raw regular expression used as the segment group body.
    Pattern(SegmentPattern),
    /// Exactly one path segment, captured.
    Wildcard,
    /// Arbitrary check run against the request context.
    Predicate(Predicate),
    /// Unconditional pass or fail.
    Boolean(bool),
}

impl Default for Guard {
    /// The always-true guard.
    fn default() -> Self {
        Guard::Boolean(true)
    }
}

impl From<bool> for Guard {
    fn from(value: bool) -> Self {
        Guard::Boolean(value)
    }
}

impl TryFrom<&str> for Guard {
    type Error = DefinitionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Guard::literal(value)
    }
}

impl Guard {
    /// Segment text such as `"user/:id"`. Each placeholder becomes a
    /// single-segment capture; other characters are used as regex source.
    pub fn literal(text: &str) -> Result<Self, DefinitionError> {
        let body = PLACEHOLDER.replace_all(text, SEGMENT);
        Ok(Guard::Literal {
            source: text.to_string(),
            pattern: SegmentPattern::new(body.into_owned())?,
        })
    }

    /// Raw pattern, inserted verbatim as the segment group body.
    pub fn pattern(body: &str) -> Result<Self, DefinitionError> {
        Ok(Guard::Pattern(SegmentPattern::new(body)?))
    }

    /// Same as [`Guard::pattern`] for an already compiled regex.
    pub fn regex(regex: &Regex) -> Result<Self, DefinitionError> {
        Self::pattern(regex.as_str())
    }

    /// Exactly one path segment.
    pub fn wildcard() -> Self {
        Guard::Wildcard
    }

    /// Infallible predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> bool + Send + Sync + 'static,
    {
        Self::from_fn(move |ctx| Ok(f(ctx)))
    }

    /// Predicate whose failure propagates out of the dispatcher.
    pub fn try_predicate<F, E>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::from_fn(move |ctx| f(ctx).map_err(Into::into))
    }

    fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Guard::Predicate(Predicate(Arc::new(f)))
    }

    /// Always passes.
    pub fn always() -> Self {
        Guard::Boolean(true)
    }

    /// Never passes.
    pub fn never() -> Self {
        Guard::Boolean(false)
    }

    /// Segment ending in `.ext`; captures the stem.
    pub fn extension(ext: &str) -> Result<Self, DefinitionError> {
        Self::pattern(&format!(r"([^/]+?)\.{}$", ext))
    }

    /// Segment with any word-character extension; captures the stem.
    pub fn extension_any() -> Result<Self, DefinitionError> {
        Self::extension(r"\w+")
    }

    /// Passes when the request path is fully consumed (`""` or `"/"`).
    pub fn root() -> Self {
        Self::predicate(|ctx| matches!(ctx.remaining(), "" | "/"))
    }

    /// Captures a non-empty request parameter.
    pub fn param(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::predicate(move |ctx| match ctx.request().param(&key) {
            Some(value) if !value.is_empty() => {
                ctx.capture(value);
                true
            }
            _ => false,
        })
    }

    /// Captures a request parameter, falling back to `default` when empty.
    pub fn param_or(key: impl Into<String>, default: impl Into<String>) -> Self {
        let key = key.into();
        let default = default.into();
        Self::predicate(move |ctx| {
            let value = match ctx.request().param(&key) {
                Some(value) if !value.is_empty() => value,
                _ => default.as_str(),
            };
            if value.is_empty() {
                return false;
            }
            ctx.capture(value);
            true
        })
    }

    /// Header `name` is present.
    pub fn has_header(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::predicate(move |ctx| ctx.request().header(&name).is_some())
    }

    /// Header `name` equals `value` exactly.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        Self::predicate(move |ctx| ctx.request().header(&name) == Some(value.as_str()))
    }

    /// Request host equals `hostname`, ignoring case.
    pub fn host(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into().to_ascii_lowercase();
        Self::predicate(move |ctx| ctx.request().host().as_deref() == Some(hostname.as_str()))
    }

    /// The `Accept` header lists `mimetype`. On success the response
    /// `Content-Type` is set to it.
    pub fn accept(mimetype: &str) -> Result<Self, DefinitionError> {
        let content_type = HeaderValue::from_str(mimetype)
            .map_err(|_| DefinitionError::InvalidMimeType(mimetype.to_string()))?;
        let mimetype = mimetype.to_string();
        Ok(Self::predicate(move |ctx| {
            let accepted = ctx.request().header("accept").is_some_and(|accept| {
                accept
                    .split(',')
                    .filter_map(|range| range.split(';').next())
                    .any(|range| range.trim() == mimetype)
            });
            if accepted {
                ctx.response_mut()
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type.clone());
            }
            accepted
        }))
    }

    /// Request method equals `method`.
    pub fn method(method: Method) -> Self {
        Self::predicate(move |ctx| ctx.request().method() == method)
    }

    pub fn get() -> Self {
        Self::method(Method::GET)
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }
}
