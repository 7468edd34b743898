//! Outbound response built by route bodies.
//!
//! # Responsibilities
//! - Collect status, headers and body written while routing
//! - Provide the redirect helper
//! - Resolve an unset status when the response is finished
//! - Convert into an axum response for the wire
//!
//! # Design Decisions
//! - Status stays unset until written so `finish` can tell "nothing happened"
//!   (404) from "wrote a body" (200)
//! - Content-Length tracks the body on every write
//! - Only 301, 302, 303 and 307 are accepted for redirects

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

/// Content type applied to a non-empty body that has none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

const REDIRECT_STATUSES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
];

/// Errors raised while building a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("{0} is not a redirect status (expected 301, 302, 303 or 307)")]
    InvalidRedirectStatus(StatusCode),

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),

    #[error("invalid value for header `{0}`")]
    InvalidHeaderValue(String),
}

/// Response under construction, or finished once routing stops.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response with an explicit status and no body.
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Status as it would go on the wire right now.
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Set a header from string parts.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ResponseError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ResponseError::InvalidHeaderName(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ResponseError::InvalidHeaderValue(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Append to the body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
        self.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(self.body.len()));
    }

    /// Redirect with 302 Found.
    pub fn redirect(&mut self, location: &str) -> Result<(), ResponseError> {
        self.redirect_with(location, StatusCode::FOUND)
    }

    /// Redirect with one of 301, 302, 303 or 307.
    pub fn redirect_with(&mut self, location: &str, status: StatusCode) -> Result<(), ResponseError> {
        if !REDIRECT_STATUSES.contains(&status) {
            return Err(ResponseError::InvalidRedirectStatus(status));
        }
        let location = HeaderValue::from_str(location)
            .map_err(|_| ResponseError::InvalidHeaderValue(header::LOCATION.to_string()))?;
        self.headers.insert(header::LOCATION, location);
        self.status = Some(status);
        Ok(())
    }

    /// Mark finished using [`DEFAULT_CONTENT_TYPE`].
    pub fn finish(&mut self) {
        self.finish_with(DEFAULT_CONTENT_TYPE);
    }

    /// Mark finished, resolving an unset status and a missing content type.
    ///
    /// Unset status: 404 with an empty body, 200 otherwise. Finishing twice
    /// is a no-op.
    pub fn finish_with(&mut self, default_content_type: &str) {
        if self.finished {
            return;
        }
        if self.status.is_none() {
            self.status = Some(if self.body.is_empty() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            });
        }
        if !self.body.is_empty() && !self.headers.contains_key(header::CONTENT_TYPE) {
            if let Ok(value) = HeaderValue::from_str(default_content_type) {
                self.headers.insert(header::CONTENT_TYPE, value);
            }
        }
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
