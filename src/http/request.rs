//! Inbound request seen by the router.
//!
//! # Responsibilities
//! - Expose method, path, host and headers of the incoming request
//! - Parse query and form parameters once, up front
//! - Provide the `x-request-id` generator used by the server
//!
//! # Design Decisions
//! - The path is taken raw from the URI; no percent-decoding
//! - Header lookup accepts environment-style names (`CONTENT_TYPE`)
//! - Form body parameters override query parameters with the same key

use std::collections::HashMap;

use axum::http::{
    header, request::Parts, uri::InvalidUri, HeaderMap, HeaderName, HeaderValue, Method, Uri,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request object handed to route trees.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
}

impl Request {
    /// Build a request without a body.
    pub fn new(method: Method, uri: &str) -> Result<Self, InvalidUri> {
        let uri: Uri = uri.parse()?;
        Ok(Self::from_components(method, uri, HeaderMap::new(), &[]))
    }

    pub fn get(uri: &str) -> Result<Self, InvalidUri> {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Result<Self, InvalidUri> {
        Self::new(Method::POST, uri)
    }

    /// Build a request from decoded HTTP parts and a buffered body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        Self::from_components(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            body,
        )
    }

    fn from_components(method: Method, uri: Uri, headers: HeaderMap, body: &[u8]) -> Self {
        let mut params: HashMap<String, String> = uri
            .query()
            .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        if is_form(&headers) {
            params.extend(form_urlencoded::parse(body).into_owned());
        }

        Self {
            method,
            uri,
            headers,
            params,
        }
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add or replace a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Raw request path, `/` when the URI has none.
    pub fn path(&self) -> &str {
        match self.uri.path() {
            "" => "/",
            path => path,
        }
    }

    /// Host without port, lower-cased.
    ///
    /// Taken from the `Host` header, falling back to the URI authority.
    pub fn host(&self) -> Option<String> {
        let raw = self
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| self.uri.host())?;
        Some(strip_port(raw).to_ascii_lowercase())
    }

    /// Case-insensitive header lookup. Accepts environment-style keys:
    /// `HTTP_X_API_KEY` and `x_api_key` both find `X-Api-Key`.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix("HTTP_").unwrap_or(name);
        let normalized = name.replace('_', "-").to_ascii_lowercase();
        let name = HeaderName::from_bytes(normalized.as_bytes()).ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query or form parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop anything after them.
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}

/// Generates UUID v4 request IDs for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}
