//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → request.rs (buffer body, parse params)
//!     → routing::App::handle (route tree)
//!     → response.rs (finished response → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Request, UuidRequestId, X_REQUEST_ID};
pub use response::{Response, ResponseError, DEFAULT_CONTENT_TYPE};
pub use server::HttpServer;
