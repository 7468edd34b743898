//! Minimal path-consuming HTTP router.
//!
//! Route trees are plain Rust closures. Each `on` attempt consumes path
//! segments, collects captures, and either backs out untouched or ends the
//! request with a finished response.

pub mod config;
pub mod demo;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{HttpServer, Request, Response};
pub use routing::{App, Captures, Context, Flow, Guard, Interrupt};
