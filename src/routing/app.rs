//! Route tree definition and request dispatch.
//!
//! # Responsibilities
//! - Hold the immutable route tree (root block, named guards, settings)
//! - Validate definitions once, at build time
//! - Dispatch each request on fresh per-request state
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exactly one finished response per request: a halt, or the 404 fallback
//! - Handler failures are returned to the caller, never turned into responses here

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use axum::http::StatusCode;

use crate::config::RouterConfig;
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::context::Context;
use crate::routing::cursor::PathCursor;
use crate::routing::error::{DefinitionError, DispatchError, Flow, Interrupt};
use crate::routing::guard::Guard;

/// Identifiers taken by the routing vocabulary itself.
pub const RESERVED_NAMES: &[&str] = &[
    "on", "halt", "consume", "match", "run", "req", "res", "captures", "default", "extension",
    "param", "header", "host", "accept", "root", "get", "post", "put", "delete", "settings",
    "handle",
];

type RouteBlock = dyn Fn(&mut Context<'_>) -> Flow + Send + Sync;

/// An immutable route tree, shareable across concurrent requests.
pub struct App {
    root: Box<RouteBlock>,
    guards: HashMap<String, Guard>,
    settings: RouterConfig,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("guards", &self.guards.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Route tree with default settings and no named guards.
    pub fn define<F>(root: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Flow + Send + Sync + 'static,
    {
        Self {
            root: Box::new(root),
            guards: HashMap::new(),
            settings: RouterConfig::default(),
        }
    }

    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    pub fn settings(&self) -> &RouterConfig {
        &self.settings
    }

    /// Look up a guard registered with [`AppBuilder::guard`].
    pub fn named(&self, name: &str) -> Option<&Guard> {
        self.guards.get(name)
    }

    /// Route `request` through the tree and produce its finished response.
    pub fn handle(&self, request: &Request) -> Result<Response, DispatchError> {
        let start_time = Instant::now();
        let result = self.dispatch(request, PathCursor::new(request.path()));

        let outcome = match &result {
            Ok((_, Outcome::Matched)) => "matched",
            Ok((_, Outcome::NotFound)) => "not_found",
            Err(_) => "error",
        };
        metrics::record_dispatch(outcome, start_time);

        result.map(|(response, _)| response)
    }

    /// Evaluate the tree from `cursor`. Mounted trees enter here, so nothing
    /// per-request is recorded.
    pub(crate) fn dispatch(
        &self,
        request: &Request,
        cursor: PathCursor,
    ) -> Result<(Response, Outcome), DispatchError> {
        let mut ctx = Context::new(self, request, cursor);

        match (self.root)(&mut ctx) {
            Err(Interrupt::Halt(response)) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.path(),
                    status = %response.status_or_default(),
                    "Request halted"
                );
                Ok((response, Outcome::Matched))
            }
            Ok(()) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.path(),
                    "No route matched"
                );
                let mut response = ctx.into_response();
                response.set_status(StatusCode::NOT_FOUND);
                response.finish_with(&self.settings.default_content_type);
                Ok((response, Outcome::NotFound))
            }
            Err(Interrupt::Error(err)) => {
                tracing::warn!(
                    method = %request.method(),
                    path = %request.path(),
                    error = %err,
                    "Route handler failed"
                );
                Err(DispatchError::Handler(err))
            }
        }
    }
}

/// How a dispatch that produced a response ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Matched,
    NotFound,
}

/// Builder validating named guards before the tree goes live.
#[derive(Default)]
pub struct AppBuilder {
    root: Option<Box<RouteBlock>>,
    guards: Vec<(String, Guard)>,
    settings: RouterConfig,
}

impl AppBuilder {
    pub fn root<F>(mut self, root: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Flow + Send + Sync + 'static,
    {
        self.root = Some(Box::new(root));
        self
    }

    /// Register a reusable guard under `name`.
    pub fn guard(mut self, name: impl Into<String>, guard: Guard) -> Self {
        self.guards.push((name.into(), guard));
        self
    }

    pub fn settings(mut self, settings: RouterConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<App, DefinitionError> {
        let root = self.root.ok_or(DefinitionError::MissingRoot)?;

        let mut guards = HashMap::with_capacity(self.guards.len());
        for (name, guard) in self.guards {
            if RESERVED_NAMES.contains(&name.as_str()) {
                return Err(DefinitionError::ReservedName(name));
            }
            if guards.contains_key(&name) {
                return Err(DefinitionError::DuplicateName(name));
            }
            guards.insert(name, guard);
        }

        tracing::debug!(named_guards = guards.len(), "Route tree built");
        Ok(App {
            root,
            guards,
            settings: self.settings,
        })
    }
}
