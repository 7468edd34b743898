//! Per-request routing state and the attempt protocol.
//!
//! # Attempts
//! ```text
//! ctx.on(guards, body)
//!     → reset captures
//!     → snapshot cursor (AttemptScope)
//!     → evaluate guards in order, stop at the first miss
//!     → miss:    scope drops, cursor restored, Ok(())
//!     → all hit: body(ctx, captures)
//!                → body halted or failed: propagate
//!                → body returned:         halt with the current response
//! ```
//!
//! A matched attempt never falls through to its siblings.

use std::ops::{Deref, DerefMut};

use crate::http::{Request, Response};
use crate::routing::app::App;
use crate::routing::captures::Captures;
use crate::routing::cursor::PathCursor;
use crate::routing::error::{DispatchError, Flow, Interrupt};
use crate::routing::guard::Guard;

/// Mutable state for one request travelling through a route tree.
///
/// Created by the dispatcher, never shared between requests.
#[derive(Debug)]
pub struct Context<'r> {
    app: &'r App,
    request: &'r Request,
    cursor: PathCursor,
    captures: Vec<String>,
    response: Response,
}

impl<'r> Context<'r> {
    pub(crate) fn new(app: &'r App, request: &'r Request, cursor: PathCursor) -> Self {
        Self {
            app,
            request,
            cursor,
            captures: Vec::new(),
            response: Response::default(),
        }
    }

    /// The incoming request.
    pub fn request(&self) -> &'r Request {
        self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn cursor(&self) -> &PathCursor {
        &self.cursor
    }

    /// Path already matched by enclosing attempts.
    pub fn consumed(&self) -> &str {
        self.cursor.consumed()
    }

    /// Path still to be matched.
    pub fn remaining(&self) -> &str {
        self.cursor.remaining()
    }

    /// Captures collected so far by the current attempt.
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    /// Append a value to the current attempt's captures.
    pub fn capture(&mut self, value: impl Into<String>) {
        self.captures.push(value.into());
    }

    /// Named guard registered on the route tree.
    pub fn named(&self, name: &str) -> Option<&'r Guard> {
        self.app.named(name)
    }

    /// Route tree this context is dispatching.
    pub fn app(&self) -> &'r App {
        self.app
    }

    pub(crate) fn cursor_mut(&mut self) -> (&mut PathCursor, &mut Vec<String>) {
        (&mut self.cursor, &mut self.captures)
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    /// Attempt a route.
    ///
    /// Returns `Ok(())` when a guard misses, leaving the cursor where it was.
    /// When every guard passes, `body` runs with the collected captures and
    /// the request ends: either the body's own interrupt propagates or the
    /// current response is halted.
    pub fn on<'g, G, F>(&mut self, guards: G, body: F) -> Flow
    where
        G: IntoIterator<Item = &'g Guard>,
        F: FnOnce(&mut Context<'r>, Captures) -> Flow,
    {
        self.captures.clear();
        let mut scope = AttemptScope::enter(self);

        for guard in guards {
            match scope.matches(guard) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::trace!(
                        remaining = %scope.remaining(),
                        guard = ?guard,
                        "Guard missed"
                    );
                    return Ok(());
                }
                Err(err) => return Err(Interrupt::Error(err)),
            }
        }

        let captures = Captures::from(std::mem::take(&mut scope.captures));
        tracing::debug!(
            consumed = %scope.consumed(),
            captures = ?&captures[..],
            "Route matched"
        );

        body(&mut *scope, captures)?;
        scope.halt()
    }

    /// Finish the current response and stop matching.
    pub fn halt(&mut self) -> Flow {
        let response = std::mem::take(&mut self.response);
        self.halt_with(response)
    }

    /// Stop matching with a response built elsewhere.
    pub fn halt_with(&mut self, mut response: Response) -> Flow {
        response.finish_with(&self.app.settings().default_content_type);
        Err(Interrupt::Halt(response))
    }

    /// Hand the rest of the path to another route tree and halt with its
    /// response, including its 404 fallback.
    pub fn run(&mut self, app: &App) -> Flow {
        let cursor = PathCursor::mounted(self.cursor.consumed(), self.cursor.remaining());
        tracing::debug!(mount = %self.cursor.consumed(), "Running mounted route tree");
        match app.dispatch(self.request, cursor) {
            Ok((response, _)) => Err(Interrupt::Halt(response)),
            Err(DispatchError::Handler(err)) => Err(Interrupt::Error(err)),
        }
    }
}

/// Cursor snapshot held for the duration of one attempt.
///
/// Restores the cursor on every exit: a guard miss, an error, a halt, or a
/// panic unwinding through the body.
struct AttemptScope<'s, 'r> {
    ctx: &'s mut Context<'r>,
    snapshot: PathCursor,
}

impl<'s, 'r> AttemptScope<'s, 'r> {
    fn enter(ctx: &'s mut Context<'r>) -> Self {
        let snapshot = ctx.cursor.clone();
        Self { ctx, snapshot }
    }
}

impl<'r> Deref for AttemptScope<'_, 'r> {
    type Target = Context<'r>;

    fn deref(&self) -> &Context<'r> {
        self.ctx
    }
}

impl<'r> DerefMut for AttemptScope<'_, 'r> {
    fn deref_mut(&mut self) -> &mut Context<'r> {
        self.ctx
    }
}

impl Drop for AttemptScope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.cursor = std::mem::take(&mut self.snapshot);
    }
}
