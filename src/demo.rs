//! Demo route tree served by the `switchyard` binary.
//!
//! ```text
//! /                        → welcome page
//! /hello/:name             → greeting (GET only)
//! /style/:file.css         → stylesheet stub
//! /search?q=               → echoes the query, 400 without one
//! /old-login               → 302 to /login
//! /login                   → login page
//! /api/...                 → mounted JSON tree
//! ```

use axum::http::{header, StatusCode};

use crate::config::RouterConfig;
use crate::routing::{App, DefinitionError, Guard};

/// JSON tree mounted under `/api`.
pub fn api(settings: RouterConfig) -> Result<App, DefinitionError> {
    let json = Guard::accept("application/json")?;
    let status = Guard::literal("status")?;
    let user = Guard::literal("users/:id")?;

    App::builder()
        .settings(settings)
        .root(move |ctx| {
            ctx.on([&json, &status], |ctx, _| {
                ctx.response_mut().write(r#"{"status":"ok"}"#);
                Ok(())
            })?;

            ctx.on([&json, &user], |ctx, captures| {
                let id: u64 = captures.parse(0)?;
                ctx.response_mut().write(format!(r#"{{"id":{}}}"#, id));
                Ok(())
            })?;

            Ok(())
        })
        .build()
}

/// The full demo tree.
pub fn app(settings: RouterConfig) -> Result<App, DefinitionError> {
    let api = api(settings.clone())?;

    let hello = Guard::literal("hello/:name")?;
    let style = Guard::literal("style")?;
    let css = Guard::extension("css")?;
    let search = Guard::literal("search")?;
    let query = Guard::param("q");
    let old_login = Guard::literal("old-login")?;
    let login = Guard::literal("login")?;
    let mount = Guard::literal("api")?;

    App::builder()
        .settings(settings)
        .guard("home", Guard::root())
        .guard("reading", Guard::get())
        .root(move |ctx| {
            let home = ctx.named("home");
            let reading = ctx.named("reading");

            ctx.on(home, |ctx, _| {
                ctx.response_mut().write("<h1>switchyard</h1>");
                Ok(())
            })?;

            ctx.on(reading.into_iter().chain([&hello]), |ctx, captures| {
                let name = captures.get(0).unwrap_or_default();
                ctx.response_mut().write(format!("Hello, {}!", name));
                Ok(())
            })?;

            ctx.on([&style, &css], |ctx, captures| {
                let res = ctx.response_mut();
                res.set_header(header::CONTENT_TYPE.as_str(), "text/css")?;
                res.write(format!("/* {}.css */", &captures[0]));
                Ok(())
            })?;

            ctx.on([&search], |ctx, _| {
                ctx.on([&query], |ctx, captures| {
                    ctx.response_mut().write(format!("Results for {}", &captures[0]));
                    Ok(())
                })?;

                ctx.response_mut().set_status(StatusCode::BAD_REQUEST);
                ctx.response_mut().write("Missing q");
                Ok(())
            })?;

            ctx.on([&old_login], |ctx, _| {
                ctx.response_mut().redirect("/login")?;
                Ok(())
            })?;

            ctx.on([&login], |ctx, _| {
                ctx.response_mut().write("<form method=\"post\"></form>");
                Ok(())
            })?;

            ctx.on([&mount], |ctx, _| ctx.run(&api))?;

            Ok(())
        })
        .build()
}
