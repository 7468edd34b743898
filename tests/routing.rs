//! Route tree behaviour seen through `App::handle`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderValue, Method, StatusCode};
use regex::Regex;
use switchyard::routing::{DispatchError, Interrupt};
use switchyard::config::RouterConfig;
use switchyard::{App, Captures, Guard, Request, Response};

mod common;
use common::{body_text, get};

/// Records every capture list handed to a body.
fn recorder() -> (Arc<Mutex<Vec<Vec<String>>>>, Arc<Mutex<Vec<Vec<String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    (seen.clone(), seen)
}

fn record(seen: &Mutex<Vec<Vec<String>>>, captures: Captures) {
    seen.lock().unwrap().push(captures.into_vec());
}

#[test]
fn test_capture_ordering_for_placeholder() {
    let user = Guard::literal("user/:id").unwrap();
    let (seen, sink) = recorder();

    let app = App::define(move |ctx| {
        ctx.on([&user], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/user/42")).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![vec!["42".to_string()]]);
}

#[test]
fn test_wildcard_and_extension_suffix() {
    let style = Guard::literal("style").unwrap();
    let css = Guard::extension("css").unwrap();
    let (seen, sink) = recorder();

    let app = App::define(move |ctx| {
        ctx.on([&style, &css], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/style/app.css")).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![vec!["app".to_string()]]);

    let miss = app.handle(&get("/style/app.js")).unwrap();
    assert_eq!(miss.status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_multiple_guards_capture_left_to_right() {
    let posts = Guard::literal("posts/:year").unwrap();
    let slug = Guard::wildcard();
    let format = Guard::param("format");
    let (seen, sink) = recorder();

    let app = App::define(move |ctx| {
        ctx.on([&posts, &slug, &format], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/posts/2024/hello-world?format=json")).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec!["2024".to_string(), "hello-world".to_string(), "json".to_string()]]
    );
}

#[test]
fn test_empty_tree_yields_404_with_empty_body() {
    let app = App::define(|_| Ok(()));

    for path in ["/", "/missing", "/a/b/c"] {
        let response = app.handle(&get(path)).unwrap();
        assert!(response.is_finished());
        assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
        assert!(response.body().is_empty());
    }
}

#[test]
fn test_backtracking_restores_path_and_drops_captures() {
    let users = Guard::literal("users/:id").unwrap();
    let edit = Guard::literal("edit").unwrap();
    let any = Guard::wildcard();
    let remaining_seen = Arc::new(Mutex::new(Vec::new()));
    let (seen, sink) = recorder();

    let remaining = remaining_seen.clone();
    let app = App::define(move |ctx| {
        remaining.lock().unwrap().push(ctx.remaining().to_string());
        ctx.on([&users, &edit], |ctx, _| {
            ctx.response_mut().write("edit");
            Ok(())
        })?;

        remaining.lock().unwrap().push(ctx.remaining().to_string());

        ctx.on([&any], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/users/7/show")).unwrap();

    let remaining_seen = remaining_seen.lock().unwrap();
    assert_eq!(*remaining_seen, vec!["/users/7/show", "/users/7/show"]);
    // The sibling sees only its own capture, not the failed attempt's "7".
    assert_eq!(*seen.lock().unwrap(), vec![vec!["users".to_string()]]);
}

#[test]
fn test_cursor_spans_path_around_every_guard() {
    let observed: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let probe = {
        let observed = observed.clone();
        Guard::predicate(move |ctx| {
            observed
                .lock()
                .unwrap()
                .push((ctx.consumed().to_string(), ctx.remaining().to_string()));
            true
        })
    };
    let api = Guard::literal("api").unwrap();
    let version = Guard::pattern(r"v(\d+)").unwrap();
    let item = Guard::wildcard();

    let app = App::define(move |ctx| {
        ctx.on([&probe, &api, &probe, &version, &probe, &item, &probe], |_, _| Ok(()))
    });

    app.handle(&get("/api/v2/widgets")).unwrap();

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 4);
    for (consumed, remaining) in observed.iter() {
        assert_eq!(format!("{}{}", consumed, remaining), "/api/v2/widgets");
    }
    assert_eq!(observed[3], ("/api/v2/widgets".to_string(), String::new()));
}

#[test]
fn test_matched_attempt_never_falls_through() {
    let first = Guard::literal("page").unwrap();
    let second = Guard::literal("page").unwrap();
    let later = Arc::new(AtomicUsize::new(0));

    let counter = later.clone();
    let app = App::define(move |ctx| {
        ctx.on([&first], |_, _| Ok(()))?;
        ctx.on([&second], |ctx, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.response_mut().write("second");
            Ok(())
        })
    });

    let response = app.handle(&get("/page")).unwrap();

    // The first match wrote nothing, so it finishes as an empty 404.
    assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
    assert!(response.body().is_empty());
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn test_nested_halt_skips_remaining_code() {
    let admin = Guard::literal("admin").unwrap();
    let users = Guard::literal("users").unwrap();
    let after = Arc::new(AtomicUsize::new(0));

    let counter = after.clone();
    let app = App::define(move |ctx| {
        ctx.on([&admin], |ctx, _| {
            ctx.on([&users], |ctx, _| {
                ctx.response_mut().write("all users");
                ctx.halt()
            })?;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let response = app.handle(&get("/admin/users")).unwrap();
    assert_eq!(response.status(), Some(StatusCode::OK));
    assert_eq!(body_text(&response), "all users");
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[test]
fn test_nested_miss_halts_with_parent_response() {
    let admin = Guard::literal("admin").unwrap();
    let users = Guard::literal("users").unwrap();

    let app = App::define(move |ctx| {
        ctx.on([&admin], |ctx, _| {
            ctx.on([&users], |ctx, _| {
                ctx.response_mut().write("users");
                Ok(())
            })?;
            ctx.response_mut().write("dashboard");
            Ok(())
        })
    });

    let response = app.handle(&get("/admin/settings")).unwrap();
    assert_eq!(response.status(), Some(StatusCode::OK));
    assert_eq!(body_text(&response), "dashboard");
}

#[test]
fn test_redirect_helper() {
    let old = Guard::literal("old").unwrap();
    let app = App::define(move |ctx| {
        ctx.on([&old], |ctx, _| {
            ctx.response_mut().redirect("/login")?;
            Ok(())
        })
    });

    let response = app.handle(&get("/old")).unwrap();
    assert_eq!(response.status(), Some(StatusCode::FOUND));
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[test]
fn test_handle_is_idempotent() {
    let user = Guard::literal("user/:id").unwrap();
    let app = App::define(move |ctx| {
        ctx.on([&user], |ctx, captures| {
            ctx.response_mut().write(format!("user {}", &captures[0]));
            Ok(())
        })
    });

    let request = get("/user/42");
    let first = app.handle(&request).unwrap();
    let second = app.handle(&request).unwrap();

    assert_eq!(first.status(), second.status());
    assert_eq!(first.headers(), second.headers());
    assert_eq!(first.body(), second.body());
}

#[test]
fn test_concurrent_requests_are_isolated() {
    let user = Guard::literal("user/:id").unwrap();
    let app = Arc::new(App::define(move |ctx| {
        ctx.on([&user], |ctx, captures| {
            ctx.response_mut().write(captures[0].as_str());
            Ok(())
        })
    }));

    std::thread::scope(|scope| {
        for n in 0..8 {
            let app = app.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    let response = app.handle(&get(&format!("/user/{}", n))).unwrap();
                    assert_eq!(body_text(&response), n.to_string());
                }
            });
        }
    });
}

#[test]
fn test_response_mutations_survive_backtracking() {
    let json = Guard::accept("application/json").unwrap();
    let nope = Guard::never();
    let fallback = Guard::always();

    let app = App::define(move |ctx| {
        ctx.on([&json, &nope], |_, _| Ok(()))?;
        ctx.on([&fallback], |ctx, _| {
            ctx.response_mut().write("{}");
            Ok(())
        })
    });

    let request = get("/").with_header(
        header::ACCEPT,
        HeaderValue::from_static("text/html, application/json;q=0.9"),
    );
    let response = app.handle(&request).unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
}

#[test]
fn test_host_and_header_guards() {
    let host = Guard::host("api.example.com");
    let token = Guard::header("X-Api-Key", "secret");

    let app = App::define(move |ctx| {
        ctx.on([&host, &token], |ctx, _| {
            ctx.response_mut().write("authorized");
            Ok(())
        })
    });

    let ok = get("/")
        .with_header(header::HOST, HeaderValue::from_static("API.example.com:443"))
        .with_header(
            header::HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("secret"),
        );
    assert_eq!(body_text(&app.handle(&ok).unwrap()), "authorized");

    let wrong_key = get("/")
        .with_header(header::HOST, HeaderValue::from_static("api.example.com"))
        .with_header(
            header::HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("guess"),
        );
    assert_eq!(
        app.handle(&wrong_key).unwrap().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[test]
fn test_param_guard_rejects_empty_values() {
    let search = Guard::param("q");
    let paged = Guard::param_or("page", "1");

    let app = App::define(move |ctx| {
        ctx.on([&search, &paged], |ctx, captures| {
            ctx.response_mut()
                .write(format!("{} p{}", &captures[0], &captures[1]));
            Ok(())
        })
    });

    assert_eq!(body_text(&app.handle(&get("/?q=rust")).unwrap()), "rust p1");
    assert_eq!(
        body_text(&app.handle(&get("/?q=rust&page=3")).unwrap()),
        "rust p3"
    );
    assert_eq!(
        app.handle(&get("/?q=")).unwrap().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[test]
fn test_root_guard() {
    let root = Guard::root();
    let app = App::define(move |ctx| {
        ctx.on([&root], |ctx, _| {
            ctx.response_mut().write("home");
            Ok(())
        })
    });

    assert_eq!(body_text(&app.handle(&get("/")).unwrap()), "home");
    assert_eq!(
        app.handle(&get("/other")).unwrap().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[test]
fn test_extension_any_captures_stem() {
    let assets = Guard::literal("assets").unwrap();
    let file = Guard::extension_any().unwrap();
    let (seen, sink) = recorder();

    let app = App::define(move |ctx| {
        ctx.on([&assets, &file], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/assets/app.min.js")).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![vec!["app.min".to_string()]]);

    let bare = app.handle(&get("/assets/README")).unwrap();
    assert_eq!(bare.status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_method_guards() {
    let put = Guard::put();
    let delete = Guard::delete();
    let patch = Guard::method(Method::PATCH);

    let app = App::define(move |ctx| {
        ctx.on([&put], |ctx, _| {
            ctx.response_mut().write("put");
            Ok(())
        })?;
        ctx.on([&delete], |ctx, _| {
            ctx.response_mut().write("delete");
            Ok(())
        })?;
        ctx.on([&patch], |ctx, _| {
            ctx.response_mut().write("patch");
            Ok(())
        })
    });

    let handle = |method: Method| app.handle(&Request::new(method, "/items/1").unwrap()).unwrap();
    assert_eq!(body_text(&handle(Method::PUT)), "put");
    assert_eq!(body_text(&handle(Method::DELETE)), "delete");
    assert_eq!(body_text(&handle(Method::PATCH)), "patch");
    assert_eq!(handle(Method::GET).status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_has_header_guard() {
    let traced = Guard::has_header("x_trace_id");

    let app = App::define(move |ctx| {
        ctx.on([&traced], |ctx, _| {
            ctx.response_mut().write("traced");
            Ok(())
        })
    });

    let request = get("/").with_header(
        header::HeaderName::from_static("x-trace-id"),
        HeaderValue::from_static("abc"),
    );
    assert_eq!(body_text(&app.handle(&request).unwrap()), "traced");
    assert_eq!(
        app.handle(&get("/")).unwrap().status(),
        Some(StatusCode::NOT_FOUND)
    );
}

#[test]
fn test_compiled_regex_guard() {
    let archive = Guard::literal("archive").unwrap();
    let date = Guard::regex(&Regex::new(r"(\d{4})-(\d{2})").unwrap()).unwrap();
    let (seen, sink) = recorder();

    let app = App::define(move |ctx| {
        ctx.on([&archive, &date], |_, captures| {
            record(&sink, captures);
            Ok(())
        })
    });

    app.handle(&get("/archive/2024-05")).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec!["2024".to_string(), "05".to_string()]]
    );

    let miss = app.handle(&get("/archive/may")).unwrap();
    assert_eq!(miss.status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_body_error_propagates_to_caller() {
    let item = Guard::literal("items/:id").unwrap();
    let app = App::define(move |ctx| {
        ctx.on([&item], |_, captures| {
            let _id: u32 = captures.parse(0)?;
            Ok(())
        })
    });

    let err = app.handle(&get("/items/abc")).unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
    assert!(app.handle(&get("/items/12")).is_ok());
}

#[test]
fn test_cursor_restored_when_attempt_fails_with_error() {
    let a = Guard::literal("a").unwrap();
    let failing = Guard::try_predicate(|_| Err::<bool, _>("lookup failed"));
    let remaining_after = Arc::new(Mutex::new(String::new()));

    let seen = remaining_after.clone();
    let app = App::define(move |ctx| {
        match ctx.on([&a, &failing], |_, _| Ok(())) {
            Err(Interrupt::Error(_)) => {}
            other => panic!("expected error, got {:?}", other),
        }
        *seen.lock().unwrap() = ctx.remaining().to_string();
        Ok(())
    });

    app.handle(&get("/a/b")).unwrap();
    assert_eq!(*remaining_after.lock().unwrap(), "/a/b");
}

#[test]
fn test_cursor_restored_when_body_panics() {
    let a = Guard::literal("a").unwrap();
    let remaining_after = Arc::new(Mutex::new(String::new()));

    let seen = remaining_after.clone();
    let app = App::define(move |ctx| {
        let unwound = catch_unwind(AssertUnwindSafe(|| {
            ctx.on([&a], |_, _| panic!("body exploded"))
        }));
        assert!(unwound.is_err());
        *seen.lock().unwrap() = ctx.remaining().to_string();
        Ok(())
    });

    app.handle(&get("/a/b")).unwrap();
    assert_eq!(*remaining_after.lock().unwrap(), "/a/b");
}

#[test]
fn test_mounted_app_sees_remaining_path() {
    let show = Guard::literal("show/:id").unwrap();
    let inner = App::define(move |ctx| {
        ctx.on([&show], |ctx, captures| {
            let body = format!("{}|{}", ctx.consumed(), &captures[0]);
            ctx.response_mut().write(body);
            Ok(())
        })
    });

    let blog = Guard::literal("blog").unwrap();
    let outer = App::define(move |ctx| ctx.on([&blog], |ctx, _| ctx.run(&inner)));

    let response = outer.handle(&get("/blog/show/5")).unwrap();
    assert_eq!(body_text(&response), "/blog/show/5|5");

    let missing = outer.handle(&get("/blog/nothing")).unwrap();
    assert_eq!(missing.status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_named_guards_from_builder() {
    let app = App::builder()
        .guard("admin_host", Guard::host("admin.local"))
        .root(|ctx| {
            let admin = ctx.named("admin_host");
            ctx.on(admin, |ctx, _| {
                ctx.response_mut().write("admin");
                Ok(())
            })
        })
        .build()
        .unwrap();

    let request = get("/").with_header(header::HOST, HeaderValue::from_static("admin.local"));
    assert_eq!(body_text(&app.handle(&request).unwrap()), "admin");
}

#[test]
fn test_default_content_type_from_settings() {
    let app = App::builder()
        .settings(RouterConfig {
            default_content_type: "text/plain; charset=utf-8".into(),
        })
        .root(|ctx| {
            ctx.on([&Guard::default()], |ctx, _| {
                ctx.response_mut().write("plain");
                Ok(())
            })
        })
        .build()
        .unwrap();

    let response = app.handle(&get("/")).unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
}

#[test]
fn test_halt_with_uses_configured_content_type() {
    let app = App::builder()
        .settings(RouterConfig {
            default_content_type: "text/plain".into(),
        })
        .root(|ctx| {
            ctx.on([&Guard::always()], |ctx, _| {
                let mut response = Response::new();
                response.write("x");
                ctx.halt_with(response)
            })
        })
        .build()
        .unwrap();

    let response = app.handle(&get("/")).unwrap();
    assert_eq!(response.status(), Some(StatusCode::OK));
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
}
