//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use switchyard::config::ServerConfig;
use switchyard::http::HttpServer;
use switchyard::{App, Request, Response};

/// GET request for `path`.
#[allow(dead_code)]
pub fn get(path: &str) -> Request {
    Request::get(path).unwrap()
}

/// Response body as UTF-8.
#[allow(dead_code)]
pub fn body_text(response: &Response) -> String {
    String::from_utf8(response.body().to_vec()).unwrap()
}

/// Serve `app` on an ephemeral port.
///
/// Dropping or firing the returned sender shuts the server down.
#[allow(dead_code)]
pub async fn start_server(app: App, config: ServerConfig) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let server = HttpServer::new(config, Arc::new(app));
    tokio::spawn(async move {
        let _ = server
            .run(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    (addr, tx)
}
