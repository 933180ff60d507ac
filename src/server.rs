//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops calling `listener.accept()`; no new connections are made.
//! 2. Asks every open connection to finish its in-flight request and close,
//!    so idle keep-alive connections do not hold shutdown open.
//! 3. Returns from [`Server::serve`] once all connection tasks are done, and
//!    the caller releases the repository.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Json};
use crate::router::Router;
use crate::status::Status;

enum Listener {
    Addr(SocketAddr),
    Bound(TcpListener),
}

/// The HTTP server. Speaks HTTP/1.1 and HTTP/2.
pub struct Server {
    listener: Listener,
}

impl Server {
    /// Binds to `addr` when [`serve`](Server::serve) is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { listener: Listener::Addr(addr) }
    }

    /// Serves on an already bound listener (e.g. port `0` in tests).
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listener: Listener::Bound(listener) }
    }

    /// Serves until SIGTERM or Ctrl-C, then drains and returns.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains and returns.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()> + Send,
    ) -> Result<(), Error> {
        let listener = match self.listener {
            Listener::Addr(addr) => TcpListener::bind(addr).await?,
            Listener::Bound(listener) => listener,
        };
        let router = Arc::new(router);

        info!(addr = %listener.local_addr()?, "shipping-api listening");

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let mut stop_rx = stop_rx.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req).await }
                        });

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        let result = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = stop_rx.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(e) = result {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let _ = stop_tx.send(true);
        while tasks.join_next().await.is_some() {}

        info!("shipping-api stopped");
        Ok(())
    }
}

/// Buffers one hyper request, routes it and converts the response back.
///
/// Every failure becomes an HTTP response, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let Ok(method) = Method::try_from(&parts.method) else {
        let res = (Status::MethodNotAllowed, Json(json!({ "error": "Method Not Allowed" })));
        return Ok(res.into_response().into_inner());
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            debug!("failed to read request body: {e}");
            let res = (Status::BadRequest, Json(json!({ "error": "Invalid request body" })));
            return Ok(res.into_response().into_inner());
        }
    };

    let headers = parts.headers.iter()
        .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
        .collect();

    let req = Request::new(
        method,
        parts.uri.path().to_owned(),
        parts.uri.query().map(str::to_owned),
        headers,
        body,
    );

    Ok(router.handle(req).await.into_inner())
}

/// Resolves on the first SIGTERM (Unix) or Ctrl-C the process receives.
///
/// If a handler cannot be installed the corresponding arm never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
