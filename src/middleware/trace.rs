//! Per-request tracing.

use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::Request;

/// Emits one `info` event per request with method, path, status and latency.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method();
        let path = req.path().to_owned();

        Box::pin(async move {
            let started = Instant::now();
            let res = next.run(req).await;
            info!(
                %method,
                %path,
                status = res.status_code(),
                latency_us = started.elapsed().as_micros() as u64,
                "request"
            );
            res
        })
    }
}
