//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can the store be reached? |
//!
//! Neither probe sits behind the shared secret.

use tracing::warn;

use crate::shipping::AppState;
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` when the repository answers a ping,
/// `503 Service Unavailable` otherwise.
pub async fn readiness(state: AppState, _req: Request) -> Response {
    match state.repository.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::builder()
                .status(Status::ServiceUnavailable)
                .text("unavailable")
        }
    }
}
