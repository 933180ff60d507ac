//! # shipping-api
//!
//! A small HTTP service that records shipments and lets callers cancel and
//! list them. Every path under `/api/shipping` is gated by a static shared secret
//! sent in the `shipping_secret_key` header.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | `POST` | `/api/shipping/create` | `201` + record |
//! | `PUT`  | `/api/shipping/cancel` | `200` + record |
//! | `GET`  | `/api/shipping/get[?userId=]` | `200` + array |
//! | `GET`  | `/healthz`, `/readyz` | probes, no secret |
//!
//! The crate is split in two:
//!
//! - a thin HTTP layer: radix-tree routing via [`matchit`], hyper for the
//!   wire, middleware layers, graceful shutdown on SIGTERM / Ctrl-C;
//! - the [`shipping`] application: model, repository (PostgreSQL through
//!   sqlx, or in memory) and handlers.
//!
//! ## Running
//!
//! ```rust,no_run
//! use shipping_api::{app, config::Config, logging};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), shipping_api::Error> {
//!     logging::init();
//!     app::run(Config::from_env()?).await
//! }
//! ```

mod error;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod app;
pub mod config;
pub mod handler;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod shipping;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{shutdown_signal, Server};
pub use status::Status;
