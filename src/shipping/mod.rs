//! Shipping records: model, storage and HTTP handlers.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST` | `/api/shipping/create` | [`handlers::create`] |
//! | `PUT`  | `/api/shipping/cancel` | [`handlers::cancel`] |
//! | `GET`  | `/api/shipping/get`    | [`handlers::list`]   |

mod error;
pub mod handlers;
mod model;
mod postgres;
mod repository;

use std::sync::Arc;

use crate::handler::with_state;
use crate::method::Method;
use crate::middleware::RequireSecret;
use crate::router::Router;

pub use error::{ApiError, ShippingError};
pub use model::{NewShipping, ShippingFilter, ShippingRecord, ShippingStatus};
pub use postgres::PgShippingRepository;
pub use repository::{InMemoryShippingRepository, ShippingRepository};

#[cfg(test)]
pub(crate) use repository::MockShippingRepository;

/// Path prefix every shipping route is mounted under.
pub const PREFIX: &str = "/api/shipping";

/// State shared by the shipping handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn ShippingRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ShippingRepository>) -> Self {
        Self { repository }
    }
}

/// The shipping routes, relative to [`PREFIX`], all behind `secret`.
pub fn routes(state: &AppState, secret: RequireSecret) -> Router {
    Router::new()
        .on(Method::Post, "/create", with_state(state, handlers::create))
        .on(Method::Put,  "/cancel", with_state(state, handlers::cancel))
        .on(Method::Get,  "/get",    with_state(state, handlers::list))
        .layer(secret)
}
