//! Application assembly: repository selection, route table and the serve
//! loop.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::handler::with_state;
use crate::health;
use crate::method::Method;
use crate::middleware::{RequireSecret, Trace};
use crate::router::Router;
use crate::server::Server;
use crate::shipping::{self, AppState, InMemoryShippingRepository, PgShippingRepository, ShippingRepository};

/// The full route table: health checks at the root, shipping routes under
/// [`shipping::PREFIX`] behind the shared secret, everything traced.
pub fn router(state: &AppState, secret: RequireSecret) -> Router {
    Router::new()
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", with_state(state, health::readiness))
        .nest(shipping::PREFIX, shipping::routes(state, secret))
        .layer(Trace)
}

/// Opens the repository named by the configuration.
pub async fn repository(config: &Config) -> Result<Arc<dyn ShippingRepository>, Error> {
    match &config.database_url {
        Some(url) => {
            let repo = PgShippingRepository::connect(url, config.database_max_connections).await?;
            Ok(Arc::new(repo))
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Ok(Arc::new(InMemoryShippingRepository::new()))
        }
    }
}

/// Runs the service until a shutdown signal, then closes the repository.
pub async fn run(config: Config) -> Result<(), Error> {
    info!(?config, "starting");

    let repo = repository(&config).await?;
    let state = AppState::new(Arc::clone(&repo));
    let app = router(&state, RequireSecret::new(config.secret_key.as_str()));

    let served = Server::bind(config.addr()).serve(app).await;

    repo.close().await;
    served
}
