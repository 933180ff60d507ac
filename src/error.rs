//! Unified infrastructure error type.

use thiserror::Error;

use crate::config::ConfigError;

/// The error type returned by the service's fallible startup and serving
/// operations.
///
/// Application-level failures (403, 404, 500 on a single request) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces failures that stop the process: a bad configuration,
/// an unreachable database, or a port that cannot be bound.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
