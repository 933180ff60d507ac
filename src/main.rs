use std::process::ExitCode;

use shipping_api::{app, config::Config, logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logging::init();

    let result = match Config::from_env() {
        Ok(config) => app::run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
