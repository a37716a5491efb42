#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use errors::ApplicationError;
use router::setup_router;
use settings::Settings;
use state::AppState;
use todo_core::open_repository;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod errors;
mod model;
mod router;
mod settings;
mod state;

#[cfg(test)]
mod test;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApplicationError> {
    setup_tracing();

    let settings = Settings::from_env()?;
    info!(
        "Using {} storage, basic auth {}",
        settings.storage.backend(),
        if settings.basic_auth.is_some() { "enabled" } else { "disabled" }
    );

    let repository = open_repository(&settings.storage)?;
    let address = settings.address();
    let app = setup_router(AppState::new(repository, settings));

    info!("Starting server on {}", address);

    let listener = TcpListener::bind(address)
        .await
        .map_err(ApplicationError::from)?;

    info!(
        "Listening on: {}",
        listener.local_addr().map_err(ApplicationError::from)?
    );

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ApplicationError::CannotServe)?;
    Ok(())
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{crate_name}=debug,todo_core=debug,tower_http=debug",
                    crate_name = env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
