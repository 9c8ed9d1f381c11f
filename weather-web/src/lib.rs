//! Web front-end for the weather location list.
//!
//! Routes map onto the workflows in `weather-core`; pages are rendered by
//! [`render`] and every workflow failure goes through [`error::ErrorPage`].

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use weather_core::{
    Config, DocumentStore, GeonamesClient, LocationStore, WeatherCompanyProvider, Workflows,
};

pub mod error;
pub mod render;
pub mod routes;

pub use routes::{WebState, router};

/// Build every component from `config` and serve until the process exits.
///
/// With `in_memory` the location list is not persisted.
pub async fn start_web_server(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let geocoder = GeonamesClient::from_config(&config)?;
    let weather = WeatherCompanyProvider::from_config(&config)?;

    let store: Arc<dyn LocationStore> = if in_memory {
        tracing::warn!("using an in-memory location store; changes are lost on exit");
        Arc::new(DocumentStore::in_memory())
    } else {
        let path = config.store_path()?;
        Arc::new(
            DocumentStore::open(&path)
                .await
                .with_context(|| format!("Failed to open location store at {}", path.display()))?,
        )
    };

    let workflows = Workflows::new(Arc::new(geocoder), Arc::new(weather), store);
    let routes = router(WebState {
        workflows: Arc::new(workflows),
    });

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(addr = %config.server.bind, "listening");
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
