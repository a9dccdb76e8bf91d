//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{
        CatalogueContentService, FileMirror, HttpAuthAdapter, HttpContentAdapter,
        HttpDispatcher, HttpTestAdapter, MemoryMirror, MirroredTestService,
    },
    app::{AppState, ResultReader, SessionHolder},
    config::Config,
    error::ClientError,
};
use quiz_core::ports::MirrorStorage;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting client...");
    info!(
        auth = %config.endpoints.auth,
        test = %config.endpoints.test,
        content = %config.endpoints.content,
        "Service endpoints configured."
    );

    // --- 2. Open the Local Mirror ---
    let mirror: Arc<dyn MirrorStorage> = match &config.mirror_dir {
        Some(dir) => {
            info!("Using file mirror at {}", dir.display());
            Arc::new(FileMirror::open(dir)?)
        }
        None => {
            info!("No MIRROR_DIR set; the local mirror lives in memory.");
            Arc::new(MemoryMirror::new())
        }
    };

    // --- 3. Initialize Service Adapters ---
    let http = Arc::new(HttpDispatcher::new(
        config.endpoints.clone(),
        config.request_timeout,
    )?);
    let auth = Arc::new(HttpAuthAdapter::new(http.clone()));
    let tests = Arc::new(MirroredTestService::new(
        HttpTestAdapter::new(http.clone()),
        mirror.clone(),
    ));
    let content = Arc::new(CatalogueContentService::new(HttpContentAdapter::new(
        http.clone(),
    )));

    // --- 4. Build the Shared AppState ---
    let app_state = AppState {
        auth,
        tests,
        content,
        mirror,
    };

    // --- 5. Restore the Session ---
    let session = SessionHolder::new(&app_state);
    let Some(identity) = session.restore().await else {
        info!("Nobody is signed in.");
        return Ok(());
    };
    info!(user_id = %identity.id, "Signed in as {}.", identity.name);

    // --- 6. Report the Latest Result ---
    let reader = ResultReader::new(&app_state);
    match reader.latest_result(&identity).await {
        Ok(Some(result)) => info!(
            test_id = %result.id,
            completed_at = %result.completed_at,
            "Latest result: {}",
            result.user_type
        ),
        Ok(None) => info!("No test results yet."),
        Err(e) => warn!("Could not load the test history: {}", e),
    }

    Ok(())
}
