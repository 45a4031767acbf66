use std::path::Path;
use std::sync::Arc;

use fmh_core::error::LogbookError;
use fmh_core::extraction::pdftotext::PdftotextExtractor;
use fmh_server::AppState;

pub async fn run(db: &Path, listen: &str, hospital: Option<String>) -> Result<(), LogbookError> {
    if !PdftotextExtractor::is_available() {
        tracing::warn!("pdftotext not found on PATH, uploads will fail until poppler is installed");
    }

    let store = super::open_store(db)?;
    let state = AppState::new(store, Arc::new(PdftotextExtractor::new())).with_hospital(hospital);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    fmh_server::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
