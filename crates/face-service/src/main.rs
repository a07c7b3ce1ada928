use anyhow::Result;
use common::store::FaceStore;
use face_engine::{
    FaceDetector, FaceIndexer, HttpFaceDetector, MemoryFaceStore, PgFaceStore, StaticFaceDetector,
};
use face_service::{api, FaceServiceConfig, FaceServiceState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_with_service("face-service");

    info!("Starting face service...");

    let config = FaceServiceConfig::from_env()?;
    info!(
        "Face service configuration: bind={}, threshold={}, model={}, pipeline_enabled={}",
        config.bind_addr,
        config.indexer.match_threshold,
        config.indexer.model_tag,
        config.indexer.enabled
    );

    let store: Arc<dyn FaceStore> = match &config.database_url {
        Some(url) => {
            info!("Connecting to Postgres face store");
            Arc::new(PgFaceStore::connect(url).await?)
        }
        None => {
            info!("No DATABASE_URL configured, using in-memory face store (not durable)");
            Arc::new(MemoryFaceStore::new())
        }
    };

    let detector: Arc<dyn FaceDetector> = match &config.detector_url {
        Some(url) => {
            info!("Using face detector at {}", url);
            Arc::new(HttpFaceDetector::with_timeout(
                url.clone(),
                config.detector_timeout,
            )?)
        }
        None => {
            info!("No DETECTOR_URL configured, face pipeline disabled");
            Arc::new(StaticFaceDetector::new())
        }
    };

    let indexer = Arc::new(FaceIndexer::new(
        store.clone(),
        detector,
        config.indexer.clone(),
    ));
    let state = FaceServiceState::new(indexer, store);

    let app = api::router(state);

    info!("Binding to {}", config.bind_addr);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Face service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
