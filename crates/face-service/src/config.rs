use anyhow::{Context, Result};
use face_engine::IndexerConfig;
use reqwest::Url;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FaceServiceConfig {
    /// Address to bind the HTTP server to
    pub bind_addr: String,

    /// Postgres connection string; in-memory storage when absent
    pub database_url: Option<String>,

    /// Detection/embedding sidecar base URL; the pipeline is disabled
    /// when absent
    pub detector_url: Option<Url>,

    /// Timeout for detector calls
    pub detector_timeout: Duration,

    /// Engine configuration (threshold, model tag, enabled flag)
    pub indexer: IndexerConfig,
}

impl FaceServiceConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            env::var("FACE_SERVICE_ADDR").unwrap_or_else(|_| "0.0.0.0:8086".to_string());

        let database_url = env::var("DATABASE_URL").ok();

        let detector_url = env::var("DETECTOR_URL")
            .ok()
            .map(|s| Url::parse(&s).context("invalid DETECTOR_URL"))
            .transpose()?;

        let detector_timeout = Duration::from_secs(
            env::var("DETECTOR_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        );

        let mut indexer = IndexerConfig::from_env();
        if detector_url.is_none() {
            indexer.enabled = false;
        }

        Ok(Self {
            bind_addr,
            database_url,
            detector_url,
            detector_timeout,
            indexer,
        })
    }
}
