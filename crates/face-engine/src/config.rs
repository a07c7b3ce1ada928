use std::env;

/// Default acceptance threshold for automatic assignment.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.7;

/// Default embedding model tag expected for comparisons.
pub const DEFAULT_MODEL_TAG: &str = "arcface";

/// Configuration for the assignment orchestrator.
///
/// Passed explicitly at construction so tests can run enabled and
/// disabled engines side by side; the engine itself never reads
/// process environment.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// When false, detection is skipped entirely and indexing reports
    /// zero faces, as if the provider were always unavailable.
    pub enabled: bool,

    /// Minimum cosine similarity before an automatic assignment is
    /// trusted. Inclusive: a score equal to the threshold assigns.
    pub match_threshold: f32,

    /// Embedding model tag; vectors tagged differently are treated as
    /// absent for matching purposes.
    pub model_tag: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            model_tag: DEFAULT_MODEL_TAG.to_string(),
        }
    }
}

impl IndexerConfig {
    /// Read configuration from environment variables. Used by service
    /// binaries only; library consumers construct the struct directly.
    pub fn from_env() -> Self {
        let enabled = env::var("FACE_PIPELINE_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        let match_threshold = env::var("FACE_MATCH_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MATCH_THRESHOLD);

        let model_tag =
            env::var("FACE_EMBED_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_TAG.to_string());

        Self {
            enabled,
            match_threshold,
            model_tag,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub fn with_model_tag(mut self, model_tag: impl Into<String>) -> Self {
        self.model_tag = model_tag.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IndexerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(config.model_tag, "arcface");
    }

    #[test]
    fn builder() {
        let config = IndexerConfig::default()
            .with_threshold(0.85)
            .with_model_tag("facenet")
            .with_enabled(false);
        assert!(!config.enabled);
        assert_eq!(config.match_threshold, 0.85);
        assert_eq!(config.model_tag, "facenet");
    }

    #[test]
    fn disabled_constructor() {
        let config = IndexerConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
    }
}
