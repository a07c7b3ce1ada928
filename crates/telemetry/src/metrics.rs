use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ==== Face engine metrics ====

    /// Faces processed by the indexing pipeline, labeled by outcome:
    /// matched, below_threshold, no_embedding, persist_failed.
    pub static ref FACES_INDEXED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new("face_engine_faces_indexed_total", "Faces processed by the indexing pipeline"),
            &["outcome"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    /// Calls to the external detection/embedding provider.
    pub static ref DETECTOR_REQUESTS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new("face_engine_detector_requests_total", "Calls to the external face detector"),
            &["status"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    /// Cosine similarity of the best candidate, recorded per matched face.
    pub static ref MATCH_SCORE: Histogram = {
        let metric = Histogram::with_opts(
            HistogramOpts::new(
                "face_engine_match_score",
                "Best-candidate cosine similarity per auto-assignment attempt",
            )
            .buckets(vec![0.0, 0.3, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    /// People created via manual labeling.
    pub static ref PEOPLE_CREATED: IntCounter = {
        let metric = IntCounter::new(
            "face_engine_people_created_total",
            "People created via manual labeling",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    /// Manual label operations, labeled by status: ok, not_found,
    /// invalid, conflict.
    pub static ref LABEL_OPERATIONS: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new("face_engine_label_operations_total", "Manual face labeling operations"),
            &["status"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_once() {
        FACES_INDEXED.with_label_values(&["matched"]).inc();
        DETECTOR_REQUESTS.with_label_values(&["ok"]).inc();
        MATCH_SCORE.observe(0.9);
        PEOPLE_CREATED.inc();
        LABEL_OPERATIONS.with_label_values(&["ok"]).inc();

        let families = REGISTRY.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "face_engine_faces_indexed_total"));
    }
}
