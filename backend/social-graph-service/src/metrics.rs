/// Prometheus metrics for the ranking surfaces and social write paths
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    /// Ranked requests served (labels: surface=feed|post_search|profile_search|dating|user_suggestions|creator_suggestions)
    pub static ref RANKING_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "social_graph_ranking_requests_total",
        "Total number of ranked result sets served",
        &["surface"]
    )
    .expect("Failed to register RANKING_REQUESTS_TOTAL");

    /// Candidates pulled from the graph before scoring
    pub static ref RANKING_CANDIDATES: HistogramVec = register_histogram_vec!(
        "social_graph_ranking_candidates",
        "Number of candidates scored per ranked request",
        &["surface"],
        vec![0.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0]
    )
    .expect("Failed to register RANKING_CANDIDATES");

    /// Wall time spent fetching and scoring
    pub static ref RANKING_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "social_graph_ranking_duration_seconds",
        "Ranked request latency in seconds",
        &["surface"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register RANKING_DURATION_SECONDS");

    /// Mutual dating matches created
    pub static ref DATING_MATCHES_TOTAL: Counter = register_counter!(
        "social_graph_dating_matches_total",
        "Total number of mutual dating matches"
    )
    .expect("Failed to register DATING_MATCHES_TOTAL");

    /// Notification fan-out outcomes (labels: status=created|skipped|failed)
    pub static ref NOTIFICATION_FANOUT_TOTAL: CounterVec = register_counter_vec!(
        "social_graph_notification_fanout_total",
        "Notification fan-out attempts by outcome",
        &["status"]
    )
    .expect("Failed to register NOTIFICATION_FANOUT_TOTAL");

    /// Users provisioned on first login
    pub static ref USERS_PROVISIONED_TOTAL: Counter = register_counter!(
        "social_graph_users_provisioned_total",
        "Total number of users created from identity provider profiles"
    )
    .expect("Failed to register USERS_PROVISIONED_TOTAL");
}

/// Times one ranked request; recorded on [`RankingTimer::finish`]
pub struct RankingTimer {
    surface: &'static str,
    started: Instant,
}

impl RankingTimer {
    pub fn start(surface: &'static str) -> Self {
        Self {
            surface,
            started: Instant::now(),
        }
    }

    pub fn finish(self, candidates: usize) {
        RANKING_REQUESTS_TOTAL
            .with_label_values(&[self.surface])
            .inc();
        RANKING_CANDIDATES
            .with_label_values(&[self.surface])
            .observe(candidates as f64);
        RANKING_DURATION_SECONDS
            .with_label_values(&[self.surface])
            .observe(self.started.elapsed().as_secs_f64());
    }
}

/// Text exposition of every registered metric
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_request() {
        let before = RANKING_REQUESTS_TOTAL
            .with_label_values(&["feed"])
            .get();
        RankingTimer::start("feed").finish(12);
        let after = RANKING_REQUESTS_TOTAL
            .with_label_values(&["feed"])
            .get();
        assert!(after >= before + 1.0);
    }

    #[test]
    fn test_gather_contains_registered_families() {
        DATING_MATCHES_TOTAL.inc();
        let text = gather_metrics();
        assert!(text.contains("social_graph_dating_matches_total"));
    }
}
