// src/metrics.rs
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration so series show up on whatever recorder the
/// consuming app installs. The crate itself ships no exporter.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_fetch_attempts_total",
            "Transport attempts against the news API."
        );
        describe_counter!(
            "news_fetch_retries_total",
            "Retries performed after a failed attempt."
        );
        describe_counter!(
            "news_fetch_errors_total",
            "Fetches that surfaced an error after retries were exhausted."
        );
        describe_counter!("news_cache_hits_total", "Cache reads that found an entry.");
        describe_counter!("news_cache_misses_total", "Cache reads with no entry (cold start).");
        describe_counter!(
            "news_cache_stale_served_total",
            "Stale entries served while a revalidation was pending."
        );
        describe_counter!(
            "news_storage_degraded_total",
            "Storage failures that dropped the cache to memory-only."
        );
        describe_counter!(
            "news_tracker_events_total",
            "View events appended to the reading history."
        );
        describe_counter!("news_refresh_ticks_total", "Periodic background refresh runs.");
        describe_gauge!(
            "news_refresh_last_run_ts",
            "Unix ts when the periodic refresh last ran."
        );
    });
}
