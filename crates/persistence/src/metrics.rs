//! Database metrics collection.

use metrics::{counter, histogram};
use std::time::Instant;

/// Times a repository operation and records it as
/// `database_query_duration_seconds{query}` when finished.
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

/// Count a committed device mutation (`create`, `update` or `delete`).
pub fn record_device_mutation(operation: &'static str) {
    counter!("device_mutations_total", "operation" => operation).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("list_devices");
        assert_eq!(timer.query_name, "list_devices");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        QueryTimer::new("find_device").record();
        record_device_mutation("create");
    }
}
