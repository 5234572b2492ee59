use chrono::{DateTime, Local};
use serde::Serialize;

use crate::app::QuerySpec;

const WILDCARD: &str = "*";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct TimeWindow {
    /// Epoch milliseconds, inclusive.
    pub from: i64,
    /// Epoch milliseconds.
    pub to: i64,
}

/// What the backend client sends to the log search API for one query.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub window: TimeWindow,
    pub limit: u64,
    pub tail: bool,
}

impl SearchRequest {
    /// Absolute bounds win over the relative range when a start time is set.
    pub fn from_spec(spec: &QuerySpec, now: DateTime<Local>) -> Self {
        let to = spec.end_time.unwrap_or(now).timestamp_millis();
        let from = match spec.start_time {
            Some(start) => start.timestamp_millis(),
            None => to.saturating_sub((spec.range_seconds as i64).saturating_mul(1000)),
        };
        let query = if spec.query.is_empty() {
            WILDCARD.to_owned()
        } else {
            spec.query.clone()
        };
        Self {
            query,
            window: TimeWindow { from, to },
            limit: spec.limit,
            tail: spec.tail_enabled,
        }
    }
}
