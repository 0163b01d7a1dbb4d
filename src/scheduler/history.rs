//! Run-history hand-off.
//!
//! After a successful run the scheduler passes a [`HistoryRecord`] to a
//! [`HistorySink`]. Durable storage is the sink's concern; the scheduler
//! does not observe whether it succeeds.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Module name recorded for scheduling runs.
pub const MODULE_NAME: &str = "schedule";

/// One completed run, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Always [`MODULE_NAME`] for this crate.
    pub module: String,
    /// Policy name.
    pub algorithm: String,
    /// Input records and parameters as received.
    pub params: Value,
    /// Full report payload.
    pub result: Value,
    /// Local wall-clock time of the hand-off.
    pub recorded_at: NaiveDateTime,
}

impl HistoryRecord {
    /// Creates a record stamped with the current local time.
    pub fn new(algorithm: impl Into<String>, params: Value, result: Value) -> Self {
        Self {
            module: MODULE_NAME.to_string(),
            algorithm: algorithm.into(),
            params,
            result,
            recorded_at: Local::now().naive_local(),
        }
    }
}

/// Destination for completed-run records.
pub trait HistorySink {
    /// Accepts a record. Failures are the sink's to handle.
    fn record(&mut self, record: HistoryRecord);
}

/// In-memory sink.
impl HistorySink for Vec<HistoryRecord> {
    fn record(&mut self, record: HistoryRecord) {
        self.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_fields() {
        let r = HistoryRecord::new("greedy", json!({"batchSize": 5}), json!({"rows": []}));
        assert_eq!(r.module, "schedule");
        assert_eq!(r.algorithm, "greedy");
        assert_eq!(r.params["batchSize"], 5);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<HistoryRecord> = Vec::new();
        sink.record(HistoryRecord::new("edd", Value::Null, Value::Null));
        sink.record(HistoryRecord::new("batch", Value::Null, Value::Null));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].algorithm, "batch");
    }
}
