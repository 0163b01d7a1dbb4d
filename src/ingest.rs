//! Order model builder.
//!
//! Turns flat order/operation records into [`Order`]s with sorted
//! operation lists and discovers the machine pool from the eligibility
//! fields.
//!
//! # Defaulting rules
//!
//! | Field | Missing / invalid |
//! |-------|-------------------|
//! | order id | fatal ([`ScheduleError::MissingOrderId`]) |
//! | machines | every machine in the discovered pool |
//! | processing time | 1.0 h |
//! | arrival / due | first value within the order's group; none → fatal |

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::models::{MachinePool, Operation, Order};

/// Processing time used when a record has none or an unusable one.
pub const DEFAULT_PROCESSING_HOURS: f64 = 1.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// One input row: a single operation of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(default, alias = "order_id", deserialize_with = "text_or_number")]
    pub order_id: Option<String>,
    #[serde(alias = "operation_no")]
    pub operation_no: u32,
    #[serde(default, deserialize_with = "text_or_number")]
    pub product: Option<String>,
    #[serde(default)]
    pub machines: MachineField,
    #[serde(default, alias = "processing_hours")]
    pub processing_hours: Option<ProcessingTime>,
    #[serde(default)]
    pub arrival: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

impl OrderRecord {
    /// Creates a record for operation `operation_no` of `order_id`.
    pub fn new(order_id: impl Into<String>, operation_no: u32) -> Self {
        Self {
            order_id: Some(order_id.into()),
            operation_no,
            ..Self::default()
        }
    }

    /// Sets the product code.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// Sets the eligibility field from comma-separated text.
    pub fn with_machines(mut self, machines: impl Into<String>) -> Self {
        self.machines = MachineField::Text(machines.into());
        self
    }

    /// Sets the processing time (hours).
    pub fn with_processing_hours(mut self, hours: f64) -> Self {
        self.processing_hours = Some(ProcessingTime::Hours(hours));
        self
    }

    /// Sets arrival and due timestamps.
    pub fn with_window(mut self, arrival: impl Into<String>, due: impl Into<String>) -> Self {
        self.arrival = Some(arrival.into());
        self.due = Some(due.into());
        self
    }
}

/// Machine eligibility as sent by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MachineField {
    List(Vec<String>),
    Text(String),
}

impl Default for MachineField {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MachineField {
    /// Trimmed, non-blank machine ids in field order.
    pub fn ids(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Text(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Processing time as sent by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingTime {
    Hours(f64),
    Text(String),
}

impl ProcessingTime {
    /// Positive finite hours, if this value holds any.
    pub fn hours(&self) -> Option<f64> {
        let value = match self {
            Self::Hours(h) => *h,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Orders plus the machine pool discovered from them.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    /// Orders in first-seen order.
    pub orders: Vec<Order>,
    /// Idle pool of every machine any operation names.
    pub machines: MachinePool,
}

impl OrderBook {
    /// Total number of operations.
    pub fn operation_count(&self) -> usize {
        self.orders.iter().map(Order::operation_count).sum()
    }
}

/// Groups records into orders and discovers the machine pool.
///
/// Records sharing an order id are merged into one order; product,
/// arrival and due come from the first record of the group that has them.
/// Operations are sorted by operation number. Blank eligibility widens to
/// the whole discovered pool.
pub fn build_orders(records: &[OrderRecord]) -> Result<OrderBook> {
    let mut groups: Vec<(String, Vec<&OrderRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, record) in records.iter().enumerate() {
        let order_id = record
            .order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ScheduleError::MissingOrderId { row })?;

        match index.get(order_id) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(order_id.to_string(), groups.len());
                groups.push((order_id.to_string(), vec![record]));
            }
        }
    }

    let pool = MachinePool::from_ids({
        let mut ids: Vec<String> = records.iter().flat_map(|r| r.machines.ids()).collect();
        ids.sort();
        ids.dedup();
        ids
    });
    let all_machines = pool.ids();

    let mut orders = Vec::with_capacity(groups.len());
    for (order_id, mut rows) in groups {
        rows.sort_by_key(|r| r.operation_no);

        let product = rows
            .iter()
            .find_map(|r| r.product.clone())
            .unwrap_or_default();
        let entry = group_timestamp(&order_id, "arrival", rows.iter().map(|r| &r.arrival))?;
        let due = group_timestamp(&order_id, "due", rows.iter().map(|r| &r.due))?;

        let mut order = Order::new(order_id.as_str(), product, entry, due);
        for row in rows {
            order = order.with_operation(build_operation(&order_id, row, &all_machines));
        }
        orders.push(order);
    }

    debug!(
        orders = orders.len(),
        machines = pool.len(),
        "order model built"
    );

    Ok(OrderBook {
        orders,
        machines: pool,
    })
}

fn build_operation(order_id: &str, record: &OrderRecord, all_machines: &[String]) -> Operation {
    let mut machines = record.machines.ids();
    if machines.is_empty() {
        warn!(
            order_id,
            operation_no = record.operation_no,
            "blank eligibility widened to every machine"
        );
        machines = all_machines.to_vec();
    }

    let hours = match record.processing_hours.as_ref().and_then(ProcessingTime::hours) {
        Some(h) => h,
        None => {
            warn!(
                order_id,
                operation_no = record.operation_no,
                value = ?record.processing_hours,
                "missing or invalid processing time, using default"
            );
            DEFAULT_PROCESSING_HOURS
        }
    };

    Operation::new(order_id, record.operation_no)
        .with_machines(machines)
        .with_processing_hours(hours)
}

fn group_timestamp<'a>(
    order_id: &str,
    field: &'static str,
    mut values: impl Iterator<Item = &'a Option<String>>,
) -> Result<NaiveDateTime> {
    let raw = values
        .find_map(|v| v.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .ok_or_else(|| ScheduleError::MissingTimestamp {
            order_id: order_id.to_string(),
            field,
        })?;

    parse_timestamp(raw).ok_or_else(|| ScheduleError::InvalidTimestamp {
        order_id: order_id.to_string(),
        field,
        value: raw.to_string(),
    })
}

/// Parses the timestamp layouts accepted at the ingestion boundary.
///
/// Date-only values resolve to midnight; RFC 3339 values keep their
/// local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(f)) => Some(f.to_string()),
        None => None,
    })
}
