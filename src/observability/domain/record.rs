//! Self-contained trace records handed to exporters.

use super::{SpanId, SpanStatus, TraceId, TraceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed attribute map carried by events and trace metadata.
pub type Attributes = BTreeMap<String, String>;

/// Collects `(key, value)` pairs into an [`Attributes`] map.
pub(crate) fn collect_attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// A named, timestamped point inside a trace or span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event name, such as `task_created`.
    pub name: String,
    /// When the event was recorded.
    pub time: DateTime<Utc>,
    /// Event attributes.
    pub attributes: Attributes,
}

impl EventRecord {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn now(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            time: Utc::now(),
            attributes,
        }
    }
}

/// A timed sub-operation within a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    /// Span identifier.
    pub span_id: SpanId,
    /// Owning trace.
    pub trace_id: TraceId,
    /// Operation name, such as `task_store.create`.
    pub name: String,
    /// When the span was opened.
    pub start_time: DateTime<Utc>,
    /// When the span was closed. Never earlier than `start_time`.
    pub end_time: DateTime<Utc>,
    /// Span outcome.
    pub status: SpanStatus,
    /// Failure detail for `error` and `aborted` spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Summary of the operation's arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Summary of the operation's result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Events recorded while the span was open, in order.
    pub events: Vec<EventRecord>,
}

/// The complete observability record for one top-level request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    /// Trace identifier.
    pub trace_id: TraceId,
    /// Operation label, such as `task_manager_single`.
    pub name: String,
    /// When the trace was opened.
    pub start_time: DateTime<Utc>,
    /// When the trace was closed. Never earlier than `start_time`.
    pub end_time: DateTime<Utc>,
    /// Trace outcome.
    pub status: TraceStatus,
    /// Failure detail; always present when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request metadata: backend, redacted input, output summary.
    pub metadata: Attributes,
    /// Events attached directly to the trace, in order.
    pub events: Vec<EventRecord>,
    /// Closed spans in the order they were closed.
    pub spans: Vec<SpanRecord>,
}

impl TraceRecord {
    /// Returns the metadata value for `key`, if set.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns the span names in export order.
    #[must_use]
    pub fn span_names(&self) -> Vec<&str> {
        self.spans.iter().map(|span| span.name.as_str()).collect()
    }

    /// Returns the trace-level event names in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|event| event.name.as_str()).collect()
    }
}
