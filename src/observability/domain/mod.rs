//! Domain model for traces, spans and events.
//!
//! A trace owns its spans exclusively and spans nest one level deep. Events
//! attach to either a trace or a span and never have children.

mod error;
mod ids;
mod record;
mod status;

pub use error::ObservabilityError;
pub use ids::{SpanId, TraceId};
pub(crate) use record::collect_attributes;
pub use record::{Attributes, EventRecord, SpanRecord, TraceRecord};
pub use status::{SpanStatus, TraceStatus};
