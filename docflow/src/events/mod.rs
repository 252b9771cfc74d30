//! Event sinks for pipeline observability.
//!
//! The runner reports every lifecycle transition to an [`EventSink`]. The
//! binary uses [`LoggingEventSink`]; tests use [`CollectingEventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
