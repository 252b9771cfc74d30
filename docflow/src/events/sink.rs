//! Event sink trait and implementations.

use crate::core::StageEvent;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn, Level};

/// Trait for event sinks that receive pipeline lifecycle events.
///
/// Emitting must never fail or panic; sinks swallow their own errors.
pub trait EventSink: Send + Sync {
    /// Emits an event.
    fn emit(&self, event: &StageEvent);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &StageEvent) {}
}

/// An event sink that logs events using the tracing framework.
///
/// At `INFO` and above, failure events are raised to `ERROR` and skipped
/// stages to `WARN`. A `DEBUG` sink logs everything at `DEBUG`, leaving
/// failure reporting to the runner.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Returns the level an event of this type is logged at.
    #[must_use]
    pub fn level_for(&self, event_type: &str) -> Level {
        if self.level == Level::DEBUG || self.level == Level::TRACE {
            Level::DEBUG
        } else if event_type.ends_with(".failed") {
            Level::ERROR
        } else if event_type == "stage.skipped" {
            Level::WARN
        } else {
            self.level
        }
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &StageEvent) {
        let event_type = event.event_type.as_str();
        let stage = event
            .get("stage")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        let level = self.level_for(event_type);

        if level == Level::ERROR {
            let cause = event
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            error!(event_type, stage, "{event_type}: {stage}: {cause}");
        } else if level == Level::WARN {
            warn!(event_type, stage, "{event_type}: {stage}");
        } else if level == Level::INFO {
            info!(event_type, stage, event_data = ?event.data, "Event: {event_type}");
        } else {
            debug!(event_type, stage, event_data = ?event.data, "Event: {event_type}");
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<StageEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.read().clone()
    }

    /// Returns the collected event types, in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<StageEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &StageEvent) {
        self.events.write().push(event.clone());
    }
}
