//! Execution events for progress reporting.
//!
//! Subscribers receive events over unbounded channels in the order the
//! orchestrator produces them. Emitting never waits on a subscriber; a
//! dropped receiver is pruned on the next emit.
//!
//! # Event Format
//!
//! Serialized as one JSON object per line:
//! ```json
//! {"type":"tool_started","execution_id":"...","linter":"eslint","timestamp":"..."}
//! ```
//!
//! # Event Types
//!
//! - `state_changed` - The orchestrator moved to a new state
//! - `tool_started` - Output shows a linter has started
//! - `output` - A raw line from the container

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::execution::orchestrator::ExecutionState;

/// Which pipe a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    StateChanged {
        execution_id: String,
        state: ExecutionState,
        timestamp: String,
    },
    ToolStarted {
        execution_id: String,
        linter: String,
        timestamp: String,
    },
    Output {
        execution_id: String,
        stream: OutputStream,
        line: String,
    },
}

impl ExecutionEvent {
    pub fn state_changed(execution_id: &str, state: ExecutionState) -> Self {
        ExecutionEvent::StateChanged {
            execution_id: execution_id.to_string(),
            state,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn tool_started(execution_id: &str, linter: &str) -> Self {
        ExecutionEvent::ToolStarted {
            execution_id: execution_id.to_string(),
            linter: linter.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn output(execution_id: &str, stream: OutputStream, line: &str) -> Self {
        ExecutionEvent::Output {
            execution_id: execution_id.to_string(),
            stream,
            line: line.to_string(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ExecutionEvent::StateChanged { .. } => "state_changed",
            ExecutionEvent::ToolStarted { .. } => "tool_started",
            ExecutionEvent::Output { .. } => "output",
        }
    }

    /// Single-line JSON form
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"type\":\"{}\"}}", self.event_type()))
    }
}

/// Fan-out of execution events to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<UnboundedSender<ExecutionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it sees every event emitted from now on
    pub fn subscribe(&self) -> UnboundedReceiver<ExecutionEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn emit(&self, event: ExecutionEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
