//! Launch events delivered to the UI side.
//!
//! Events travel one way only. A sink must never block the pipeline and
//! never report back; delivery failures (e.g. a closed receiver) are ignored.
//!
//! The wire shape is `{"topic": "progress" | "failed" | "end", "data": {...}}`.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::steps::Stage;

/// A progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Stage that produced the event; `None` for `AllDone`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Resource label; `None` for `AllDone`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Short headline, e.g. "Updating Git...".
    pub tip: String,
    /// Detail line, e.g. "[v0.0.0 -> v0.0.1] downloading: 42% (1.2 MB/2.9 MB)".
    pub detail: String,
    /// Current step number.
    pub value: u32,
    /// Maximum step number.
    pub max: u32,
}

/// Terminal notification for an aborted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEvent {
    pub stage: Stage,
    pub resource: String,
    pub tip: String,
    pub detail: String,
    pub value: u32,
    pub max: u32,
    /// The underlying cause, formatted for display.
    #[serde(rename = "errMsg")]
    pub err_msg: String,
}

/// Everything the pipeline tells the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "topic", content = "data", rename_all = "lowercase")]
pub enum LaunchEvent {
    Progress(ProgressEvent),
    Failed(FailureEvent),
    End,
}

/// Receiver of launch events.
pub trait EventSink: Send + Sync {
    /// Deliver an event. Must not block.
    fn emit(&self, event: LaunchEvent);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: LaunchEvent) {}
}

impl EventSink for UnboundedSender<LaunchEvent> {
    fn emit(&self, event: LaunchEvent) {
        if self.send(event).is_err() {
            tracing::trace!("launch event receiver closed, dropping event");
        }
    }
}

/// Format byte counts as human-readable strings.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000_000 {
        format!("{:.2} TB", bytes as f64 / 1_000_000_000_000.0)
    } else if bytes >= 1_000_000_000 {
        format!("{:.2} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}
