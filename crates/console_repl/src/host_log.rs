//! Tracing layer that forwards host log events into the console transcript.
//!
//! Events emitted by the console engine itself are skipped; the engine already writes its own
//! user-facing lines. Everything else at WARN or above is buffered until the host loop drains it
//! through [`dev_console::DevConsole::append_host_log`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use dev_console::{DevConsole, Severity};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

const ENGINE_TARGET: &str = "dev_console";

/// Pending host log lines shared between the layer and the host loop.
#[derive(Clone, Debug, Default)]
pub struct HostLogBuffer {
    pending: Arc<Mutex<VecDeque<(String, Severity)>>>,
}

impl HostLogBuffer {
    fn push(&self, message: String, severity: Severity) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((message, severity));
    }

    /// Removes and returns everything buffered so far, oldest first.
    pub fn drain(&self) -> Vec<(String, Severity)> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Moves buffered lines into the console transcript. Returns how many were forwarded.
    pub fn forward_to(&self, console: &DevConsole) -> usize {
        let lines = self.drain();
        for (message, severity) in &lines {
            console.append_host_log(message, *severity);
        }
        lines.len()
    }
}

/// A [`tracing_subscriber::Layer`] feeding a [`HostLogBuffer`].
pub struct HostLogLayer {
    buffer: HostLogBuffer,
}

impl HostLogLayer {
    /// Layer writing WARN+ events from non-console targets into `buffer`.
    pub fn new(buffer: HostLogBuffer) -> Self {
        Self { buffer }
    }
}

/// Visitor for extracting the message field from events.
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn severity_of(level: &Level) -> Option<Severity> {
    match *level {
        Level::ERROR => Some(Severity::Error),
        Level::WARN => Some(Severity::Warn),
        _ => None,
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(ENGINE_TARGET) {
            return;
        }
        let Some(severity) = severity_of(metadata.level()) else {
            return;
        };

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            return;
        }
        self.buffer.push(visitor.message, severity);
    }
}
