use crate::domain::document::{Document, ElementSpec, NodeId};
use crate::domain::model::Severity;
use crate::utils::error::Result;
use std::time::Duration;
use tokio::time::Instant;

pub const NOTIFICATION_CLASS: &str = "notification";
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRemoval {
    node: NodeId,
    due: Instant,
}

/// Transient banners appended to the body. Each one is removed once its
/// deadline passes and the page runs its due timers.
#[derive(Debug, Clone)]
pub struct Notifier {
    duration: Duration,
    pending: Vec<PendingRemoval>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            pending: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn show(&mut self, doc: &mut Document, message: &str, severity: Severity) -> Result<NodeId> {
        let body = doc.body();
        let node = doc.append_new(
            body,
            ElementSpec::new("div")
                .class(NOTIFICATION_CLASS)
                .class(severity.as_class())
                .text(message),
        )?;

        match severity {
            Severity::Success => tracing::info!("Notification: {}", message),
            Severity::Error => tracing::warn!("Notification: {}", message),
        }

        self.pending.push(PendingRemoval {
            node,
            due: Instant::now() + self.duration,
        });
        Ok(node)
    }

    /// Removes every notification whose deadline has passed.
    pub fn run_due(&mut self, doc: &mut Document) -> Result<usize> {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due <= now);
        self.pending = pending;

        for removal in &due {
            doc.remove(removal.node)?;
        }
        Ok(due.len())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
