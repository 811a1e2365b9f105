//! Change notification bus.
//!
//! The checklist aggregate itself is observation-agnostic; surfaces emit a
//! [`ChangeKind`] here after a successful store write, and long-lived
//! readers (the widget snapshot cache) subscribe to refresh themselves.
//! Delivery is best-effort: a bus with no subscribers drops events.

use tokio::sync::broadcast;

/// Categories of mutations that affect displayed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A checklist was created, renamed, recategorized, or deleted.
    ChecklistChanged,
    /// An item was added, edited, toggled, moved, or removed.
    ItemChanged,
}

/// Broadcast bus for change notifications.
#[derive(Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeKind>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Subscribe to subsequent change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeKind> {
        self.tx.subscribe()
    }

    /// Emit a change event. Returns the number of subscribers reached.
    pub fn emit(&self, kind: ChangeKind) -> usize {
        match self.tx.send(kind) {
            Ok(count) => count,
            Err(_) => {
                tracing::debug!(?kind, "change event dropped, no subscribers");
                0
            }
        }
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let bus = ChangeBus::new();
        let mut rx = bus.subscribe();

        assert_eq!(bus.emit(ChangeKind::ItemChanged), 1);
        assert_eq!(rx.recv().await.unwrap(), ChangeKind::ItemChanged);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_dropped() {
        let bus = ChangeBus::new();
        assert_eq!(bus.emit(ChangeKind::ChecklistChanged), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = ChangeBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        assert_eq!(bus.emit(ChangeKind::ChecklistChanged), 2);
        assert_eq!(a.recv().await.unwrap(), ChangeKind::ChecklistChanged);
        assert_eq!(b.recv().await.unwrap(), ChangeKind::ChecklistChanged);
    }
}
