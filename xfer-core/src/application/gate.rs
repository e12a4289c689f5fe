use crate::domain::ApprovalSignal;
use tokio::sync::watch;

/// One-shot latch a saga parks on until a human approves the transfer.
///
/// The first approval wins; later ones are refused and leave the stored approver untouched.
pub struct ApprovalGate {
    tx: watch::Sender<Option<ApprovalSignal>>,
}

impl ApprovalGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Opens the gate. Returns false if it was already open.
    pub fn open(&self, signal: ApprovalSignal) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(signal);
            accepted = true;
            true
        });
        accepted
    }

    /// Resolves once the gate is open; immediately if it already is.
    pub async fn wait(&self) -> ApprovalSignal {
        let mut rx = self.tx.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(signal) = current {
                return signal;
            }
            // The sender lives in `self`, so `changed` cannot report a closed channel here.
            let _ = rx.changed().await;
        }
    }
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}
