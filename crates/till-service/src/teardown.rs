//! Deferred ticket teardown.
//!
//! Closing a ticket must not block anyone, but the resource should only
//! disappear after a grace period so the user can read the final state.
//! Each close schedules an independent task that waits out the grace
//! period and then asks the renderer to delete the ticket; a pending
//! teardown can be cancelled, and shutdown cancels all of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use till_core::ids::TicketId;

use crate::render::RenderRequest;

/// Schedules and tracks pending ticket deletions.
#[derive(Debug, Clone)]
pub struct TicketTeardown {
    render_tx: broadcast::Sender<RenderRequest>,
    pending: Arc<Mutex<HashMap<TicketId, CancellationToken>>>,
}

impl TicketTeardown {
    /// Create a teardown scheduler emitting on the given render channel.
    pub fn new(render_tx: broadcast::Sender<RenderRequest>) -> Self {
        Self {
            render_tx,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedule deletion of a ticket after the grace period.
    ///
    /// Must be called from within a tokio runtime. Re-scheduling the
    /// same ticket replaces (and cancels) the earlier timer.
    pub fn schedule(&self, ticket: TicketId, grace: Duration) {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .pending
            .lock()
            .insert(ticket.clone(), token.clone())
        {
            previous.cancel();
        }

        let render_tx = self.render_tx.clone();
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(grace) => {
                    tracing::info!(ticket = %ticket, "ticket grace period elapsed, requesting deletion");
                    let _ = render_tx.send(RenderRequest::DeleteTicket {
                        ticket: ticket.clone(),
                    });
                }
                _ = token.cancelled() => {
                    tracing::debug!(ticket = %ticket, "ticket teardown cancelled");
                }
            }
            pending.lock().remove(&ticket);
        });
    }

    /// Cancel a pending teardown. Returns false if none was pending.
    pub fn cancel(&self, ticket: &TicketId) -> bool {
        match self.pending.lock().get(ticket) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending teardown.
    pub fn shutdown(&self) {
        for token in self.pending.lock().values() {
            token.cancel();
        }
    }

    /// Number of teardowns currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}
