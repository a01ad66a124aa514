//! Mailbox - ordered, unbounded envelope queue owned by one actor

use std::collections::VecDeque;

use contracts::Envelope;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// FIFO inbox
///
/// Inserts go through the [`crate::Registry`]; removal goes through the owning
/// [`crate::ActorContext`].
#[derive(Debug, Default)]
pub struct Mailbox {
    queue: Mutex<VecDeque<Envelope>>,
    notify: Notify,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued envelopes
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Append one envelope and wake the owner
    pub(crate) fn push(&self, envelope: Envelope) {
        self.queue.lock().push_back(envelope);
        self.notify.notify_one();
    }

    pub(crate) fn try_pop(&self) -> Option<Envelope> {
        self.queue.lock().pop_front()
    }

    /// Wait until an envelope is available, then remove the oldest one
    pub(crate) async fn pop(&self) -> Envelope {
        loop {
            // Register interest before checking so a push in between leaves a permit.
            let notified = self.notify.notified();
            if let Some(envelope) = self.try_pop() {
                return envelope;
            }
            notified.await;
        }
    }

    /// Put envelopes back at the head, keeping their relative order
    pub(crate) fn restore_front(&self, envelopes: Vec<Envelope>) {
        if envelopes.is_empty() {
            return;
        }
        let mut queue = self.queue.lock();
        for envelope in envelopes.into_iter().rev() {
            queue.push_front(envelope);
        }
        drop(queue);
        self.notify.notify_one();
    }
}
