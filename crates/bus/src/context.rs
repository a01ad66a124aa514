//! ActorContext - one actor's view of the bus

use std::{future::Future, sync::Arc};

use contracts::{ActorName, Envelope, EnvelopeId, Payload, Recipient};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{mailbox::Mailbox, registry::Registry};

/// Result of a deadline-bounded receive
#[derive(Debug)]
pub enum Received {
    Envelope(Envelope),
    TimedOut,
    Shutdown,
}

/// Owning handle to one registered mailbox
///
/// Holds the actor's name, its mailbox, the shared registry and the
/// system-wide shutdown token.
#[derive(Debug)]
pub struct ActorContext {
    name: ActorName,
    mailbox: Arc<Mailbox>,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
}

impl ActorContext {
    pub(crate) fn new(
        name: ActorName,
        mailbox: Arc<Mailbox>,
        registry: Arc<Registry>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            name,
            mailbox,
            registry,
            shutdown,
        }
    }

    pub fn name(&self) -> &ActorName {
        &self.name
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Envelopes waiting in the own mailbox
    pub fn pending(&self) -> usize {
        self.mailbox.len()
    }

    /// Build an envelope from this actor and publish it
    pub fn send(&self, to: impl Into<Recipient>, payload: Payload) -> EnvelopeId {
        let envelope = Envelope::new(self.name.clone(), to.into(), payload);
        let id = envelope.id();
        self.registry.publish(envelope);
        id
    }

    /// Wait for the next envelope (FIFO)
    ///
    /// Returns `None` once shutdown is signalled.
    pub async fn receive(&self) -> Option<Envelope> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            envelope = self.mailbox.pop() => Some(envelope),
        }
    }

    /// Drive `work` to completion unless shutdown is signalled first
    ///
    /// Returns `None` when cancelled; `work` is dropped mid-flight.
    pub async fn until_shutdown<F: Future>(&self, work: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            output = work => Some(output),
        }
    }

    /// Next envelope if one is queued, without waiting
    pub fn try_receive(&self) -> Option<Envelope> {
        self.mailbox.try_pop()
    }

    /// Wait for the next envelope, giving up at `deadline`
    pub async fn receive_until(&self, deadline: Instant) -> Received {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Received::Shutdown,
            _ = tokio::time::sleep_until(deadline) => Received::TimedOut,
            envelope = self.mailbox.pop() => Received::Envelope(envelope),
        }
    }

    /// Return envelopes to the head of the own mailbox, keeping their order
    pub fn requeue_front(&self, envelopes: Vec<Envelope>) {
        self.mailbox.restore_front(envelopes);
    }

    /// Detached sender usable from spawned tasks
    pub fn outbox(&self) -> Outbox {
        Outbox::new(self.name.clone(), Arc::clone(&self.registry))
    }
}

/// Clonable send-only handle that signs envelopes with the actor's name
#[derive(Debug, Clone)]
pub struct Outbox {
    from: ActorName,
    registry: Arc<Registry>,
}

impl Outbox {
    pub(crate) fn new(from: ActorName, registry: Arc<Registry>) -> Self {
        Self { from, registry }
    }

    pub fn from_name(&self) -> &ActorName {
        &self.from
    }

    pub fn send(&self, to: impl Into<Recipient>, payload: Payload) -> EnvelopeId {
        let envelope = Envelope::new(self.from.clone(), to.into(), payload);
        let id = envelope.id();
        self.registry.publish(envelope);
        id
    }
}
