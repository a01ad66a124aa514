//! Registry - process-wide name -> mailbox directory (the broker)

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{ActorName, Envelope, Recipient};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    context::{ActorContext, Outbox},
    mailbox::Mailbox,
    metrics::BusMetrics,
};

/// Mailbox registry
///
/// Registration and delivery take the directory lock for reading or writing;
/// appends are serialized per mailbox, so unrelated mailboxes never contend.
#[derive(Debug, Default)]
pub struct Registry {
    mailboxes: RwLock<HashMap<ActorName, Arc<Mailbox>>>,
    metrics: BusMetrics,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Associate `name` with `mailbox`; a prior association is replaced
    ///
    /// Returns the mailbox previously registered under that name, if any.
    pub fn register(
        &self,
        name: impl Into<ActorName>,
        mailbox: Arc<Mailbox>,
    ) -> Option<Arc<Mailbox>> {
        let name = name.into();
        let previous = self.mailboxes.write().insert(name.clone(), mailbox);
        if previous.is_some() {
            debug!(actor = %name, "Mailbox re-registered");
        } else {
            trace!(actor = %name, "Mailbox registered");
        }
        previous
    }

    /// Create a fresh mailbox under `name` and return the owning actor context
    pub fn join(
        self: &Arc<Self>,
        name: impl Into<ActorName>,
        shutdown: CancellationToken,
    ) -> ActorContext {
        let name = name.into();
        let mailbox = Arc::new(Mailbox::new());
        self.register(name.clone(), Arc::clone(&mailbox));
        ActorContext::new(name, mailbox, Arc::clone(self), shutdown)
    }

    /// Send-only handle for a producer that owns no mailbox
    pub fn outbox(self: &Arc<Self>, from: impl Into<ActorName>) -> Outbox {
        Outbox::new(from.into(), Arc::clone(self))
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.mailboxes.write().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mailboxes.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<ActorName> {
        let mut names: Vec<_> = self.mailboxes.read().keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    pub fn len(&self) -> usize {
        self.mailboxes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.read().is_empty()
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }

    /// Deliver an envelope
    ///
    /// Broadcast reaches every registered mailbox once (the sender's own
    /// included). An unknown recipient is counted and logged, never returned
    /// to the caller as an error.
    pub fn publish(&self, envelope: Envelope) {
        let performative = envelope.performative();
        self.metrics.inc_published();
        metrics::counter!(
            "wildguard_envelopes_published_total",
            "performative" => performative.as_str()
        )
        .increment(1);

        let mailboxes = self.mailboxes.read();
        match envelope.to().clone() {
            Recipient::Broadcast => {
                for mailbox in mailboxes.values() {
                    mailbox.push(envelope.clone());
                }
                self.metrics.add_delivered(mailboxes.len() as u64);
                trace!(
                    from = %envelope.from(),
                    %performative,
                    recipients = mailboxes.len(),
                    "Broadcast delivered"
                );
            }
            Recipient::Actor(name) => match mailboxes.get(&name) {
                Some(mailbox) => {
                    mailbox.push(envelope);
                    self.metrics.add_delivered(1);
                }
                None => {
                    self.metrics.inc_undeliverable();
                    metrics::counter!(
                        "wildguard_envelopes_undeliverable_total",
                        "performative" => performative.as_str()
                    )
                    .increment(1);
                    warn!(
                        from = %envelope.from(),
                        to = %name,
                        %performative,
                        envelope_id = %envelope.id(),
                        "Unknown recipient, envelope dropped"
                    );
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Payload;

    fn resolve(to: Recipient, id: &str) -> Envelope {
        Envelope::new(
            "sender".into(),
            to,
            Payload::Resolve {
                incident_id: id.into(),
            },
        )
    }

    #[test]
    fn test_point_to_point_delivery() {
        let registry = Registry::new();
        let a = Arc::new(Mailbox::new());
        let b = Arc::new(Mailbox::new());
        registry.register("A", Arc::clone(&a));
        registry.register("B", Arc::clone(&b));

        registry.publish(resolve("A".into(), "INC-1"));

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(registry.metrics().delivered(), 1);
    }

    #[test]
    fn test_broadcast_reaches_every_mailbox_once() {
        let registry = Registry::new();
        let boxes: Vec<_> = (0..4)
            .map(|i| {
                let mb = Arc::new(Mailbox::new());
                registry.register(format!("actor-{i}"), Arc::clone(&mb));
                mb
            })
            .collect();

        registry.publish(resolve(Recipient::Broadcast, "INC-1"));

        for mb in &boxes {
            assert_eq!(mb.len(), 1);
        }
        let snapshot = registry.metrics().snapshot();
        assert_eq!(snapshot.published, 1);
        assert_eq!(snapshot.delivered, 4);
    }

    #[test]
    fn test_unknown_recipient_is_counted_not_raised() {
        let registry = Registry::new();
        let a = Arc::new(Mailbox::new());
        registry.register("A", Arc::clone(&a));

        registry.publish(resolve("Nobody".into(), "INC-1"));

        assert!(a.is_empty());
        assert_eq!(registry.metrics().undeliverable(), 1);
    }

    #[test]
    fn test_reregistration_last_writer_wins() {
        let registry = Registry::new();
        let first = Arc::new(Mailbox::new());
        let second = Arc::new(Mailbox::new());
        assert!(registry.register("A", Arc::clone(&first)).is_none());
        assert!(registry.register("A", Arc::clone(&second)).is_some());

        registry.publish(resolve("A".into(), "INC-1"));

        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = Registry::new();
        registry.register("A", Arc::new(Mailbox::new()));
        assert!(registry.unregister("A"));
        assert!(!registry.contains("A"));
        assert!(!registry.unregister("A"));
    }

    #[test]
    fn test_outbox_signs_with_producer_name() {
        let registry = Registry::new();
        let a = registry.join("A", CancellationToken::new());
        let intake = registry.outbox("Intake");

        intake.send(
            "A",
            contracts::Payload::Resolve {
                incident_id: "INC-1".into(),
            },
        );

        let envelope = a.try_receive().unwrap();
        assert_eq!(envelope.from().as_str(), "Intake");
        assert!(!registry.contains("Intake"));
    }
}
