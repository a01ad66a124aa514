//! Communication - public advisories for dispatches and escalations

use bus::ActorContext;
use contracts::{
    names, DispatchNotice, EscalationNotice, Inform, LogEvent, Payload, PublicMessage,
    ReasoningOracle,
};
use oracle::OracleGateway;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

pub struct Communication<O> {
    ctx: ActorContext,
    gateway: OracleGateway<O>,
}

impl<O> Communication<O>
where
    O: ReasoningOracle + Send + Sync + 'static,
{
    pub fn new(ctx: ActorContext, gateway: OracleGateway<O>) -> Self {
        Self { ctx, gateway }
    }

    #[instrument(name = "announce_dispatch", skip_all, fields(incident_id = %notice.incident.id))]
    pub async fn announce_dispatch(&self, notice: &DispatchNotice) -> PublicMessage {
        let context = json!({
            "incident": &notice.incident,
            "outcome": "dispatched",
            "station": &notice.order.station_name,
            "eta_minutes": notice.order.eta_minutes,
        });
        self.publish(context).await
    }

    #[instrument(name = "announce_escalation", skip_all, fields(incident_id = %notice.incident_id))]
    pub async fn announce_escalation(&self, notice: &EscalationNotice) -> PublicMessage {
        let context = json!({
            "incident": { "id": &notice.incident_id },
            "outcome": notice.reason.as_str(),
            "message": &notice.message,
        });
        self.publish(context).await
    }

    async fn publish(&self, context: Value) -> PublicMessage {
        let decision = self.gateway.decide::<PublicMessage>(&context).await;
        let from_fallback = decision.is_fallback();
        let message = decision.into_inner();

        info!(
            channels = ?message.channels,
            text = %message.message_text,
            fallback = from_fallback,
            "Public advisory issued"
        );
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::Communication {
                message: message.clone(),
            }),
        );
        message
    }

    pub async fn run(self) {
        debug!(actor = %self.ctx.name(), "Communication ready");
        while let Some(envelope) = self.ctx.receive().await {
            let from = envelope.from().clone();
            match envelope.into_payload() {
                Payload::Inform(Inform::Dispatch(notice)) => {
                    if self.ctx.until_shutdown(self.announce_dispatch(&notice)).await.is_none() {
                        debug!(actor = %self.ctx.name(), "Shutdown interrupted handler");
                        break;
                    }
                }
                Payload::Escalate(notice) => {
                    if self.ctx.until_shutdown(self.announce_escalation(&notice)).await.is_none() {
                        debug!(actor = %self.ctx.name(), "Shutdown interrupted handler");
                        break;
                    }
                }
                other => debug!(%from, performative = %other.performative(), "Ignored"),
            }
        }
    }
}
