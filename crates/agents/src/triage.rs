//! Triage - priority and resource assessment per incident

use bus::ActorContext;
use contracts::{names, Incident, Inform, LogEvent, Payload, ReasoningOracle, TriageSummary};
use oracle::OracleGateway;
use serde_json::json;
use tracing::{debug, info, instrument};

pub struct Triage<O> {
    ctx: ActorContext,
    gateway: OracleGateway<O>,
}

impl<O> Triage<O>
where
    O: ReasoningOracle + Send + Sync + 'static,
{
    pub fn new(ctx: ActorContext, gateway: OracleGateway<O>) -> Self {
        Self { ctx, gateway }
    }

    #[instrument(name = "triage", skip(self, incident), fields(incident_id = %incident.id))]
    pub async fn assess(&self, incident: &Incident) -> TriageSummary {
        let context = json!({ "incident": incident });
        let decision = self.gateway.decide::<TriageSummary>(&context).await;
        let from_fallback = decision.is_fallback();

        let mut triage = decision.into_inner();
        // The summary is keyed by the incident it was asked about
        triage.incident_id = incident.id.clone();
        if from_fallback {
            triage.priority = incident.priority.clamp(1, 5);
            triage.access_difficulty = incident.access_difficulty.clone();
        }

        info!(
            priority = triage.priority,
            resources = ?triage.required_resources,
            fallback = from_fallback,
            "Triage complete"
        );

        self.ctx.send(
            names::COORDINATOR,
            Payload::Inform(Inform::Triage(triage.clone())),
        );
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::TriageSummary {
                triage: triage.clone(),
            }),
        );
        triage
    }

    pub async fn run(self) {
        debug!(actor = %self.ctx.name(), "Triage ready");
        while let Some(envelope) = self.ctx.receive().await {
            let from = envelope.from().clone();
            match envelope.into_payload() {
                Payload::Inform(Inform::Incident(incident)) => {
                    if self.ctx.until_shutdown(self.assess(&incident)).await.is_none() {
                        debug!(actor = %self.ctx.name(), "Shutdown interrupted handler");
                        break;
                    }
                }
                other => debug!(%from, performative = %other.performative(), "Ignored"),
            }
        }
    }
}
