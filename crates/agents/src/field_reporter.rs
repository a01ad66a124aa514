//! FieldReporter - turns raw sighting reports into incidents

use bus::ActorContext;
use chrono::Utc;
use contracts::{
    names, Incident, IncidentDraft, Inform, LogEvent, Payload, RawReport, ReasoningOracle,
};
use oracle::OracleGateway;
use serde_json::json;
use tracing::{debug, info, instrument};

pub struct FieldReporter<O> {
    ctx: ActorContext,
    gateway: OracleGateway<O>,
}

impl<O> FieldReporter<O>
where
    O: ReasoningOracle + Send + Sync + 'static,
{
    pub fn new(ctx: ActorContext, gateway: OracleGateway<O>) -> Self {
        Self { ctx, gateway }
    }

    /// Normalize `report` and advertise the incident
    ///
    /// The coordinator gets the `event`, triage gets the incident, and the
    /// blackboard gets a record.
    #[instrument(name = "field_report", skip(self, report))]
    pub async fn ingest(&self, report: RawReport) -> Incident {
        let context = json!({ "report": &report });
        let decision = self.gateway.decide::<IncidentDraft>(&context).await;
        let from_fallback = decision.is_fallback();

        let mut draft = decision.into_inner();
        if from_fallback {
            draft.gps = report.gps;
            draft.reporter_reliability = report.reporter.reliability;
        }
        let incident = draft.into_incident(Utc::now());

        info!(
            incident_id = %incident.id,
            species = %incident.species,
            severity = %incident.injury_severity,
            priority = incident.priority,
            fallback = from_fallback,
            "Incident reported"
        );

        self.ctx.send(
            names::COORDINATOR,
            Payload::Event {
                incident: incident.clone(),
            },
        );
        self.ctx.send(
            names::TRIAGE,
            Payload::Inform(Inform::Incident(incident.clone())),
        );
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::IncidentAdvertised {
                incident: incident.clone(),
            }),
        );
        incident
    }

    pub async fn run(self) {
        debug!(actor = %self.ctx.name(), "FieldReporter ready");
        while let Some(envelope) = self.ctx.receive().await {
            let from = envelope.from().clone();
            match envelope.into_payload() {
                Payload::Inform(Inform::Report(report)) => {
                    if self.ctx.until_shutdown(self.ingest(report)).await.is_none() {
                        debug!(actor = %self.ctx.name(), "Shutdown interrupted handler");
                        break;
                    }
                }
                other => debug!(%from, performative = %other.performative(), "Ignored"),
            }
        }
    }
}
