//! Vet - accepts or declines treatment and frees the station afterwards
//!
//! An accepted case holds a clinic slot for the simulated treatment time,
//! then sends `resolve` to the dispatched station. A declined case frees
//! the station at once.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bus::ActorContext;
use contracts::{
    names, DispatchSettings, Inform, LogEvent, Payload, ReasoningOracle, TreatmentDecision,
    TreatmentRequest,
};
use oracle::OracleGateway;
use serde_json::json;
use tracing::{debug, info, instrument};

pub struct Vet<O> {
    ctx: ActorContext,
    gateway: OracleGateway<O>,
    settings: DispatchSettings,
    active_cases: Arc<AtomicU32>,
}

impl<O> Vet<O>
where
    O: ReasoningOracle + Send + Sync + 'static,
{
    pub fn new(ctx: ActorContext, gateway: OracleGateway<O>, settings: DispatchSettings) -> Self {
        Self {
            ctx,
            gateway,
            settings,
            active_cases: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn active_cases(&self) -> u32 {
        self.active_cases.load(Ordering::Relaxed)
    }

    #[instrument(
        name = "vet_evaluate",
        skip(self, request),
        fields(incident_id = %request.incident_id, station = %request.station_name)
    )]
    pub async fn evaluate(&self, request: TreatmentRequest) -> TreatmentDecision {
        let context = json!({
            "request": &request,
            "active_cases": self.active_cases(),
        });
        let decision = self.gateway.decide::<TreatmentDecision>(&context).await;
        let from_fallback = decision.is_fallback();
        let decision = decision.into_inner();

        info!(
            accepted = decision.is_accepted(),
            minutes = decision.expected_treatment_time,
            reason = %decision.reason,
            fallback = from_fallback,
            "Treatment decision"
        );

        if decision.is_accepted() {
            self.start_treatment(&request, decision.expected_treatment_time);
        } else {
            debug!("Treatment declined, releasing station");
            self.ctx.send(
                &request.station_name,
                Payload::Resolve {
                    incident_id: request.incident_id.clone(),
                },
            );
        }

        self.ctx.send(
            names::COORDINATOR,
            Payload::Inform(Inform::Treatment {
                incident_id: request.incident_id.clone(),
                decision: decision.clone(),
            }),
        );
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::TreatmentDecision {
                incident_id: request.incident_id,
                decision: decision.clone(),
            }),
        );
        decision
    }

    fn start_treatment(&self, request: &TreatmentRequest, minutes: u32) {
        self.active_cases.fetch_add(1, Ordering::Relaxed);

        let duration = self.settings.treatment_duration(minutes);
        let active_cases = Arc::clone(&self.active_cases);
        let outbox = self.ctx.outbox();
        let shutdown = self.ctx.shutdown_token().clone();
        let station = request.station_name.clone();
        let incident_id = request.incident_id.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(duration) => {}
            }
            active_cases.fetch_sub(1, Ordering::Relaxed);
            debug!(%station, %incident_id, "Treatment finished, releasing station");
            outbox.send(&station, Payload::Resolve { incident_id });
        });
    }

    pub async fn run(self) {
        debug!(actor = %self.ctx.name(), "Vet ready");
        while let Some(envelope) = self.ctx.receive().await {
            let from = envelope.from().clone();
            match envelope.into_payload() {
                Payload::Inform(Inform::TreatmentRequest(request)) => {
                    if self.ctx.until_shutdown(self.evaluate(request)).await.is_none() {
                        debug!(actor = %self.ctx.name(), "Shutdown interrupted handler");
                        break;
                    }
                }
                other => debug!(%from, performative = %other.performative(), "Ignored"),
            }
        }
    }
}
