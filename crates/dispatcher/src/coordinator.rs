//! Coordinator - per-incident dispatch protocol
//!
//! On `event`: query every responder, collect answers until the window
//! closes, then commit to the nearest eligible station or escalate.
//!
//! Envelopes that arrive during a round and are not answers for it are
//! handled inline when they need no round (triage, acks, stray answers) or
//! set aside and restored to the front of the mailbox, in arrival order,
//! when the round closes. A set-aside envelope is not looked at again until
//! the next receive.

use std::collections::HashMap;

use bus::{ActorContext, Received};
use contracts::{
    names, ActorName, DispatchNotice, DispatchOrder, DispatchSettings, Envelope, EnvelopeId,
    EscalationNotice, EscalationReason, Incident, IncidentId, Inform, LogEvent, ParkBlueprint,
    Payload, Performative, TreatmentRequest, TriageSummary,
};
use tracing::{debug, info, instrument, warn};

use crate::round::{IncidentRound, Phase, RoundOutcome};
use crate::select::select_responder;

pub struct Coordinator {
    ctx: ActorContext,
    responders: Vec<ActorName>,
    settings: DispatchSettings,
    /// Latest triage per incident, for the vet request
    triage: HashMap<IncidentId, TriageSummary>,
    /// How many rounds have set each envelope aside
    passes: HashMap<EnvelopeId, u32>,
    phase: Phase,
}

impl Coordinator {
    pub fn new(ctx: ActorContext, responders: Vec<ActorName>, settings: DispatchSettings) -> Self {
        Self {
            ctx,
            responders,
            settings,
            triage: HashMap::new(),
            passes: HashMap::new(),
            phase: Phase::Idle,
        }
    }

    /// Coordinator over every station in the blueprint
    pub fn from_blueprint(ctx: ActorContext, blueprint: &ParkBlueprint) -> Self {
        let responders = blueprint.stations.iter().map(|s| ActorName::from(&s.name)).collect();
        Self::new(ctx, responders, blueprint.dispatch.clone())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn responders(&self) -> &[ActorName] {
        &self.responders
    }

    pub fn cached_triage(&self, incident_id: &IncidentId) -> Option<&TriageSummary> {
        self.triage.get(incident_id)
    }

    /// Actor loop; returns on shutdown
    #[instrument(name = "coordinator_loop", skip(self))]
    pub async fn run(mut self) {
        info!(stations = ?self.responders, "Coordinator waiting for incidents");
        while let Some(envelope) = self.ctx.receive().await {
            self.handle(envelope).await;
        }
        debug!("Coordinator stopped");
    }

    /// Process one envelope while idle
    ///
    /// Returns the round outcome when the envelope was an `event`.
    pub async fn handle(&mut self, envelope: Envelope) -> Option<RoundOutcome> {
        let passes = self.passes.remove(&envelope.id()).unwrap_or(0);
        let envelope = self.handle_inline(envelope)?;

        let id = envelope.id();
        let from = envelope.from().clone();
        let performative = envelope.performative();
        match envelope.into_payload() {
            Payload::Event { incident } => Some(self.run_round(incident).await),
            _ => {
                self.report_misrouted(id, performative, &from, passes);
                None
            }
        }
    }

    /// Run one full round for `incident`
    #[instrument(
        name = "dispatch_round",
        skip(self, incident),
        fields(incident_id = %incident.id, species = %incident.species)
    )]
    pub async fn run_round(&mut self, incident: Incident) -> RoundOutcome {
        let mut round = IncidentRound::open(incident, self.settings.window());
        self.set_phase(Phase::Collecting);

        for station in &self.responders {
            self.ctx.send(
                station,
                Payload::QueryAvailability {
                    incident: round.incident.clone(),
                },
            );
        }
        debug!(responders = self.responders.len(), "Availability queries sent");

        let interrupted = self.collect(&mut round).await;
        self.restore_deferred(&mut round);

        let outcome = if interrupted {
            debug!("Shutdown during collection, round abandoned");
            RoundOutcome::Interrupted
        } else {
            self.set_phase(Phase::Deciding);
            self.decide(&round)
        };
        self.set_phase(Phase::Idle);

        metrics::counter!("wildguard_rounds_total", "outcome" => outcome.label()).increment(1);
        metrics::histogram!("wildguard_round_answers").record(round.answers.len() as f64);
        metrics::histogram!("wildguard_round_duration_ms")
            .record(round.started.elapsed().as_secs_f64() * 1000.0);

        outcome
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = self.phase.as_str(), to = phase.as_str(), "Phase change");
            self.phase = phase;
        }
    }

    /// Drain the mailbox until the deadline; true when interrupted by shutdown
    async fn collect(&mut self, round: &mut IncidentRound) -> bool {
        loop {
            match self.ctx.receive_until(round.deadline).await {
                Received::Envelope(envelope) => self.route_during_round(round, envelope),
                Received::TimedOut => return false,
                Received::Shutdown => return true,
            }
        }
    }

    fn route_during_round(&mut self, round: &mut IncidentRound, envelope: Envelope) {
        let passes = self.passes.remove(&envelope.id()).unwrap_or(0);

        match envelope.payload() {
            Payload::AvailabilityAnswer { incident_id, .. } if *incident_id == round.incident.id => {
                if let Payload::AvailabilityAnswer { answer, .. } = envelope.into_payload() {
                    debug!(
                        station = %answer.station_name,
                        distance_km = answer.distance_km,
                        available = answer.available,
                        capable = answer.capable,
                        "Answer collected"
                    );
                    round.answers.push(answer);
                }
                return;
            }
            Payload::Event { incident } if incident.id == round.incident.id => {
                debug!(incident_id = %incident.id, "Duplicate event for open round dropped");
                return;
            }
            _ => {}
        }

        if let Some(envelope) = self.handle_inline(envelope) {
            round.deferred.push((envelope, passes));
        }
    }

    /// Put set-aside envelopes back at the head of the mailbox
    ///
    /// Events always go back. Anything else that has been set aside more
    /// than `max_requeue_passes` times is reported as misrouted instead.
    fn restore_deferred(&mut self, round: &mut IncidentRound) {
        let mut restored = Vec::with_capacity(round.deferred.len());
        for (envelope, passes) in round.deferred.drain(..) {
            let passes = passes + 1;
            let bounded = envelope.performative() != Performative::Event;
            if bounded && passes > self.settings.max_requeue_passes {
                self.report_misrouted(
                    envelope.id(),
                    envelope.performative(),
                    envelope.from(),
                    passes,
                );
                continue;
            }
            self.passes.insert(envelope.id(), passes);
            restored.push(envelope);
        }

        if !restored.is_empty() {
            debug!(count = restored.len(), "Restoring deferred envelopes");
            metrics::counter!("wildguard_envelopes_requeued_total").increment(restored.len() as u64);
            self.ctx.requeue_front(restored);
        }
    }

    /// Handle envelopes that never need a round; gives back anything else
    fn handle_inline(&mut self, envelope: Envelope) -> Option<Envelope> {
        match envelope.payload() {
            Payload::Inform(Inform::Triage(_))
            | Payload::Inform(Inform::Treatment { .. })
            | Payload::CommitAck(_)
            | Payload::AvailabilityAnswer { .. } => {}
            _ => return Some(envelope),
        }

        match envelope.into_payload() {
            Payload::Inform(Inform::Triage(triage)) => {
                debug!(incident_id = %triage.incident_id, priority = triage.priority, "Triage cached");
                self.triage.insert(triage.incident_id.clone(), triage);
            }
            Payload::Inform(Inform::Treatment {
                incident_id,
                decision,
            }) => {
                info!(
                    %incident_id,
                    accepted = decision.is_accepted(),
                    minutes = decision.expected_treatment_time,
                    "Vet decision received"
                );
            }
            Payload::CommitAck(ack) => {
                info!(station = %ack.station_name, incident_id = %ack.incident_id, "Dispatch acknowledged");
                self.ctx.send(
                    names::BLACKBOARD,
                    Payload::Log(LogEvent::DispatchAcknowledged { ack }),
                );
            }
            Payload::AvailabilityAnswer {
                incident_id,
                answer,
            } => {
                debug!(
                    %incident_id,
                    station = %answer.station_name,
                    "Late answer outside its round dropped"
                );
            }
            _ => {}
        }
        None
    }

    fn decide(&mut self, round: &IncidentRound) -> RoundOutcome {
        let incident = &round.incident;

        if round.answers.is_empty() {
            warn!(incident_id = %incident.id, "No ranger stations responded");
            self.escalate(
                incident,
                EscalationReason::NoResponse,
                "No ranger stations responded. Escalating incident.".to_string(),
                Vec::new(),
            );
            self.ctx.send(
                names::BLACKBOARD,
                Payload::Log(LogEvent::NoResponses {
                    incident_id: incident.id.clone(),
                }),
            );
            return RoundOutcome::Escalated(EscalationReason::NoResponse);
        }

        let Some(selected) = select_responder(&round.answers) else {
            warn!(
                incident_id = %incident.id,
                responses = round.answers.len(),
                "All stations busy or incapable"
            );
            self.escalate(
                incident,
                EscalationReason::AllUnavailable,
                format!(
                    "All stations busy or unable to respond to {} incident. Monitoring situation.",
                    incident.species
                ),
                round.answers.clone(),
            );
            self.ctx.send(
                names::BLACKBOARD,
                Payload::Log(LogEvent::AllUnavailable {
                    incident_id: incident.id.clone(),
                    responses: round.answers.len(),
                }),
            );
            return RoundOutcome::Escalated(EscalationReason::AllUnavailable);
        };

        let order = DispatchOrder::from_selection(incident.id.clone(), selected, round.answers.clone());
        info!(
            station = %order.station_name,
            distance_km = order.distance_km,
            eta_minutes = order.eta_minutes,
            reasoning = %order.reasoning,
            "Station selected"
        );

        self.ctx.send(&order.station_name, Payload::CommitOrder(order.clone()));
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::DispatchOrder {
                order: order.clone(),
            }),
        );
        self.ctx.send(
            names::COMMUNICATION,
            Payload::Inform(Inform::Dispatch(DispatchNotice {
                incident: incident.clone(),
                order: order.clone(),
            })),
        );

        if self.settings.vet_trigger {
            self.request_treatment(incident, &order);
        }

        RoundOutcome::Dispatched {
            station: order.station_name,
            distance_km: order.distance_km,
            eta_minutes: order.eta_minutes,
        }
    }

    fn escalate(
        &self,
        incident: &Incident,
        reason: EscalationReason,
        message: String,
        answers: Vec<contracts::AvailabilityAnswer>,
    ) {
        self.ctx.send(
            names::COMMUNICATION,
            Payload::Escalate(EscalationNotice {
                incident_id: incident.id.clone(),
                reason,
                message,
                answers,
            }),
        );
    }

    fn request_treatment(&self, incident: &Incident, order: &DispatchOrder) {
        let request = TreatmentRequest {
            incident_id: incident.id.clone(),
            station_name: order.station_name.clone(),
            location: incident.gps,
            species: incident.species.clone(),
            injury_severity: incident.injury_severity,
            triage: self.triage.get(&incident.id).cloned(),
            eta_minutes: order.eta_minutes,
        };
        debug!(incident_id = %incident.id, has_triage = request.triage.is_some(), "Requesting treatment");
        self.ctx.send(
            names::VET,
            Payload::Inform(Inform::TreatmentRequest(request.clone())),
        );
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::TreatmentRequested { request }),
        );
    }

    fn report_misrouted(
        &self,
        envelope_id: EnvelopeId,
        performative: Performative,
        from: &ActorName,
        passes: u32,
    ) {
        warn!(%envelope_id, %performative, %from, passes, "Misrouted envelope dropped");
        metrics::counter!(
            "wildguard_envelopes_misrouted_total",
            "performative" => performative.as_str()
        )
        .increment(1);
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::Misrouted {
                envelope_id,
                performative,
                from: from.clone(),
                passes,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::incident;
    use bus::{CancellationToken, Registry};
    use contracts::{AvailabilityAnswer, RoleContract, Severity};
    use std::sync::Arc;
    use std::time::Duration;

    struct Mailboxes {
        registry: Arc<Registry>,
        token: CancellationToken,
        communication: ActorContext,
        blackboard: ActorContext,
        vet: ActorContext,
    }

    fn mailboxes() -> Mailboxes {
        let registry = Registry::new();
        let token = CancellationToken::new();
        Mailboxes {
            communication: registry.join(names::COMMUNICATION, token.clone()),
            blackboard: registry.join(names::BLACKBOARD, token.clone()),
            vet: registry.join(names::VET, token.clone()),
            registry,
            token,
        }
    }

    fn answer(name: &str, distance_km: f64, available: bool, capable: bool) -> AvailabilityAnswer {
        AvailabilityAnswer {
            station_name: name.into(),
            distance_km,
            terrain: "grassland".into(),
            eta_minutes: 5.0 + distance_km * 1.5,
            vehicle: "Jeep".into(),
            available,
            capable,
            confidence: 0.9,
            staff_available: 3,
            equipment: vec![],
            reasoning: format!("{name} at {distance_km}km"),
        }
    }

    /// Station that answers every query with a fixed answer and records commits
    fn spawn_scripted(
        p: &Mailboxes,
        name: &str,
        distance_km: f64,
        available: bool,
        capable: bool,
    ) -> tokio::task::JoinHandle<Vec<Envelope>> {
        let ctx = p.registry.join(name, p.token.clone());
        let scripted = answer(name, distance_km, available, capable);
        tokio::spawn(async move {
            let mut commits = Vec::new();
            while let Some(envelope) = ctx.receive().await {
                match envelope.payload() {
                    Payload::QueryAvailability { incident } => {
                        ctx.send(
                            envelope.from(),
                            Payload::AvailabilityAnswer {
                                incident_id: incident.id.clone(),
                                answer: scripted.clone(),
                            },
                        );
                    }
                    Payload::CommitOrder(_) => commits.push(envelope),
                    _ => {}
                }
            }
            commits
        })
    }

    fn coordinator(p: &Mailboxes, stations: &[&str], settings: DispatchSettings) -> Coordinator {
        Coordinator::new(
            p.registry.join(names::COORDINATOR, p.token.clone()),
            stations.iter().map(|s| ActorName::from(*s)).collect(),
            settings,
        )
    }

    fn drain(ctx: &ActorContext) -> Vec<Envelope> {
        std::iter::from_fn(|| ctx.try_receive()).collect()
    }

    fn deer(id: &str) -> Incident {
        let mut inc = incident("deer", Severity::Low, 6.3, 81.5);
        inc.id = id.into();
        inc
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_nearest_station() {
        let p = mailboxes();
        let a = spawn_scripted(&p, "A", 5.0, true, true);
        let b = spawn_scripted(&p, "B", 2.0, true, true);
        let c = spawn_scripted(&p, "C", 8.0, true, true);
        let mut coord = coordinator(&p, &["A", "B", "C"], DispatchSettings::default());

        let outcome = coord.run_round(deer("INC-1")).await;

        match &outcome {
            RoundOutcome::Dispatched { station, distance_km, .. } => {
                assert_eq!(station.as_str(), "B");
                assert_eq!(*distance_km, 2.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(coord.phase(), Phase::Idle);

        tokio::time::sleep(Duration::from_millis(10)).await;
        p.token.cancel();
        assert!(a.await.unwrap().is_empty());
        let b_commits = b.await.unwrap();
        assert_eq!(b_commits.len(), 1);
        assert!(c.await.unwrap().is_empty());
        match b_commits[0].payload() {
            Payload::CommitOrder(order) => assert_eq!(order.all_options.len(), 3),
            other => panic!("unexpected payload {other:?}"),
        }

        let comms = drain(&p.communication);
        assert_eq!(comms.len(), 1);
        assert!(matches!(
            comms[0].payload(),
            Payload::Inform(Inform::Dispatch(_))
        ));
        let logs = drain(&p.blackboard);
        assert!(logs
            .iter()
            .any(|e| matches!(e.payload(), Payload::Log(LogEvent::DispatchOrder { .. }))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_unavailable_escalates_once() {
        let p = mailboxes();
        let handles = [
            spawn_scripted(&p, "A", 1.0, false, false),
            spawn_scripted(&p, "B", 2.0, false, true),
        ];
        let mut coord = coordinator(&p, &["A", "B"], DispatchSettings::default());

        let outcome = coord.run_round(deer("INC-2")).await;
        assert_eq!(outcome, RoundOutcome::Escalated(EscalationReason::AllUnavailable));

        p.token.cancel();
        for h in handles {
            assert!(h.await.unwrap().is_empty());
        }
        let comms = drain(&p.communication);
        assert_eq!(comms.len(), 1);
        match comms[0].payload() {
            Payload::Escalate(notice) => {
                assert_eq!(notice.reason, EscalationReason::AllUnavailable);
                assert_eq!(notice.answers.len(), 2);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_answers_escalates_after_window() {
        let p = mailboxes();
        // Registered but silent
        let _silent = p.registry.join("A", p.token.clone());
        let mut coord = coordinator(&p, &["A"], DispatchSettings::default());

        let start = tokio::time::Instant::now();
        let outcome = coord.run_round(deer("INC-3")).await;

        assert_eq!(outcome, RoundOutcome::Escalated(EscalationReason::NoResponse));
        assert!(start.elapsed() >= Duration::from_millis(2000));
        let comms = drain(&p.communication);
        assert_eq!(comms.len(), 1);
        let logs = drain(&p.blackboard);
        assert!(matches!(
            logs[0].payload(),
            Payload::Log(LogEvent::NoResponses { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrelated_envelopes_restored_in_order() {
        let p = mailboxes();
        let _a = spawn_scripted(&p, "A", 1.0, true, true);
        let mut coord = coordinator(&p, &["A"], DispatchSettings::default());
        let reporter = p.registry.join(names::FIELD_REPORTER, p.token.clone());

        reporter.send(names::COORDINATOR, Payload::Event { incident: deer("INC-B") });
        reporter.send(
            names::COORDINATOR,
            Payload::Resolve {
                incident_id: "INC-X".into(),
            },
        );

        let outcome = coord.run_round(deer("INC-A")).await;
        assert!(matches!(outcome, RoundOutcome::Dispatched { .. }));

        let first = coord.ctx.try_receive().unwrap();
        let second = coord.ctx.try_receive().unwrap();
        assert_eq!(first.performative(), Performative::Event);
        assert_eq!(second.performative(), Performative::Resolve);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeatedly_deferred_envelope_is_misrouted() {
        let p = mailboxes();
        let _a = spawn_scripted(&p, "A", 1.0, true, true);
        let settings = DispatchSettings {
            max_requeue_passes: 1,
            ..DispatchSettings::default()
        };
        let mut coord = coordinator(&p, &["A"], settings);
        let reporter = p.registry.join(names::FIELD_REPORTER, p.token.clone());

        reporter.send(
            names::COORDINATOR,
            Payload::Resolve {
                incident_id: "INC-X".into(),
            },
        );
        coord.run_round(deer("INC-1")).await;
        assert_eq!(coord.ctx.pending(), 1);

        coord.run_round(deer("INC-2")).await;
        assert_eq!(coord.ctx.pending(), 0);

        let misrouted: Vec<_> = drain(&p.blackboard)
            .into_iter()
            .filter(|e| matches!(e.payload(), Payload::Log(LogEvent::Misrouted { .. })))
            .collect();
        assert_eq!(misrouted.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_triage_during_round_feeds_vet_request() {
        let p = mailboxes();
        let _a = spawn_scripted(&p, "A", 1.0, true, true);
        let settings = DispatchSettings {
            vet_trigger: true,
            ..DispatchSettings::default()
        };
        let mut coord = coordinator(&p, &["A"], settings);
        let triage_actor = p.registry.join(names::TRIAGE, p.token.clone());

        let triage = TriageSummary {
            incident_id: "INC-T".into(),
            priority: 5,
            ..TriageSummary::builtin_fallback()
        };
        triage_actor.send(names::COORDINATOR, Payload::Inform(Inform::Triage(triage)));

        coord.run_round(deer("INC-T")).await;

        assert_eq!(coord.cached_triage(&"INC-T".into()).map(|t| t.priority), Some(5));
        let vet = drain(&p.vet);
        assert_eq!(vet.len(), 1);
        match vet[0].payload() {
            Payload::Inform(Inform::TreatmentRequest(req)) => {
                assert_eq!(req.station_name.as_str(), "A");
                assert_eq!(req.triage.as_ref().map(|t| t.priority), Some(5));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        // Triage was consumed inline, not deferred
        assert_eq!(coord.ctx.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_event_dropped_during_round() {
        let p = mailboxes();
        let _a = spawn_scripted(&p, "A", 1.0, true, true);
        let mut coord = coordinator(&p, &["A"], DispatchSettings::default());
        let reporter = p.registry.join(names::FIELD_REPORTER, p.token.clone());

        reporter.send(names::COORDINATOR, Payload::Event { incident: deer("INC-D") });
        coord.run_round(deer("INC-D")).await;

        assert_eq!(coord.ctx.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_runs_round_for_event() {
        let p = mailboxes();
        let _a = spawn_scripted(&p, "A", 1.0, true, true);
        let mut coord = coordinator(&p, &["A"], DispatchSettings::default());

        let event = Envelope::new(
            names::FIELD_REPORTER.into(),
            names::COORDINATOR.into(),
            Payload::Event { incident: deer("INC-H") },
        );
        let outcome = coord.handle(event).await;
        assert!(matches!(outcome, Some(RoundOutcome::Dispatched { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ack_is_logged() {
        let p = mailboxes();
        let mut coord = coordinator(&p, &[], DispatchSettings::default());
        let ack = Envelope::new(
            "A".into(),
            names::COORDINATOR.into(),
            Payload::CommitAck(contracts::CommitAck {
                station_name: "A".into(),
                incident_id: "INC-1".into(),
                message: "en route".into(),
            }),
        );
        assert!(coord.handle(ack).await.is_none());
        let logs = drain(&p.blackboard);
        assert!(matches!(
            logs[0].payload(),
            Payload::Log(LogEvent::DispatchAcknowledged { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_round() {
        let p = mailboxes();
        let _silent = p.registry.join("A", p.token.clone());
        let mut coord = coordinator(&p, &["A"], DispatchSettings::default());

        let token = p.token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let outcome = coord.run_round(deer("INC-S")).await;
        assert_eq!(outcome, RoundOutcome::Interrupted);
        assert!(drain(&p.communication).is_empty());
    }
}
