//! ResponderUnit - one ranger station on the bus
//!
//! Static capability data from the blueprint plus a busy flag that only
//! this actor mutates, in response to `commit-order` and `resolve`.

use std::sync::Arc;

use bus::ActorContext;
use contracts::{
    names, ActorName, AvailabilityAnswer, CommitAck, DispatchOrder, Envelope, Incident,
    IncidentId, LogEvent, ParkBlueprint, Payload, StationConfig,
};
use tracing::{debug, info, instrument};

use crate::{capability, geo};

/// Mutable part of a responder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponderState {
    pub busy: bool,
    pub current_incident: Option<IncidentId>,
}

pub struct ResponderUnit {
    ctx: ActorContext,
    station: StationConfig,
    blueprint: Arc<ParkBlueprint>,
    state: ResponderState,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl ResponderUnit {
    pub fn new(ctx: ActorContext, station: StationConfig, blueprint: Arc<ParkBlueprint>) -> Self {
        info!(
            station = %station.name,
            lat = station.location.lat,
            lon = station.location.lon,
            vehicles = ?station.vehicles,
            staff = station.staff_count,
            "Station initialized"
        );
        Self {
            ctx,
            station,
            blueprint,
            state: ResponderState::default(),
        }
    }

    pub fn name(&self) -> &ActorName {
        self.ctx.name()
    }

    pub fn state(&self) -> &ResponderState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    /// Compute this station's answer for `incident`
    pub fn assess(&self, incident: &Incident) -> AvailabilityAnswer {
        let bp = &self.blueprint;
        let distance = geo::haversine_km(self.station.location, incident.gps);
        let terrain = geo::classify_terrain(bp, incident.gps).to_string();
        let cap = capability::assess(bp, &self.station, incident, self.state.busy);
        let eta = geo::eta_minutes(bp, distance, &terrain, &cap.vehicle);

        AvailabilityAnswer {
            station_name: self.ctx.name().clone(),
            distance_km: round_to(distance, 2),
            reasoning: format!(
                "{} is {:.1}km away via {} terrain. ETA {:.0} min with {}.",
                self.station.name, distance, terrain, eta, cap.vehicle
            ),
            terrain,
            eta_minutes: round_to(eta, 1),
            vehicle: cap.vehicle,
            available: !self.state.busy,
            capable: cap.capable,
            confidence: cap.confidence,
            staff_available: self.station.staff_count,
            equipment: self.station.equipment.clone(),
        }
    }

    /// Process one envelope
    pub fn handle(&mut self, envelope: Envelope) {
        let from = envelope.from().clone();
        match envelope.into_payload() {
            Payload::QueryAvailability { incident } => self.on_query(&from, &incident),
            Payload::CommitOrder(order) => self.on_commit(&from, order),
            Payload::Resolve { incident_id } => self.on_resolve(incident_id),
            other => {
                debug!(
                    station = %self.station.name,
                    performative = %other.performative(),
                    %from,
                    "Ignoring envelope"
                );
            }
        }
    }

    fn on_query(&self, from: &ActorName, incident: &Incident) {
        let answer = self.assess(incident);
        debug!(
            station = %self.station.name,
            incident_id = %incident.id,
            distance_km = answer.distance_km,
            eta_minutes = answer.eta_minutes,
            available = answer.available,
            capable = answer.capable,
            "Answering availability query"
        );
        // Every query gets a reply; silence is never a capability signal.
        self.ctx.send(
            from,
            Payload::AvailabilityAnswer {
                incident_id: incident.id.clone(),
                answer,
            },
        );
    }

    fn on_commit(&mut self, from: &ActorName, order: DispatchOrder) {
        info!(
            station = %self.station.name,
            incident_id = %order.incident_id,
            vehicle = %order.vehicle,
            eta_minutes = order.eta_minutes,
            "Dispatched"
        );
        self.state.busy = true;
        self.state.current_incident = Some(order.incident_id.clone());

        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::StationEnRoute {
                station: self.ctx.name().clone(),
                incident_id: order.incident_id.clone(),
                vehicle: order.vehicle.clone(),
                eta_minutes: order.eta_minutes,
            }),
        );
        self.ctx.send(
            from,
            Payload::CommitAck(CommitAck {
                station_name: self.ctx.name().clone(),
                message: format!(
                    "{} team en route. ETA {} minutes.",
                    self.station.name, order.eta_minutes
                ),
                incident_id: order.incident_id,
            }),
        );
    }

    fn on_resolve(&mut self, incident_id: IncidentId) {
        if self.state.current_incident.as_ref() != Some(&incident_id) {
            debug!(
                station = %self.station.name,
                %incident_id,
                current = ?self.state.current_incident,
                "Stale resolve ignored"
            );
            return;
        }
        info!(station = %self.station.name, %incident_id, "Incident resolved, back in service");
        self.state = ResponderState::default();
        self.ctx.send(
            names::BLACKBOARD,
            Payload::Log(LogEvent::StationResolved {
                station: self.ctx.name().clone(),
                incident_id,
            }),
        );
    }

    /// Actor loop; returns on shutdown
    #[instrument(name = "responder_loop", skip(self), fields(station = %self.station.name))]
    pub async fn run(mut self) {
        while let Some(envelope) = self.ctx.receive().await {
            self.handle(envelope);
        }
        debug!(station = %self.station.name, "Responder stopped");
    }
}
