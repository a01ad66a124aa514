//! Park fixture: real responder tasks plus stand-in mailboxes

use std::sync::Arc;

use bus::{ActorContext, CancellationToken, Outbox, Registry};
use contracts::{
    names, ActorName, ContractError, DispatchOrder, Envelope, GeoPoint, Incident, OracleRole,
    ParkBlueprint, Payload, ReasoningOracle, Severity, StationConfig,
};
use dispatcher::geo::EARTH_RADIUS_KM;
use dispatcher::{Coordinator, ResponderUnit};
use tokio::task::JoinHandle;

pub(crate) struct Park {
    pub blueprint: Arc<ParkBlueprint>,
    pub registry: Arc<Registry>,
    pub token: CancellationToken,
    pub communication: ActorContext,
    pub blackboard: ActorContext,
    pub station_names: Vec<ActorName>,
    coordinator: Option<ActorContext>,
    control: Outbox,
    tasks: Vec<JoinHandle<()>>,
}

impl Park {
    /// Bundled park with its stations replaced by `Station{i}`, each
    /// `distances[i]` km due north of the park centre and fully equipped
    pub fn with_distances(distances: &[f64]) -> Self {
        let mut bp = config_loader::ConfigLoader::builtin().unwrap();
        let center = bp.park.center;
        let equipment = vec![
            bp.capability.first_aid_item.clone(),
            bp.capability.capture_item.clone(),
            "radio".to_string(),
        ];
        bp.stations = distances
            .iter()
            .enumerate()
            .map(|(i, km)| StationConfig {
                name: format!("Station{i}"),
                vehicles: vec!["4x4_Patrol".to_string()],
                staff_count: 4,
                equipment: equipment.clone(),
                description: String::new(),
                location: GeoPoint::new(center.lat + (km / EARTH_RADIUS_KM).to_degrees(), center.lon),
            })
            .collect();
        let blueprint = Arc::new(bp);

        let registry = Registry::new();
        let token = CancellationToken::new();
        let coordinator = registry.join(names::COORDINATOR, token.clone());
        let communication = registry.join(names::COMMUNICATION, token.clone());
        let blackboard = registry.join(names::BLACKBOARD, token.clone());

        let mut station_names = Vec::new();
        let mut tasks = Vec::new();
        for station in &blueprint.stations {
            let unit = ResponderUnit::new(
                registry.join(&station.name, token.clone()),
                station.clone(),
                Arc::clone(&blueprint),
            );
            station_names.push(unit.name().clone());
            tasks.push(tokio::spawn(unit.run()));
        }

        Self {
            control: registry.outbox(names::COORDINATOR),
            blueprint,
            registry,
            token,
            communication,
            blackboard,
            station_names,
            coordinator: Some(coordinator),
            tasks,
        }
    }

    /// Coordinator over every fixture station; callable once
    pub fn coordinator(&mut self) -> Coordinator {
        let ctx = self.coordinator.take().expect("coordinator already taken");
        Coordinator::new(ctx, self.station_names.clone(), self.blueprint.dispatch.clone())
    }

    /// Commit `station` to `incident_id` as the coordinator would
    pub fn commit(&self, station: &ActorName, incident_id: &str) {
        let order = DispatchOrder {
            incident_id: incident_id.into(),
            station_name: station.clone(),
            distance_km: 1.0,
            eta_minutes: 10.0,
            vehicle: "4x4_Patrol".to_string(),
            terrain: self.blueprint.default_terrain.clone(),
            reasoning: String::new(),
            all_options: Vec::new(),
        };
        self.control.send(station, Payload::CommitOrder(order));
    }

    pub fn resolve(&self, station: &ActorName, incident_id: &str) {
        self.control.send(station, resolve(incident_id));
    }

    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            task.await.unwrap();
        }
    }
}

/// Low-severity deer at the park centre: no equipment gate
pub(crate) fn incident_at(bp: &ParkBlueprint, id: &str, severity: Severity) -> Incident {
    Incident {
        id: id.into(),
        species: "deer".to_string(),
        gps: bp.park.center,
        observed_behavior: "limping".to_string(),
        injury_severity: severity,
        reporter_reliability: 0.9,
        access_difficulty: "open".to_string(),
        priority: 3,
        timestamp: None,
    }
}

pub(crate) fn resolve(incident_id: &str) -> Payload {
    Payload::Resolve {
        incident_id: incident_id.into(),
    }
}

/// Everything queued in `ctx` right now
pub(crate) fn drain(ctx: &ActorContext) -> Vec<Envelope> {
    std::iter::from_fn(|| ctx.try_receive()).collect()
}

/// Oracle that never answers
pub(crate) struct HangingOracle;

impl ReasoningOracle for HangingOracle {
    async fn run(
        &self,
        _role: OracleRole,
        _prompt: &str,
        _context: &serde_json::Value,
    ) -> Result<serde_json::Value, ContractError> {
        std::future::pending().await
    }
}
