//! Sanctuary - wires every actor onto one registry and runs it
//!
//! All mailboxes are registered before any actor task starts, so nothing
//! sent during startup lands on an unknown name.

use std::path::PathBuf;
use std::sync::Arc;

use bus::{CancellationToken, Outbox, Registry};
use contracts::{
    names, BlackboardStats, ContractError, EnvelopeId, Inform, ParkBlueprint, Payload, RawReport,
    ReasoningOracle,
};
use dispatcher::{Coordinator, ResponderUnit};
use oracle::OracleGateway;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::blackboard::sinks::{FileSink, LogSink};
use crate::blackboard::{Blackboard, BlackboardStatsHandle, DEFAULT_SINK_QUEUE};
use crate::{Communication, FieldReporter, Triage, Vet};

/// Name that reports are signed with when submitted from outside
pub const INTAKE: &str = "ReportIntake";

#[derive(Debug, Clone)]
pub struct SanctuaryOptions {
    /// JSON-lines blackboard file, in addition to the log sink
    pub blackboard_file: Option<PathBuf>,
    pub sink_queue: usize,
}

impl Default for SanctuaryOptions {
    fn default() -> Self {
        Self {
            blackboard_file: None,
            sink_queue: DEFAULT_SINK_QUEUE,
        }
    }
}

/// Handle to a running system
pub struct Sanctuary {
    registry: Arc<Registry>,
    shutdown: CancellationToken,
    intake: Outbox,
    stats: BlackboardStatsHandle,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl Sanctuary {
    /// Register and spawn the coordinator, one responder per station and
    /// the collaborator actors
    ///
    /// # Errors
    /// Fails only when the blackboard file cannot be opened.
    pub fn launch<O>(
        blueprint: Arc<ParkBlueprint>,
        gateway: OracleGateway<O>,
        options: SanctuaryOptions,
    ) -> Result<Self, ContractError>
    where
        O: ReasoningOracle + Send + Sync + 'static,
    {
        Self::launch_with(blueprint, gateway, options, |blackboard| blackboard)
    }

    /// Like [`Sanctuary::launch`], letting the caller attach extra
    /// blackboard sinks before it starts
    #[instrument(name = "sanctuary_launch", skip_all, fields(park = %blueprint.park.name))]
    pub fn launch_with<O, F>(
        blueprint: Arc<ParkBlueprint>,
        gateway: OracleGateway<O>,
        options: SanctuaryOptions,
        configure: F,
    ) -> Result<Self, ContractError>
    where
        O: ReasoningOracle + Send + Sync + 'static,
        F: FnOnce(Blackboard) -> Blackboard,
    {
        let registry = Registry::new();
        let shutdown = CancellationToken::new();
        let join = |name: &str| registry.join(name, shutdown.clone());

        let mut blackboard =
            Blackboard::new(join(names::BLACKBOARD)).with_sink(LogSink::new("log"), options.sink_queue);
        if let Some(path) = &options.blackboard_file {
            let sink = FileSink::open("file", path)?;
            info!(path = %path.display(), "Blackboard file sink opened");
            blackboard = blackboard.with_sink(sink, options.sink_queue);
        }
        let blackboard = configure(blackboard);
        let stats = blackboard.stats_handle();

        let coordinator = Coordinator::from_blueprint(join(names::COORDINATOR), &blueprint);
        let responders: Vec<_> = blueprint
            .stations
            .iter()
            .map(|station| {
                ResponderUnit::new(join(&station.name), station.clone(), Arc::clone(&blueprint))
            })
            .collect();
        let field_reporter = FieldReporter::new(join(names::FIELD_REPORTER), gateway.clone());
        let triage = Triage::new(join(names::TRIAGE), gateway.clone());
        let vet = Vet::new(join(names::VET), gateway.clone(), blueprint.dispatch.clone());
        let communication = Communication::new(join(names::COMMUNICATION), gateway);

        let mut tasks = vec![
            (names::BLACKBOARD.to_string(), tokio::spawn(blackboard.run())),
            (names::COORDINATOR.to_string(), tokio::spawn(coordinator.run())),
            (names::FIELD_REPORTER.to_string(), tokio::spawn(field_reporter.run())),
            (names::TRIAGE.to_string(), tokio::spawn(triage.run())),
            (names::VET.to_string(), tokio::spawn(vet.run())),
            (names::COMMUNICATION.to_string(), tokio::spawn(communication.run())),
        ];
        for responder in responders {
            tasks.push((responder.name().to_string(), tokio::spawn(responder.run())));
        }

        info!(
            actors = registry.len(),
            stations = blueprint.stations.len(),
            "Sanctuary running"
        );

        Ok(Self {
            intake: registry.outbox(INTAKE),
            registry,
            shutdown,
            stats,
            tasks,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn stats(&self) -> BlackboardStatsHandle {
        self.stats.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Hand a raw report to the field reporter
    pub fn submit(&self, report: RawReport) -> EnvelopeId {
        self.intake
            .send(names::FIELD_REPORTER, Payload::Inform(Inform::Report(report)))
    }

    /// Stop every actor and return the final blackboard totals
    #[instrument(name = "sanctuary_shutdown", skip(self))]
    pub async fn shutdown(self) -> BlackboardStats {
        self.shutdown.cancel();
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!(actor = %name, error = ?e, "Actor task panicked");
            }
        }
        let stats = self.stats.snapshot();
        info!(?stats, "Sanctuary stopped");
        stats
    }
}
