//! `run` command implementation.

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agents::{Sanctuary, SanctuaryOptions};
use anyhow::{Context, Result};
use contracts::ParkBlueprint;
use observability::{AggregatorSink, SharedAggregator};
use oracle::{OracleBackend, OracleGateway, StubOracle};
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::{OracleKind, RunArgs};
use crate::pipeline::{read_reports, synthetic_reports, RunStats};

pub async fn run_sanctuary(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    if args.vet_trigger {
        blueprint.dispatch.vet_trigger = true;
    }
    if let Some(ref endpoint) = args.oracle_endpoint {
        info!(%endpoint, "Overriding oracle endpoint from CLI");
        blueprint.oracle.endpoint = Some(endpoint.clone());
    }

    info!(
        park = %blueprint.park.name,
        stations = blueprint.stations.len(),
        window_ms = blueprint.dispatch.window_ms,
        vet_trigger = blueprint.dispatch.vet_trigger,
        "Blueprint loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let reports = match &args.reports {
        Some(path) => read_reports(path)?,
        None => synthetic_reports(&blueprint, args.synthetic, args.seed),
    };

    let backend = build_backend(args.oracle, &blueprint)?;
    info!(oracle = backend.kind(), reports = reports.len(), "Launching sanctuary");
    let gateway = OracleGateway::from_settings(backend, &blueprint.oracle);

    let aggregator = SharedAggregator::default();
    let options = SanctuaryOptions {
        blackboard_file: args.blackboard_file.clone(),
        ..SanctuaryOptions::default()
    };
    let sink_queue = options.sink_queue;
    let sink = AggregatorSink::new(aggregator.clone());
    let sanctuary = Sanctuary::launch_with(Arc::new(blueprint), gateway, options, |bb| {
        bb.with_sink(sink, sink_queue)
    })
    .context("Failed to launch sanctuary")?;

    let registry = Arc::clone(sanctuary.registry());
    let submitted = Cell::new(0u64);
    let started = Instant::now();
    let feed = async {
        for report in reports {
            sanctuary.submit(report);
            submitted.set(submitted.get() + 1);
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
        tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
    };
    let timeout = async {
        match args.timeout {
            0 => std::future::pending::<()>().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };

    tokio::select! {
        _ = feed => {}
        _ = shutdown_signal() => warn!("Received shutdown signal, stopping sanctuary..."),
        _ = timeout => warn!(timeout_secs = args.timeout, "Run timeout reached"),
    }

    let blackboard = sanctuary.shutdown().await;
    let bus = registry.metrics().snapshot();

    let stats = RunStats {
        reports_submitted: submitted.get(),
        duration: started.elapsed(),
        blackboard,
        envelopes_published: bus.published,
        envelopes_undeliverable: bus.undeliverable,
        dispatch: aggregator.summary(),
    };
    stats.print_summary();

    info!("WildGuard finished");
    Ok(())
}

fn build_backend(kind: OracleKind, blueprint: &ParkBlueprint) -> Result<OracleBackend> {
    match kind {
        OracleKind::Stub => Ok(OracleBackend::Stub(StubOracle::new())),
        #[cfg(feature = "http-oracle")]
        OracleKind::Http => {
            let endpoint = blueprint
                .oracle
                .endpoint
                .as_deref()
                .context("--oracle http needs an endpoint (blueprint oracle.endpoint or --oracle-endpoint)")?;
            Ok(OracleBackend::Http(oracle::HttpOracle::new(endpoint)))
        }
        #[cfg(not(feature = "http-oracle"))]
        OracleKind::Http => {
            let _ = blueprint;
            anyhow::bail!("this build has no HTTP oracle; rebuild with --features http-oracle")
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
