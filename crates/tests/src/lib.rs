//! # Integration Tests
//!
//! End-to-end scenarios across crates:
//! - contract snapshot checks
//! - dispatch rounds over real responders and stand-in mailboxes
//! - a full sanctuary run with the stub oracle

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod contract_tests {
    use contracts::{Envelope, Payload, Recipient};

    #[test]
    fn test_bundled_blueprint_loads() {
        let bp = config_loader::ConfigLoader::builtin().unwrap();
        assert_eq!(bp.version, contracts::ConfigVersion::V1);
        assert!(!bp.stations.is_empty());
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::new(
            "Alpha".into(),
            Recipient::parse("CoordinatorAgent"),
            Payload::Resolve {
                incident_id: "INC-1".into(),
            },
        );
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["from"], "Alpha");
        assert_eq!(value["to"], "CoordinatorAgent");
        assert_eq!(value["payload"]["performative"], "resolve");
    }
}

#[cfg(test)]
mod bus_tests {
    use bus::{CancellationToken, Registry};
    use contracts::{Payload, Recipient};

    use crate::fixtures::resolve;

    #[tokio::test]
    async fn test_broadcast_reaches_every_mailbox_once() {
        let registry = Registry::new();
        let token = CancellationToken::new();
        let actors: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|n| registry.join(*n, token.clone()))
            .collect();

        actors[0].send(Recipient::Broadcast, resolve("INC-1"));

        for actor in &actors {
            assert!(actor.try_receive().is_some(), "{} missed the broadcast", actor.name());
            assert!(actor.try_receive().is_none(), "{} got it twice", actor.name());
        }
        assert_eq!(registry.metrics().snapshot().delivered, 3);
    }

    #[tokio::test]
    async fn test_mailbox_is_fifo_per_receiver() {
        let registry = Registry::new();
        let token = CancellationToken::new();
        let receiver = registry.join("R", token.clone());
        let sender = registry.outbox("S");

        for i in 0..5 {
            sender.send("R", resolve(&format!("INC-{i}")));
        }

        for i in 0..5 {
            let envelope = receiver.receive().await.unwrap();
            match envelope.payload() {
                Payload::Resolve { incident_id } => assert_eq!(incident_id.as_str(), format!("INC-{i}")),
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_counted_not_raised() {
        let registry = Registry::new();
        registry.outbox("S").send("Nobody", resolve("INC-1"));
        assert_eq!(registry.metrics().snapshot().undeliverable, 1);
    }
}

#[cfg(test)]
mod dispatch_tests {
    use std::time::Duration;

    use contracts::{names, EscalationReason, Inform, LogEvent, Payload, Severity};
    use dispatcher::{Coordinator, RoundOutcome};

    use crate::fixtures::{drain, incident_at, Park};

    #[tokio::test(start_paused = true)]
    async fn test_nearest_available_station_is_dispatched() {
        let mut park = Park::with_distances(&[5.0, 2.0, 8.0]);
        let mut coordinator = park.coordinator();

        let outcome = coordinator.run_round(incident_at(&park.blueprint, "INC-1", Severity::Low)).await;

        match outcome {
            RoundOutcome::Dispatched {
                station,
                distance_km,
                ..
            } => {
                assert_eq!(station.as_str(), "Station1");
                assert!((distance_km - 2.0).abs() < 0.01);
            }
            other => panic!("expected dispatch, got {other:?}"),
        }

        let notices = drain(&park.communication);
        assert_eq!(notices.len(), 1);
        match notices[0].payload() {
            Payload::Inform(Inform::Dispatch(notice)) => {
                assert_eq!(notice.order.all_options.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        park.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_busy_escalates_once_without_commit() {
        let mut park = Park::with_distances(&[3.0, 4.0]);
        for station in &park.station_names {
            park.commit(station, "INC-OLD");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut coordinator = park.coordinator();
        let outcome = coordinator.run_round(incident_at(&park.blueprint, "INC-2", Severity::Low)).await;
        assert_eq!(outcome, RoundOutcome::Escalated(EscalationReason::AllUnavailable));

        let comms = drain(&park.communication);
        assert_eq!(comms.len(), 1);
        assert!(matches!(comms[0].payload(), Payload::Escalate(n) if n.answers.len() == 2));

        let logs = drain(&park.blackboard);
        assert!(!logs
            .iter()
            .any(|e| matches!(e.payload(), Payload::Log(LogEvent::DispatchOrder { .. }))));
        park.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_responders_escalates_no_response() {
        let mut park = Park::with_distances(&[]);
        let mut coordinator = park.coordinator();

        let outcome = coordinator.run_round(incident_at(&park.blueprint, "INC-3", Severity::High)).await;
        assert_eq!(outcome, RoundOutcome::Escalated(EscalationReason::NoResponse));

        let comms = drain(&park.communication);
        assert_eq!(comms.len(), 1);
        assert!(matches!(
            comms[0].payload(),
            Payload::Escalate(n) if n.reason == EscalationReason::NoResponse
        ));
        let logs = drain(&park.blackboard);
        assert!(logs
            .iter()
            .any(|e| matches!(e.payload(), Payload::Log(LogEvent::NoResponses { .. }))));
        park.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_then_resolve_returns_station_to_service() {
        let mut park = Park::with_distances(&[1.0]);
        let station = park.station_names[0].clone();

        park.commit(&station, "INC-4");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut coordinator = park.coordinator();
        let busy = coordinator.run_round(incident_at(&park.blueprint, "INC-5", Severity::Low)).await;
        assert_eq!(busy, RoundOutcome::Escalated(EscalationReason::AllUnavailable));

        park.resolve(&station, "INC-4");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let free = coordinator.run_round(incident_at(&park.blueprint, "INC-6", Severity::Low)).await;
        assert!(matches!(free, RoundOutcome::Dispatched { .. }));
        park.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_coordinator_loop_handles_queued_events_in_order() {
        let mut park = Park::with_distances(&[2.0, 6.0]);
        let coordinator = park.coordinator();
        let task = tokio::spawn(coordinator.run());

        let intake = park.registry.outbox(names::FIELD_REPORTER);
        for id in ["INC-A", "INC-B"] {
            intake.send(
                names::COORDINATOR,
                Payload::Event {
                    incident: incident_at(&park.blueprint, id, Severity::Low),
                },
            );
        }

        // Both windows close and the first dispatch is acknowledged
        tokio::time::sleep(park.blueprint.dispatch.window() * 3).await;

        let order: Vec<_> = drain(&park.communication)
            .into_iter()
            .map(|e| match e.into_payload() {
                Payload::Inform(Inform::Dispatch(n)) => (n.incident.id.to_string(), "dispatch"),
                Payload::Escalate(n) => (n.incident_id.to_string(), n.reason.as_str()),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("INC-A".to_string(), "dispatch"),
                ("INC-B".to_string(), "dispatch"),
            ]
        );

        let logs = drain(&park.blackboard);
        let acks = logs
            .iter()
            .filter(|e| matches!(e.payload(), Payload::Log(LogEvent::DispatchAcknowledged { .. })))
            .count();
        assert_eq!(acks, 2);

        park.token.cancel();
        task.await.unwrap();
        park.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_waits_for_full_window() {
        let mut park = Park::with_distances(&[2.0]);
        let mut coordinator = park.coordinator();
        let started = tokio::time::Instant::now();

        coordinator.run_round(incident_at(&park.blueprint, "INC-7", Severity::Low)).await;

        // Early answers never close the window
        assert_eq!(started.elapsed(), park.blueprint.dispatch.window());
        park.shutdown().await;
    }
}

#[cfg(test)]
mod oracle_tests {
    use std::time::Duration;

    use contracts::{RoleContract, Severity, TriageSummary};
    use oracle::{OracleGateway, RoleTable};

    use crate::fixtures::HangingOracle;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_fallback_without_blocking() {
        let gateway = OracleGateway::new(HangingOracle, RoleTable::new(), Duration::from_millis(500));
        let started = tokio::time::Instant::now();

        let decision = gateway
            .decide::<TriageSummary>(&serde_json::json!({ "incident": { "id": "INC-1" } }))
            .await;

        assert!(decision.is_fallback());
        assert_eq!(decision.get(), &TriageSummary::builtin_fallback());
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_triage_keeps_working_when_oracle_hangs() {
        let registry = bus::Registry::new();
        let token = bus::CancellationToken::new();
        let _coordinator = registry.join(contracts::names::COORDINATOR, token.clone());
        let _blackboard = registry.join(contracts::names::BLACKBOARD, token.clone());
        let gateway = OracleGateway::new(HangingOracle, RoleTable::new(), Duration::from_millis(200));
        let triage = agents::Triage::new(registry.join(contracts::names::TRIAGE, token), gateway);

        let bp = config_loader::ConfigLoader::builtin().unwrap();
        let mut inc = crate::fixtures::incident_at(&bp, "INC-9", Severity::High);
        inc.priority = 9;
        let summary = triage.assess(&inc).await;

        assert_eq!(summary.incident_id.as_str(), "INC-9");
        assert_eq!(summary.priority, 5);
    }
}

#[cfg(test)]
mod sanctuary_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use agents::{Sanctuary, SanctuaryOptions};
    use contracts::{
        ContractError, EventSink, GeoPoint, LogEvent, LogRecord, RawReport, ReporterInfo,
    };
    use observability::{AggregatorSink, SharedAggregator};
    use oracle::{OracleGateway, StubOracle};
    use tokio::time::Instant;

    use crate::fixtures::HangingOracle;

    /// Keeps every record the blackboard hands out
    #[derive(Clone, Default)]
    struct RecordingSink {
        records: Arc<Mutex<Vec<LogRecord>>>,
    }

    impl RecordingSink {
        fn resolved(&self) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| matches!(r.event, LogEvent::StationResolved { .. }))
                .count()
        }
    }

    impl EventSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn write(&mut self, record: &LogRecord) -> Result<(), ContractError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn elephant_report(gps: GeoPoint) -> RawReport {
        RawReport {
            text: "Elephant limping near the waterhole".to_string(),
            gps,
            reporter: ReporterInfo {
                kind: "ranger".to_string(),
                reliability: 0.9,
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_run_dispatches_and_treats() {
        let mut bp = config_loader::ConfigLoader::builtin().unwrap();
        bp.dispatch.vet_trigger = true;
        let bp = Arc::new(bp);
        let gateway = OracleGateway::from_settings(StubOracle::new(), &bp.oracle);

        let aggregator = SharedAggregator::default();
        let recorder = RecordingSink::default();
        let sink = AggregatorSink::new(aggregator.clone());
        let sanctuary = Sanctuary::launch_with(
            Arc::clone(&bp),
            gateway,
            SanctuaryOptions::default(),
            |blackboard| blackboard.with_sink(sink, 64).with_sink(recorder.clone(), 64),
        )
        .unwrap();
        let center = bp.park.center;
        let spot = GeoPoint::new(center.lat + 0.01, center.lon);
        // Medium severity: 30 minutes at 100ms per minute, well inside this wait
        let settle = bp.dispatch.window() + Duration::from_secs(30);

        sanctuary.submit(elephant_report(spot));
        tokio::time::sleep(settle).await;

        let first = aggregator.summary();
        assert_eq!(first.incidents, 1);
        assert_eq!(first.dispatches, 1);
        assert_eq!(first.no_response + first.all_unavailable, 0);
        assert_eq!(recorder.resolved(), 1);

        // The treated station is back in service for a second sighting
        sanctuary.submit(elephant_report(spot));
        tokio::time::sleep(settle).await;
        let stats = sanctuary.shutdown().await;

        assert_eq!(stats.incidents, 2);
        assert_eq!(stats.triage, 2);
        assert_eq!(stats.dispatches, 2);
        assert_eq!(stats.escalations, 0);
        assert_eq!(stats.acknowledgements, 2);
        assert_eq!(stats.treatments, 2);
        assert_eq!(stats.communications, 2);
        assert_eq!(stats.misrouted, 0);
        assert_eq!(recorder.resolved(), 2);

        let summary = aggregator.summary();
        assert_eq!(summary.incidents, 2);
        assert_eq!(summary.dispatches, 2);
        assert_eq!(summary.per_station.len(), 1);
        assert_eq!(summary.per_station.values().sum::<u64>(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_does_not_wait_for_hanging_oracle() {
        let bp = Arc::new(config_loader::ConfigLoader::builtin().unwrap());
        assert_eq!(bp.oracle.timeout(), Duration::from_secs(90));
        let gateway = OracleGateway::from_settings(HangingOracle, &bp.oracle);
        let sanctuary = Sanctuary::launch(Arc::clone(&bp), gateway, SanctuaryOptions::default()).unwrap();

        let center = bp.park.center;
        sanctuary.submit(elephant_report(GeoPoint::new(center.lat, center.lon)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let start = Instant::now();
        let stats = tokio::time::timeout(Duration::from_secs(5), sanctuary.shutdown())
            .await
            .expect("shutdown waited on the oracle");

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(stats.incidents, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_with_nothing_submitted() {
        let bp = Arc::new(config_loader::ConfigLoader::builtin().unwrap());
        let gateway = OracleGateway::from_settings(StubOracle::new(), &bp.oracle);
        let sanctuary = Sanctuary::launch(Arc::clone(&bp), gateway, SanctuaryOptions::default()).unwrap();

        assert_eq!(sanctuary.registry().len(), 6 + bp.stations.len());
        let stats = sanctuary.shutdown().await;
        assert_eq!(stats, contracts::BlackboardStats::default());
    }
}
