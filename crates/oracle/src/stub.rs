//! StubOracle - deterministic offline answers
//!
//! Produces contract-shaped values from the context alone, so a full run
//! works without a reasoning service.

use contracts::{ContractError, OracleRole, ReasoningOracle, Severity};
use serde_json::{json, Value};

/// Keyword -> (behavior, severity); first match wins
const SEVERITY_KEYWORDS: &[(&str, Severity)] = &[
    ("unconscious", Severity::Critical),
    ("bleeding", Severity::Critical),
    ("collapsed", Severity::Critical),
    ("snare", Severity::High),
    ("trapped", Severity::High),
    ("injured", Severity::High),
    ("wound", Severity::High),
    ("limping", Severity::Medium),
    ("stranded", Severity::Medium),
];

/// Maximum concurrent treatments the stub vet accepts
const VET_CAPACITY: u64 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct StubOracle;

impl StubOracle {
    pub fn new() -> Self {
        Self
    }

    fn field_report(context: &Value) -> Value {
        let report = &context["report"];
        let text = report["text"].as_str().unwrap_or_default().to_lowercase();

        let species = text
            .split_whitespace()
            .next()
            .filter(|w| w.chars().all(char::is_alphabetic))
            .unwrap_or("unknown");

        let (behavior, severity) = SEVERITY_KEYWORDS
            .iter()
            .find(|(kw, _)| text.contains(kw))
            .map(|(kw, s)| (*kw, *s))
            .unwrap_or(("unknown", Severity::Low));

        let access = if text.contains("river") {
            "river"
        } else if text.contains("forest") {
            "dense_forest"
        } else {
            "open"
        };

        json!({
            "species": species,
            "gps": report["gps"],
            "observed_behavior": behavior,
            "injury_severity": severity,
            "reporter_reliability": report["reporter"]["reliability"].as_f64().unwrap_or(0.8),
            "access_difficulty": access,
            "priority": severity_priority(severity),
        })
    }

    fn triage(context: &Value) -> Value {
        let incident = &context["incident"];
        let severity: Severity =
            serde_json::from_value(incident["injury_severity"].clone()).unwrap_or_default();

        let mut resources = vec!["ranger_unit"];
        let mut actions = vec!["Secure perimeter", "Monitor from safe distance"];
        if matches!(severity, Severity::High | Severity::Critical) {
            resources.push("veterinary_team");
            actions.insert(0, "Stabilize animal");
        }

        json!({
            "incident_id": incident["id"],
            "priority": incident["priority"].as_u64().unwrap_or(3).clamp(1, 5),
            "required_resources": resources,
            "access_difficulty": incident["access_difficulty"].as_str().unwrap_or("open"),
            "recommended_actions": actions,
        })
    }

    fn vet(context: &Value) -> Value {
        let active = context["active_cases"].as_u64().unwrap_or(0);
        if active >= VET_CAPACITY {
            return json!({
                "decision": "decline",
                "reason": format!("clinic at capacity ({active} active cases)"),
                "expected_treatment_time": 0,
            });
        }
        let severity: Severity =
            serde_json::from_value(context["request"]["injury_severity"].clone())
                .unwrap_or_default();
        let minutes = match severity {
            Severity::Critical => 90,
            Severity::High => 60,
            Severity::Medium => 30,
            Severity::Low => 15,
        };
        json!({
            "decision": "accept",
            "reason": "stub: capacity available",
            "expected_treatment_time": minutes,
        })
    }

    fn communication(context: &Value) -> Value {
        let species = context["incident"]["species"].as_str().unwrap_or("wildlife");
        let text = match context["outcome"].as_str() {
            Some("dispatched") => format!(
                "WildGuard advisory: A response team from {} is on the way to a {} incident (ETA {} min). Keep distance from the area.",
                context["station"].as_str().unwrap_or("a nearby station"),
                species,
                context["eta_minutes"].as_f64().unwrap_or_default().round(),
            ),
            Some(_) => format!(
                "WildGuard advisory: A {species} incident is awaiting response. Avoid the area and report sightings to park staff."
            ),
            None => "WildGuard advisory: Keep distance from wildlife. Team is responding.".to_string(),
        };
        json!({
            "message_text": text,
            "channels": ["sms", "radio"],
            "explanation": "stub",
        })
    }
}

fn severity_priority(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 5,
        Severity::High => 4,
        Severity::Medium => 3,
        Severity::Low => 2,
    }
}

impl ReasoningOracle for StubOracle {
    async fn run(
        &self,
        role: OracleRole,
        _prompt: &str,
        context: &Value,
    ) -> Result<Value, ContractError> {
        Ok(match role {
            OracleRole::FieldReporter => Self::field_report(context),
            OracleRole::Triage => Self::triage(context),
            OracleRole::Vet => Self::vet(context),
            OracleRole::Communication => Self::communication(context),
        })
    }
}
