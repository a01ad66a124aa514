//! Well-known actor names.
//!
//! Responder units register under their station name instead.

pub const COORDINATOR: &str = "CoordinatorAgent";
pub const BLACKBOARD: &str = "BlackboardAgent";
pub const COMMUNICATION: &str = "CommunicationAgent";
pub const TRIAGE: &str = "TriageAgent";
pub const VET: &str = "VetAgent";
pub const FIELD_REPORTER: &str = "FieldReporter";
