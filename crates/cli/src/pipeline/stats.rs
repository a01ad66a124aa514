//! Run statistics.

use std::time::Duration;

use contracts::BlackboardStats;
use observability::DispatchSummary;

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub reports_submitted: u64,
    pub duration: Duration,
    pub blackboard: BlackboardStats,
    pub envelopes_published: u64,
    pub envelopes_undeliverable: u64,
    pub dispatch: DispatchSummary,
}

impl RunStats {
    pub fn print_summary(&self) {
        let bb = &self.blackboard;

        println!("\n=== WildGuard Run ===\n");
        println!("Overview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Reports submitted: {}", self.reports_submitted);
        println!(
            "  Envelopes: {} published, {} undeliverable",
            self.envelopes_published, self.envelopes_undeliverable
        );

        println!("\nBlackboard");
        println!("  Incidents: {}", bb.incidents);
        println!("  Triage summaries: {}", bb.triage);
        println!("  Dispatches: {} ({} acknowledged)", bb.dispatches, bb.acknowledgements);
        println!("  Escalations: {}", bb.escalations);
        println!("  Treatments: {}", bb.treatments);
        println!("  Communications: {}", bb.communications);
        if bb.misrouted > 0 {
            println!("  Misrouted: {}", bb.misrouted);
        }

        println!("\n{}", self.dispatch);
    }
}
