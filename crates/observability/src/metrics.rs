//! Dispatch metrics from blackboard records
//!
//! Two views of the same stream: `metrics` gauges/histograms for a live
//! exporter, and an in-memory [`DispatchAggregator`] for end-of-run summaries.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{BlackboardStats, DispatchOrder, LogEvent, LogRecord};
use metrics::{gauge, histogram};

/// Mirror the blackboard's running totals as gauges
pub fn record_blackboard_stats(stats: &BlackboardStats) {
    gauge!("wildguard_blackboard_incidents").set(stats.incidents as f64);
    gauge!("wildguard_blackboard_dispatches").set(stats.dispatches as f64);
    gauge!("wildguard_blackboard_escalations").set(stats.escalations as f64);
    gauge!("wildguard_blackboard_treatments").set(stats.treatments as f64);
    gauge!("wildguard_blackboard_communications").set(stats.communications as f64);
    gauge!("wildguard_blackboard_misrouted").set(stats.misrouted as f64);
}

pub fn record_dispatch(order: &DispatchOrder) {
    histogram!("wildguard_dispatch_distance_km", "station" => order.station_name.to_string())
        .record(order.distance_km);
    histogram!("wildguard_dispatch_eta_minutes").record(order.eta_minutes);
    histogram!("wildguard_dispatch_options").record(order.all_options.len() as f64);
}

/// In-memory dispatch statistics
#[derive(Debug, Clone, Default)]
pub struct DispatchAggregator {
    pub incidents: u64,
    pub dispatches: u64,
    pub no_response: u64,
    pub all_unavailable: u64,
    pub treatments_accepted: u64,
    pub treatments_declined: u64,
    pub misrouted: u64,
    pub distance_km: RunningStats,
    pub eta_minutes: RunningStats,
    /// Answers considered per dispatch
    pub options: RunningStats,
    pub per_station: BTreeMap<String, u64>,
}

impl DispatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, record: &LogRecord) {
        match &record.event {
            LogEvent::IncidentAdvertised { .. } => self.incidents += 1,
            LogEvent::DispatchOrder { order } => {
                self.dispatches += 1;
                self.distance_km.push(order.distance_km);
                self.eta_minutes.push(order.eta_minutes);
                self.options.push(order.all_options.len() as f64);
                *self
                    .per_station
                    .entry(order.station_name.to_string())
                    .or_insert(0) += 1;
            }
            LogEvent::NoResponses { .. } => self.no_response += 1,
            LogEvent::AllUnavailable { .. } => self.all_unavailable += 1,
            LogEvent::TreatmentDecision { decision, .. } => {
                if decision.is_accepted() {
                    self.treatments_accepted += 1;
                } else {
                    self.treatments_declined += 1;
                }
            }
            LogEvent::Misrouted { .. } => self.misrouted += 1,
            _ => {}
        }
    }

    pub fn summary(&self) -> DispatchSummary {
        let escalations = self.no_response + self.all_unavailable;
        let decided = self.dispatches + escalations;
        DispatchSummary {
            incidents: self.incidents,
            dispatches: self.dispatches,
            no_response: self.no_response,
            all_unavailable: self.all_unavailable,
            dispatch_rate: if decided > 0 {
                self.dispatches as f64 / decided as f64 * 100.0
            } else {
                0.0
            },
            treatments_accepted: self.treatments_accepted,
            treatments_declined: self.treatments_declined,
            misrouted: self.misrouted,
            distance_km: StatsSummary::from(&self.distance_km),
            eta_minutes: StatsSummary::from(&self.eta_minutes),
            per_station: self.per_station.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub incidents: u64,
    pub dispatches: u64,
    pub no_response: u64,
    pub all_unavailable: u64,
    /// Percent of decided rounds that ended in a dispatch
    pub dispatch_rate: f64,
    pub treatments_accepted: u64,
    pub treatments_declined: u64,
    pub misrouted: u64,
    pub distance_km: StatsSummary,
    pub eta_minutes: StatsSummary,
    pub per_station: BTreeMap<String, u64>,
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Incidents: {}", self.incidents)?;
        writeln!(
            f,
            "Dispatches: {} ({:.1}% of decided rounds)",
            self.dispatches, self.dispatch_rate
        )?;
        writeln!(
            f,
            "Escalations: {} no response, {} all unavailable",
            self.no_response, self.all_unavailable
        )?;
        writeln!(
            f,
            "Treatments: {} accepted, {} declined",
            self.treatments_accepted, self.treatments_declined
        )?;
        if self.misrouted > 0 {
            writeln!(f, "Misrouted envelopes: {}", self.misrouted)?;
        }
        writeln!(f, "Distance (km): {}", self.distance_km)?;
        writeln!(f, "ETA (min): {}", self.eta_minutes)?;

        if !self.per_station.is_empty() {
            writeln!(f, "Dispatches by station:")?;
            for (station, count) in &self.per_station {
                writeln!(f, "  {station}: {count}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
            self.min, self.max, self.mean, self.std_dev, self.count
        )
    }
}

/// Online mean and variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
