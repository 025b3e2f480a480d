//! Simulation output and serialization

use serde::{Deserialize, Serialize};

use crate::game::trace::TraceLog;

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The convergence monitor tripped before the horizon
    Converged,
    /// The simulation horizon was reached
    Terminated,
}

/// Counters accumulated over one run
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub integration_ticks: u32,
    pub revision_events: u32,
    pub switches: u32,
    pub failures: u32,
    pub wall_ms: u64,
}

/// Complete output of one simulation run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub outcome: RunOutcome,
    /// Simulated time at which the run ended
    pub time: f64,
    /// Final resource levels q
    pub levels: Vec<f64>,
    /// Final population shares x
    pub shares: Vec<f64>,
    pub live_agents: u32,
    /// Time the convergence monitor tripped, if it did
    pub converged_at: Option<f64>,
    pub stats: RunStats,
    pub trace: TraceLog,
}

impl SimulationOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "{:?} at t={:.1}s: {} ticks, {} revisions ({} switches), {} failures, {} agents live\nfinal shares: {:?}",
            self.outcome,
            self.time,
            self.stats.integration_ticks,
            self.stats.revision_events,
            self.stats.switches,
            self.stats.failures,
            self.live_agents,
            self.shares,
        )
    }
}
