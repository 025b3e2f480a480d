//! Population and resource state tracker
//!
//! The single owner of the shared mutable state: per-task resource levels,
//! per-task live-agent counts, effective growth rates and the simulation
//! clock. Shares are derived from integer counts, so the simplex
//! constraint (shares summing to one) holds by construction and survives
//! agent removal without an explicit renormalization pass.

use crate::core::config::TaskParams;
use crate::core::error::Result;
use crate::core::types::SimTime;
use crate::game::resource;

/// Consistent read of `(q, x, w, t)` taken between mutations
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub levels: Vec<f64>,
    pub shares: Vec<f64>,
    pub growth: Vec<f64>,
    pub time: SimTime,
}

/// Owner of the shared population/resource state
#[derive(Debug, Clone)]
pub struct PopulationState {
    levels: Vec<f64>,
    growth: Vec<f64>,
    counts: Vec<u32>,
    live: u32,
    time: SimTime,
}

impl PopulationState {
    /// Build from per-task parameters and initial per-task agent counts.
    pub fn new(tasks: &[TaskParams], counts: Vec<u32>) -> Self {
        debug_assert_eq!(tasks.len(), counts.len());
        let live = counts.iter().sum();
        Self {
            levels: tasks.iter().map(|t| t.initial_level).collect(),
            growth: tasks.iter().map(|t| t.growth).collect(),
            counts,
            live,
            time: 0.0,
        }
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn live_agents(&self) -> u32 {
        self.live
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn growth(&self) -> &[f64] {
        &self.growth
    }

    pub fn count(&self, task: usize) -> u32 {
        self.counts[task]
    }

    /// Population shares x_i = count_i / live. With nobody alive every
    /// share is zero and consumption vanishes.
    pub fn shares(&self) -> Vec<f64> {
        if self.live == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|c| *c as f64 / self.live as f64)
            .collect()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            levels: self.levels.clone(),
            shares: self.shares(),
            growth: self.growth.clone(),
            time: self.time,
        }
    }

    /// Move one agent's worth of mass between task buckets.
    pub fn apply_switch(&mut self, from: usize, to: usize) {
        debug_assert!(self.counts[from] > 0, "switch from an empty bucket");
        self.counts[from] -= 1;
        self.counts[to] += 1;
    }

    /// Remove a failed agent from its task bucket and the live count.
    /// Shares renormalize implicitly over the remaining population.
    pub fn remove_agent(&mut self, task: usize) {
        debug_assert!(self.counts[task] > 0, "removal from an empty bucket");
        self.counts[task] -= 1;
        self.live -= 1;
    }

    /// Advance the resource dynamics by `dt` and the clock with them.
    pub fn integrate(&mut self, tasks: &[TaskParams], dt: f64, substeps: u32) -> Result<()> {
        let shares = self.shares();
        resource::integrate(
            tasks,
            &self.growth,
            &mut self.levels,
            &shares,
            dt,
            substeps,
            self.time,
        )?;
        self.time += dt;
        Ok(())
    }

    /// Override one task's effective growth rate (surge scripting).
    pub fn set_growth(&mut self, task: usize, rate: f64) {
        self.growth[task] = rate;
    }
}
