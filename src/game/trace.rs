//! Experiment trace logging
//!
//! In-memory record of everything an experiment analysis needs: a state
//! sample at every integration tick and a discrete event for every
//! revision, failure, surge transition and convergence. Serializable so
//! the binary can dump it as JSON; persistence itself lives outside the
//! core.

use serde::{Deserialize, Serialize};

/// State sample taken at an integration tick
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub levels: Vec<f64>,
    pub shares: Vec<f64>,
    pub growth: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// Agent switched tasks at a revision opportunity
    Reassigned {
        time: f64,
        agent: u32,
        from: u32,
        to: u32,
    },
    /// Agent reconsidered its task and kept it
    Stayed { time: f64, agent: u32, task: u32 },
    /// Agent reported failed and was removed from the population
    AgentFailed { time: f64, agent: u32, task: u32 },
    /// A scheduled growth surge took effect on a task
    SurgeStarted { time: f64, task: u32, rate: f64 },
    /// A surge window closed and the base growth rate was restored
    SurgeEnded { time: f64, task: u32, rate: f64 },
    /// The convergence monitor tripped
    Converged { time: f64 },
}

/// The complete trace of one run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceLog {
    pub samples: Vec<Sample>,
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn add_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn reassignments(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Reassigned { .. }))
    }

    pub fn events_for_agent(&self, agent: u32) -> impl Iterator<Item = &TraceEvent> + '_ {
        self.events.iter().filter(move |e| match e {
            TraceEvent::Reassigned { agent: a, .. }
            | TraceEvent::Stayed { agent: a, .. }
            | TraceEvent::AgentFailed { agent: a, .. } => *a == agent,
            _ => false,
        })
    }
}
