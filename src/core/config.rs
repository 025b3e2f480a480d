//! Simulation configuration with documented constants
//!
//! Default values reproduce the four-robot, four-patch foraging experiment
//! the dynamics were originally tuned on. Changing them changes how fast
//! (and whether) the population distribution settles.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SwarmError};

/// Per-task parameters of the resource dynamics
///
/// Each task owns one depleting/replenishing resource pool governed by
/// `q̇ = growth - F(q, x)` with consumption
/// `F(q, x) = rate * tanh(alpha * q / 2) * x^beta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskParams {
    /// Peak consumption rate R: the most a fully saturated population
    /// can drain per second.
    pub rate: f64,

    /// Saturation steepness alpha: how quickly consumption approaches
    /// its peak as the resource level grows. The fastest time constant
    /// of the dynamics is on the order of 1 / (alpha * rate).
    pub alpha: f64,

    /// Crowding exponent beta: sublinear (< 1) means diminishing returns
    /// from piling more agents onto the same task.
    pub beta: f64,

    /// Replenishment rate w: resource added per second regardless of
    /// the population.
    pub growth: f64,

    /// Resource level q(0) at simulation start.
    #[serde(default)]
    pub initial_level: f64,
}

impl TaskParams {
    /// Parameters from the original foraging experiment (Fig. 2 tuning).
    pub fn foraging_default() -> Self {
        Self {
            rate: 3.44,
            alpha: 0.036,
            beta: 0.91,
            growth: 0.5,
            initial_level: 0.0,
        }
    }
}

/// How agents are spread over tasks at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InitialAssignment {
    /// Agent k starts on task k mod M (uniform spread).
    RoundRobin,
    /// Every agent starts on the given task.
    AllOn(u32),
    /// One task index per agent, in agent-id order.
    Explicit(Vec<u32>),
}

impl Default for InitialAssignment {
    fn default() -> Self {
        Self::RoundRobin
    }
}

/// Optional convergence monitor settings
///
/// The engine samples the payoff gap (max - min payoff) at every
/// integration tick; once the gap stays below `tolerance` for `hold`
/// consecutive seconds of simulated time the run ends in `Converged`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    pub tolerance: f64,
    pub hold: f64,
}

/// A scheduled growth-rate surge on one task
///
/// While `start <= t < end` the task's replenishment rate is replaced by
/// `rate`; outside the window the configured base rate applies again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSurge {
    pub start: f64,
    pub end: f64,
    pub task: u32,
    pub rate: f64,
}

/// Complete configuration for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Number of agents N in the closed population.
    pub agents: u32,

    /// Per-task dynamics parameters; the table length is the task count M.
    pub tasks: Vec<TaskParams>,

    /// Poisson revision rate lambda, shared by all agents. At the default
    /// of 1/8 Hz an agent reconsiders its task every 8 seconds on average.
    pub lambda: f64,

    /// Revision protocol gain rho. Must be small enough that the stay
    /// probability never goes negative over the reachable payoff range;
    /// a violation at runtime is a fatal error, never renormalized.
    pub rho: f64,

    /// Payoff anticipation weight nu. Zero gives the purely reactive
    /// payoff p_i = q_i; the original experiments used 0, 40 and 800.
    pub nu: f64,

    /// Reference resource level gamma* used by the anticipatory payoff
    /// term. Ignored when nu = 0.
    pub reference_level: f64,

    /// Simulation horizon in seconds; the run terminates here unless the
    /// convergence monitor stops it first.
    pub horizon: f64,

    /// Interval between resource-integration ticks. Revision events are
    /// interleaved between ticks at their exact Poisson times.
    pub step: f64,

    /// RK4 substeps per integration tick. More substeps shrink the
    /// discretization error relative to the continuous dynamics the
    /// convergence proof assumes; the default keeps the substep well
    /// under the fastest time constant of the default task parameters.
    pub substeps: u32,

    /// Master random seed. One sub-seed per agent is dealt from it, so a
    /// fixed seed reproduces the full event trace exactly.
    pub seed: u64,

    /// Startup task assignment policy.
    pub assignment: InitialAssignment,

    /// Optional convergence monitor; `None` runs to the horizon.
    pub convergence: Option<ConvergenceConfig>,

    /// Scheduled growth-rate surges (experiment scripting).
    pub surges: Vec<GrowthSurge>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            agents: 4,
            tasks: vec![TaskParams::foraging_default(); 4],
            lambda: 0.125,
            rho: 1.0 / 600.0,
            nu: 0.0,
            reference_level: 10.0,
            horizon: 2000.0,
            step: 0.5,
            substeps: 4,
            seed: 12345,
            assignment: InitialAssignment::RoundRobin,
            convergence: None,
            surges: Vec::new(),
        }
    }
}

impl SwarmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML experiment file.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate for internal consistency. A simulation must not start
    /// from a config that fails here.
    pub fn validate(&self) -> Result<()> {
        if self.agents == 0 {
            return Err(SwarmError::InvalidConfig("agent count must be > 0".into()));
        }
        if self.tasks.is_empty() {
            return Err(SwarmError::InvalidConfig("task table must not be empty".into()));
        }
        if !(self.lambda > 0.0) {
            return Err(SwarmError::InvalidConfig(format!(
                "lambda must be positive, got {}",
                self.lambda
            )));
        }
        if !(self.rho > 0.0) {
            return Err(SwarmError::InvalidConfig(format!(
                "rho must be positive, got {}",
                self.rho
            )));
        }
        if self.nu < 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "nu must be non-negative, got {}",
                self.nu
            )));
        }
        if !(self.step > 0.0) || !(self.horizon > 0.0) {
            return Err(SwarmError::InvalidConfig(format!(
                "step ({}) and horizon ({}) must be positive",
                self.step, self.horizon
            )));
        }
        if self.substeps == 0 {
            return Err(SwarmError::InvalidConfig("substeps must be > 0".into()));
        }

        for (i, task) in self.tasks.iter().enumerate() {
            let finite = task.rate.is_finite()
                && task.alpha.is_finite()
                && task.beta.is_finite()
                && task.growth.is_finite()
                && task.initial_level.is_finite();
            if !finite {
                return Err(SwarmError::InvalidConfig(format!(
                    "task {} has non-finite parameters",
                    i
                )));
            }
            if task.rate < 0.0 || task.alpha < 0.0 {
                return Err(SwarmError::InvalidConfig(format!(
                    "task {} has negative rate or alpha",
                    i
                )));
            }
        }

        match &self.assignment {
            InitialAssignment::RoundRobin => {}
            InitialAssignment::AllOn(task) => {
                if *task as usize >= self.tasks.len() {
                    return Err(SwarmError::InvalidConfig(format!(
                        "initial task {} out of range (have {} tasks)",
                        task,
                        self.tasks.len()
                    )));
                }
            }
            InitialAssignment::Explicit(list) => {
                if list.len() != self.agents as usize {
                    return Err(SwarmError::InvalidConfig(format!(
                        "explicit assignment lists {} agents, config has {}",
                        list.len(),
                        self.agents
                    )));
                }
                if let Some(bad) = list.iter().find(|t| **t as usize >= self.tasks.len()) {
                    return Err(SwarmError::InvalidConfig(format!(
                        "explicit assignment references task {} out of range",
                        bad
                    )));
                }
            }
        }

        if let Some(conv) = &self.convergence {
            if !(conv.tolerance > 0.0) || !(conv.hold > 0.0) {
                return Err(SwarmError::InvalidConfig(
                    "convergence tolerance and hold must be positive".into(),
                ));
            }
        }

        for (i, surge) in self.surges.iter().enumerate() {
            if surge.task as usize >= self.tasks.len() {
                return Err(SwarmError::InvalidConfig(format!(
                    "surge {} targets task {} out of range",
                    i, surge.task
                )));
            }
            if !(surge.start < surge.end) {
                return Err(SwarmError::InvalidConfig(format!(
                    "surge {} window [{}, {}) is empty",
                    i, surge.start, surge.end
                )));
            }
            if !surge.rate.is_finite() {
                return Err(SwarmError::InvalidConfig(format!(
                    "surge {} rate is not finite",
                    i
                )));
            }
        }

        Ok(())
    }

    /// Task count M.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SwarmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_agents_rejected() {
        let config = SwarmConfig {
            agents: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_lambda_rejected() {
        let config = SwarmConfig {
            lambda: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SwarmConfig {
            lambda: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_task_table_rejected() {
        let config = SwarmConfig {
            tasks: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_assignment_length_mismatch_rejected() {
        let config = SwarmConfig {
            agents: 4,
            assignment: InitialAssignment::Explicit(vec![0, 1]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_surge_rejected() {
        let config = SwarmConfig {
            surges: vec![GrowthSurge {
                start: 100.0,
                end: 200.0,
                task: 99,
                rate: 5.0,
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            agents = 8
            lambda = 0.25
            horizon = 500.0

            [[tasks]]
            rate = 3.44
            alpha = 0.036
            beta = 0.91
            growth = 0.5

            [[tasks]]
            rate = 3.44
            alpha = 0.036
            beta = 0.91
            growth = 0.5
        "#;
        let config = SwarmConfig::from_toml_str(text).expect("should parse");
        assert_eq!(config.agents, 8);
        assert_eq!(config.task_count(), 2);
        assert!((config.lambda - 0.25).abs() < 1e-12);
    }
}
