use thiserror::Error;

use crate::core::types::{AgentId, TaskId};

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Non-finite resource level {value} for {task} at t={time:.3}")]
    NumericFault {
        task: TaskId,
        time: f64,
        value: f64,
    },

    #[error("Negative stay probability {stay:.6} for {agent} (rho too large for this payoff range)")]
    NegativeStayProbability { agent: AgentId, stay: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFileError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
