pub mod config;
pub mod error;
pub mod types;

pub use config::{ConvergenceConfig, GrowthSurge, InitialAssignment, SwarmConfig, TaskParams};
pub use error::{Result, SwarmError};
pub use types::{AgentId, SimTime, TaskId};
