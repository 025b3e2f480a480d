//! Population-game task allocation engine
//!
//! Decentralized allocation of a closed agent population over a small set
//! of shared, depleting/replenishing resources. Agents revise their task
//! on independent Poisson clocks using only a locally observable payoff
//! signal; the aggregate distribution settles toward the equilibrium
//! where no task pays strictly better than an agent's own.

pub mod clock;
pub mod engine;
pub mod output;
pub mod payoff;
pub mod platform;
pub mod population;
pub mod protocol;
pub mod resource;
pub mod trace;

pub use clock::RevisionClock;
pub use engine::{simulate, EngineState, SimulationEngine};
pub use output::{RunOutcome, RunStats, SimulationOutput};
pub use platform::{AgentStatus, Directive, NullPlatform, Platform};
pub use population::{PopulationState, StateSnapshot};
pub use protocol::Revision;
pub use trace::{Sample, TraceEvent, TraceLog};
