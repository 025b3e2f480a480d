//! External platform boundary
//!
//! The engine consumes liveness observations from, and emits reassignment
//! directives to, whatever hosts the physical agents. The default
//! implementation does nothing, which is all a pure simulation needs;
//! tests script failures through it.

use crate::core::types::{AgentId, SimTime, TaskId};

/// Liveness observation for one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Alive,
    Failed,
}

/// Decision emitted immediately after a revision event is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    Reassign {
        agent: AgentId,
        from: TaskId,
        to: TaskId,
        time: SimTime,
    },
    Stay {
        agent: AgentId,
        task: TaskId,
        time: SimTime,
    },
}

/// Host platform the engine talks to
///
/// `agent_status` is polled for every live agent at each integration tick;
/// `dispatch` receives one directive per revision event.
pub trait Platform {
    fn agent_status(&mut self, _agent: AgentId, _now: SimTime) -> AgentStatus {
        AgentStatus::Alive
    }

    fn dispatch(&mut self, _directive: Directive) {}
}

/// Platform with no agents behind it; nothing fails, directives vanish.
#[derive(Debug, Default)]
pub struct NullPlatform;

impl Platform for NullPlatform {}
