//! Simulation engine - the main event loop
//!
//! Single-threaded, globally time-ordered processing of the two event
//! kinds: fixed resource-integration ticks and per-agent Poisson revision
//! events. Strict time ordering plus per-agent random streams make a run
//! fully reproducible from the master seed. Ties are broken
//! deterministically: a tick due at the same instant as a revision fires
//! first, and coincident revisions fire in ascending agent id.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::core::config::{InitialAssignment, SwarmConfig};
use crate::core::error::{Result, SwarmError};
use crate::core::types::{AgentId, TaskId};
use crate::game::clock::RevisionClock;
use crate::game::output::{RunOutcome, RunStats, SimulationOutput};
use crate::game::payoff;
use crate::game::platform::{AgentStatus, Directive, NullPlatform, Platform};
use crate::game::population::PopulationState;
use crate::game::protocol::{self, Revision};
use crate::game::trace::{Sample, TraceEvent, TraceLog};

/// Engine lifecycle; both terminal states are final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Converged,
    Terminated,
}

struct Agent {
    id: AgentId,
    task: usize,
    clock: RevisionClock,
}

/// Orchestrates resource integration, revision events and state updates
pub struct SimulationEngine {
    config: SwarmConfig,
    state: EngineState,
    population: PopulationState,
    agents: Vec<Agent>,
    trace: TraceLog,
    stats: RunStats,
    next_tick: f64,
    gap_below_since: Option<f64>,
    converged_at: Option<f64>,
}

impl SimulationEngine {
    /// Validate the configuration and build the initial population.
    /// Fails fast: an invalid config never produces an engine.
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;

        let task_count = config.task_count();
        let mut counts = vec![0u32; task_count];
        let mut master = ChaCha8Rng::seed_from_u64(config.seed);

        let agents: Vec<Agent> = (0..config.agents)
            .map(|k| {
                let task = match &config.assignment {
                    InitialAssignment::RoundRobin => k as usize % task_count,
                    InitialAssignment::AllOn(t) => *t as usize,
                    InitialAssignment::Explicit(list) => list[k as usize] as usize,
                };
                counts[task] += 1;
                // One sub-seed per agent, dealt in id order from the
                // master stream, keeps agent sequences mutually
                // independent and the whole run reproducible.
                let seed = master.gen::<u64>();
                Agent {
                    id: AgentId(k),
                    task,
                    clock: RevisionClock::new(config.lambda, seed),
                }
            })
            .collect();

        let population = PopulationState::new(&config.tasks, counts);
        let next_tick = config.step;

        Ok(Self {
            config,
            state: EngineState::Idle,
            population,
            agents,
            trace: TraceLog::new(),
            stats: RunStats::default(),
            next_tick,
            gap_below_since: None,
            converged_at: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run to convergence or the horizon against the given platform.
    /// Consuming entry point: terminal states are final, so the engine
    /// refuses to run twice.
    pub fn run(&mut self, platform: &mut dyn Platform) -> Result<SimulationOutput> {
        if self.state != EngineState::Idle {
            return Err(SwarmError::InvalidConfig(
                "engine already ran; terminal states are final".into(),
            ));
        }

        let wall = std::time::Instant::now();
        self.state = EngineState::Running;
        info!(
            agents = self.config.agents,
            tasks = self.config.task_count(),
            horizon = self.config.horizon,
            seed = self.config.seed,
            "simulation starting"
        );

        self.apply_surges(0.0);
        self.record_sample();

        loop {
            let next_revision = self.next_revision();
            let tick_due = self.next_tick;

            // Earliest event past the horizon on both fronts: integrate
            // the remainder and stop.
            let next_event = match next_revision {
                Some((_, at)) => tick_due.min(at),
                None => tick_due,
            };
            if next_event > self.config.horizon {
                self.finish_at_horizon()?;
                break;
            }

            match next_revision {
                // Tick first on a timestamp tie, revisions otherwise
                Some((idx, at)) if at < tick_due => {
                    self.process_revision(idx, at, platform)?;
                }
                _ => {
                    self.process_tick(platform)?;
                }
            }

            if self.check_convergence() {
                break;
            }
        }

        self.stats.wall_ms = wall.elapsed().as_millis() as u64;
        info!(
            outcome = ?self.state,
            time = self.population.time(),
            revisions = self.stats.revision_events,
            switches = self.stats.switches,
            "simulation finished"
        );

        Ok(self.build_output())
    }

    /// Earliest pending revision among live agents, agent-id tie-break.
    /// `agents` stays sorted by id, so the strict `<` scan keeps the
    /// lowest id on equal timestamps.
    fn next_revision(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, agent) in self.agents.iter().enumerate() {
            let at = agent.clock.next_at();
            match best {
                Some((_, t)) if at >= t => {}
                _ => best = Some((idx, at)),
            }
        }
        best
    }

    fn process_tick(&mut self, platform: &mut dyn Platform) -> Result<()> {
        let now = self.population.time();
        let dt = self.next_tick - now;
        self.apply_surges(now);
        self.population
            .integrate(&self.config.tasks, dt, self.config.substeps)?;
        self.next_tick += self.config.step;
        self.stats.integration_ticks += 1;

        self.poll_liveness(platform);
        self.record_sample();
        Ok(())
    }

    fn process_revision(
        &mut self,
        idx: usize,
        at: f64,
        platform: &mut dyn Platform,
    ) -> Result<()> {
        // Payoffs come from the state as of the last completed
        // integration tick; the protocol never sees a half-applied state.
        let snapshot = self.population.snapshot();
        let payoffs = payoff::payoff_vector(
            &self.config.tasks,
            &snapshot.growth,
            &snapshot.levels,
            &snapshot.shares,
            self.config.nu,
            self.config.reference_level,
        );

        let agent = &mut self.agents[idx];
        let draw = agent.clock.unit_draw();
        let outcome = protocol::revise(agent.id, agent.task, &payoffs, self.config.rho, draw)?;
        self.stats.revision_events += 1;

        match outcome {
            Revision::Switch(to) if to.index() != agent.task => {
                let from = agent.task;
                agent.task = to.index();
                let id = agent.id;
                agent.clock.reschedule(at);
                self.population.apply_switch(from, to.index());
                self.stats.switches += 1;
                debug!(agent = %id, from, to = to.index(), time = at, "task switch");
                self.trace.add_event(TraceEvent::Reassigned {
                    time: at,
                    agent: id.0,
                    from: from as u32,
                    to: to.0,
                });
                platform.dispatch(Directive::Reassign {
                    agent: id,
                    from: TaskId(from as u32),
                    to,
                    time: at,
                });
            }
            _ => {
                let id = agent.id;
                let task = agent.task;
                agent.clock.reschedule(at);
                trace!(agent = %id, task, time = at, "revision, staying");
                self.trace.add_event(TraceEvent::Stayed {
                    time: at,
                    agent: id.0,
                    task: task as u32,
                });
                platform.dispatch(Directive::Stay {
                    agent: id,
                    task: TaskId(task as u32),
                    time: at,
                });
            }
        }

        Ok(())
    }

    /// Poll the platform for liveness and drop failed agents. Removal is
    /// local recovery: the population mass renormalizes over the
    /// survivors and the run continues.
    fn poll_liveness(&mut self, platform: &mut dyn Platform) {
        let now = self.population.time();
        let mut failed: Vec<usize> = Vec::new();
        for (idx, agent) in self.agents.iter().enumerate() {
            if platform.agent_status(agent.id, now) == AgentStatus::Failed {
                failed.push(idx);
            }
        }
        for idx in failed.into_iter().rev() {
            let agent = self.agents.remove(idx);
            self.population.remove_agent(agent.task);
            self.stats.failures += 1;
            debug!(agent = %agent.id, task = agent.task, time = now, "agent failed, removed");
            self.trace.add_event(TraceEvent::AgentFailed {
                time: now,
                agent: agent.id.0,
                task: agent.task as u32,
            });
        }
    }

    /// Recompute effective growth rates for the interval starting at
    /// `now`. Surge windows take effect at tick granularity; the last
    /// matching surge wins when windows overlap.
    fn apply_surges(&mut self, now: f64) {
        for task in 0..self.config.task_count() {
            let base = self.config.tasks[task].growth;
            let mut effective = base;
            for surge in &self.config.surges {
                if surge.task as usize == task && surge.start <= now && now < surge.end {
                    effective = surge.rate;
                }
            }
            let current = self.population.growth()[task];
            if effective != current {
                self.population.set_growth(task, effective);
                let event = if effective != base {
                    info!(task, rate = effective, time = now, "growth surge begins");
                    TraceEvent::SurgeStarted {
                        time: now,
                        task: task as u32,
                        rate: effective,
                    }
                } else {
                    info!(task, rate = base, time = now, "growth surge ends");
                    TraceEvent::SurgeEnded {
                        time: now,
                        task: task as u32,
                        rate: base,
                    }
                };
                self.trace.add_event(event);
            }
        }
    }

    fn record_sample(&mut self) {
        let snapshot = self.population.snapshot();
        trace!(
            time = snapshot.time,
            levels = ?snapshot.levels,
            shares = ?snapshot.shares,
            "tick sample"
        );
        self.trace.add_sample(Sample {
            time: snapshot.time,
            levels: snapshot.levels,
            shares: snapshot.shares,
            growth: snapshot.growth,
        });
    }

    /// Convergence monitor: the payoff gap must stay under the tolerance
    /// for the configured hold duration. Checked after each tick.
    fn check_convergence(&mut self) -> bool {
        let Some(conv) = self.config.convergence.clone() else {
            return false;
        };
        if self.population.live_agents() == 0 {
            return false;
        }

        let now = self.population.time();
        let snapshot = self.population.snapshot();
        let payoffs = payoff::payoff_vector(
            &self.config.tasks,
            &snapshot.growth,
            &snapshot.levels,
            &snapshot.shares,
            self.config.nu,
            self.config.reference_level,
        );
        let max = payoffs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = payoffs.iter().cloned().fold(f64::INFINITY, f64::min);
        let gap = max - min;

        if gap < conv.tolerance {
            let since = *self.gap_below_since.get_or_insert(now);
            if now - since >= conv.hold {
                self.state = EngineState::Converged;
                self.converged_at = Some(now);
                self.trace.add_event(TraceEvent::Converged { time: now });
                info!(time = now, gap, "population converged");
                return true;
            }
        } else {
            self.gap_below_since = None;
        }
        false
    }

    /// Integrate the remaining fraction of a tick up to the horizon and
    /// enter the terminal state.
    fn finish_at_horizon(&mut self) -> Result<()> {
        let now = self.population.time();
        let remaining = self.config.horizon - now;
        if remaining > 0.0 {
            self.apply_surges(now);
            self.population
                .integrate(&self.config.tasks, remaining, self.config.substeps)?;
            self.record_sample();
        }
        self.state = EngineState::Terminated;
        Ok(())
    }

    fn build_output(&mut self) -> SimulationOutput {
        let outcome = match self.state {
            EngineState::Converged => RunOutcome::Converged,
            _ => RunOutcome::Terminated,
        };
        SimulationOutput {
            outcome,
            time: self.population.time(),
            levels: self.population.levels().to_vec(),
            shares: self.population.shares(),
            live_agents: self.population.live_agents(),
            converged_at: self.converged_at,
            stats: self.stats,
            trace: std::mem::take(&mut self.trace),
        }
    }
}

/// Run one simulation with no external platform attached.
pub fn simulate(config: SwarmConfig) -> Result<SimulationOutput> {
    let mut engine = SimulationEngine::new(config)?;
    engine.run(&mut NullPlatform)
}
