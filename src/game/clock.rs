//! Per-agent Poisson revision clock
//!
//! Each agent owns an independent exponential inter-event process and its
//! own seeded random stream, so one agent's draws can never perturb
//! another's sequence regardless of event interleaving.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::SimTime;

/// One agent's revision clock and random stream
#[derive(Debug, Clone)]
pub struct RevisionClock {
    rate: f64,
    rng: ChaCha8Rng,
    next_at: SimTime,
}

impl RevisionClock {
    /// Build a clock with its first revision time already drawn from t = 0.
    pub fn new(rate: f64, seed: u64) -> Self {
        let mut clock = Self {
            rate,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_at: 0.0,
        };
        clock.next_at = clock.draw_interval();
        clock
    }

    /// Time of the next revision opportunity.
    pub fn next_at(&self) -> SimTime {
        self.next_at
    }

    /// Draw the next inter-event interval after a revision fired at `now`.
    /// The next time is strictly greater than `now`.
    pub fn reschedule(&mut self, now: SimTime) {
        self.next_at = now + self.draw_interval();
    }

    /// One uniform draw from this agent's stream, for the revision
    /// protocol's categorical sample.
    pub fn unit_draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn draw_interval(&mut self) -> f64 {
        // Inverse-CDF sample of Exp(rate). gen() is in [0, 1), so the
        // complement keeps the log argument strictly positive.
        let u: f64 = self.rng.gen();
        -(1.0 - u).ln() / self.rate
    }
}
