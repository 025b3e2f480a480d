//! Property tests for the revision protocol
//!
//! For any payoff vector and any gain small enough to keep the stay
//! probability non-negative, the protocol must produce a genuine
//! probability distribution and only ever realize outcomes that carry
//! positive mass.

use proptest::prelude::*;

use taskswarm::core::types::AgentId;
use taskswarm::game::protocol::{revise, switch_probabilities, Revision};

fn payoff_vector() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, 2..6)
}

proptest! {
    #[test]
    fn distribution_is_valid(
        payoffs in payoff_vector(),
        current in 0usize..6,
        rho in 1e-6f64..8e-4,
    ) {
        let current = current % payoffs.len();
        let probs = switch_probabilities(AgentId(0), current, &payoffs, rho).unwrap();

        let sum: f64 = probs.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
        prop_assert!(probs.iter().all(|p| *p >= 0.0));
        prop_assert_eq!(probs.len(), payoffs.len());
    }

    #[test]
    fn realized_outcome_has_positive_mass(
        payoffs in payoff_vector(),
        current in 0usize..6,
        rho in 1e-6f64..8e-4,
        draw in 0.0f64..1.0,
    ) {
        let current = current % payoffs.len();
        let probs = switch_probabilities(AgentId(0), current, &payoffs, rho).unwrap();
        let outcome = revise(AgentId(0), current, &payoffs, rho, draw).unwrap();

        match outcome {
            Revision::Stay => prop_assert!(probs[current] > 0.0),
            Revision::Switch(task) => {
                prop_assert_ne!(task.index(), current, "switch must change the task");
                prop_assert!(probs[task.index()] > 0.0);
                // Switching is only ever toward a strictly better payoff
                prop_assert!(payoffs[task.index()] > payoffs[current]);
            }
        }
    }

    #[test]
    fn stay_is_certain_when_current_task_is_best(
        payoffs in payoff_vector(),
        rho in 1e-6f64..8e-4,
        draw in 0.0f64..1.0,
    ) {
        let best = payoffs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let outcome = revise(AgentId(0), best, &payoffs, rho, draw).unwrap();
        prop_assert_eq!(outcome, Revision::Stay);
    }
}
