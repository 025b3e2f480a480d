//! Probabilistic task revision protocol
//!
//! Maps the current payoff vector and an agent's task to a categorical
//! distribution over staying or switching, then realizes one outcome from
//! a single uniform draw. The pairwise-proportional form
//! `P(i -> j) = rho * [p_j - p_i]_+` is what the population-level
//! convergence result is proven for, so a configuration that pushes the
//! stay probability negative is rejected as fatal rather than
//! renormalized.

use crate::core::error::{Result, SwarmError};
use crate::core::types::{AgentId, TaskId};

/// Outcome of one revision opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    Stay,
    Switch(TaskId),
}

/// Full probability distribution over tasks for an agent on `current`
///
/// Entry `j != current` is the switch probability, entry `current` the
/// stay probability. Errors if the stay probability is negative.
pub fn switch_probabilities(
    agent: AgentId,
    current: usize,
    payoffs: &[f64],
    rho: f64,
) -> Result<Vec<f64>> {
    let own = payoffs[current];
    let mut probs = vec![0.0; payoffs.len()];
    let mut total = 0.0;

    for (j, &p) in payoffs.iter().enumerate() {
        if j == current {
            continue;
        }
        let prob = rho * (p - own).max(0.0);
        probs[j] = prob;
        total += prob;
    }

    let stay = 1.0 - total;
    if stay < 0.0 {
        return Err(SwarmError::NegativeStayProbability { agent, stay });
    }
    probs[current] = stay;

    Ok(probs)
}

/// Realize one revision outcome with a single uniform draw
///
/// Walks the cumulative switch probabilities; the residual mass is the
/// stay outcome, so the distribution is sampled exactly once.
pub fn revise(
    agent: AgentId,
    current: usize,
    payoffs: &[f64],
    rho: f64,
    unit_draw: f64,
) -> Result<Revision> {
    let own = payoffs[current];
    let mut cumulative = 0.0;

    for (j, &p) in payoffs.iter().enumerate() {
        if j == current {
            continue;
        }
        cumulative += rho * (p - own).max(0.0);
    }
    if cumulative > 1.0 {
        return Err(SwarmError::NegativeStayProbability {
            agent,
            stay: 1.0 - cumulative,
        });
    }

    let mut acc = 0.0;
    for (j, &p) in payoffs.iter().enumerate() {
        if j == current {
            continue;
        }
        acc += rho * (p - own).max(0.0);
        if unit_draw < acc {
            return Ok(Revision::Switch(TaskId(j as u32)));
        }
    }

    Ok(Revision::Stay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> AgentId {
        AgentId(0)
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let payoffs = vec![1.0, 3.0, 2.0, 5.0];
        for current in 0..payoffs.len() {
            let probs = switch_probabilities(agent(), current, &payoffs, 0.05).unwrap();
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum was {}", sum);
            assert!(probs.iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn test_never_switches_toward_lower_payoff() {
        let payoffs = vec![5.0, 3.0, 4.0];
        let probs = switch_probabilities(agent(), 0, &payoffs, 0.1).unwrap();
        assert_eq!(probs[1], 0.0);
        assert_eq!(probs[2], 0.0);
        assert_eq!(probs[0], 1.0);
    }

    #[test]
    fn test_switch_probability_proportional_to_gap() {
        let payoffs = vec![1.0, 2.0, 4.0];
        let rho = 0.01;
        let probs = switch_probabilities(agent(), 0, &payoffs, rho).unwrap();
        assert!((probs[1] - rho * 1.0).abs() < 1e-12);
        assert!((probs[2] - rho * 3.0).abs() < 1e-12);
        assert!((probs[0] - (1.0 - rho * 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_negative_stay_is_fatal() {
        // rho * total gap = 0.5 * (4 + 2) = 3 > 1
        let payoffs = vec![0.0, 4.0, 2.0];
        let result = switch_probabilities(agent(), 0, &payoffs, 0.5);
        assert!(matches!(
            result,
            Err(SwarmError::NegativeStayProbability { .. })
        ));

        let result = revise(agent(), 0, &payoffs, 0.5, 0.3);
        assert!(result.is_err());
    }

    #[test]
    fn test_revise_matches_distribution_boundaries() {
        let payoffs = vec![1.0, 2.0, 4.0];
        let rho = 0.1;
        // Switch mass: task1 gets [0, 0.1), task2 gets [0.1, 0.4)
        assert_eq!(
            revise(agent(), 0, &payoffs, rho, 0.05).unwrap(),
            Revision::Switch(TaskId(1))
        );
        assert_eq!(
            revise(agent(), 0, &payoffs, rho, 0.25).unwrap(),
            Revision::Switch(TaskId(2))
        );
        assert_eq!(revise(agent(), 0, &payoffs, rho, 0.45).unwrap(), Revision::Stay);
        assert_eq!(
            revise(agent(), 0, &payoffs, rho, 0.999).unwrap(),
            Revision::Stay
        );
    }

    #[test]
    fn test_equal_payoffs_always_stay() {
        let payoffs = vec![2.0, 2.0, 2.0];
        for draw in [0.0, 0.3, 0.999_999] {
            assert_eq!(
                revise(agent(), 1, &payoffs, 0.1, draw).unwrap(),
                Revision::Stay
            );
        }
    }

    #[test]
    fn test_single_task_population_always_stays() {
        let payoffs = vec![7.0];
        assert_eq!(revise(agent(), 0, &payoffs, 0.1, 0.5).unwrap(), Revision::Stay);
    }
}
