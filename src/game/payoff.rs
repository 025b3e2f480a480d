//! Payoff mechanism
//!
//! Translates resource state into the per-task attractiveness signal the
//! revision protocol compares. Pure and stateless: recomputed from the
//! current snapshot at every revision event, never cached across events.

use crate::core::config::TaskParams;
use crate::game::resource;

/// Payoff p_i = q_i + nu * (w_i - F_i(gamma*, x_i))
///
/// With nu = 0 this is the purely reactive payoff, exactly the current
/// resource level. With nu > 0 an anticipatory term is added: the net
/// replenishment the task would see at the reference level gamma* under
/// the current crowding.
pub fn payoff(
    params: &TaskParams,
    growth: f64,
    level: f64,
    share: f64,
    nu: f64,
    reference_level: f64,
) -> f64 {
    if nu == 0.0 {
        return level;
    }
    level + nu * (growth - resource::consumption(params, reference_level, share))
}

/// Payoffs for all tasks from one consistent state snapshot.
pub fn payoff_vector(
    tasks: &[TaskParams],
    growth: &[f64],
    levels: &[f64],
    shares: &[f64],
    nu: f64,
    reference_level: f64,
) -> Vec<f64> {
    (0..tasks.len())
        .map(|i| payoff(&tasks[i], growth[i], levels[i], shares[i], nu, reference_level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TaskParams;

    #[test]
    fn test_reactive_payoff_is_resource_level() {
        let p = TaskParams::foraging_default();
        for level in [-3.0, 0.0, 1.5, 42.0] {
            assert_eq!(payoff(&p, 0.5, level, 0.25, 0.0, 10.0), level);
        }
    }

    #[test]
    fn test_anticipatory_term_rewards_uncrowded_tasks() {
        let p = TaskParams::foraging_default();
        let nu = 40.0;
        let gamma = 10.0;

        // Same level and growth, different crowding: the uncrowded task
        // should look strictly more attractive.
        let crowded = payoff(&p, 0.5, 5.0, 0.9, nu, gamma);
        let empty = payoff(&p, 0.5, 5.0, 0.0, nu, gamma);
        assert!(empty > crowded);

        // Empty task: F vanishes, so the correction is exactly nu * w
        assert!((empty - (5.0 + nu * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_payoff_vector_matches_scalar() {
        let tasks = vec![TaskParams::foraging_default(); 3];
        let growth = vec![0.5, 0.6, 0.7];
        let levels = vec![1.0, 2.0, 3.0];
        let shares = vec![0.2, 0.3, 0.5];

        let vector = payoff_vector(&tasks, &growth, &levels, &shares, 40.0, 10.0);
        for i in 0..3 {
            let scalar = payoff(&tasks[i], growth[i], levels[i], shares[i], 40.0, 10.0);
            assert_eq!(vector[i], scalar);
        }
    }
}
