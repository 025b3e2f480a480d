//! Resource consumption model and dynamics integration
//!
//! Each task owns one resource pool evolving as `q̇ = w - F(q, x)`. The
//! consumption rate `F` saturates in the resource level and scales with a
//! power of the population share, so an empty task consumes nothing and a
//! rich task is drained at a bounded rate.

use crate::core::config::TaskParams;
use crate::core::error::{Result, SwarmError};
use crate::core::types::TaskId;

/// Consumption rate F(q, x) = rate * tanh(alpha * q / 2) * x^beta
///
/// Defined as exactly zero whenever the share is zero, for any beta
/// (including beta = 0, where x^beta would otherwise be 0^0).
pub fn consumption(params: &TaskParams, level: f64, share: f64) -> f64 {
    if share <= 0.0 {
        return 0.0;
    }
    params.rate * (params.alpha * level / 2.0).tanh() * share.powf(params.beta)
}

/// Resource level q* at which consumption balances replenishment,
/// i.e. F(q*, x) = w for a fixed share x.
///
/// Returns `None` when the task is unsaturable at this share
/// (w >= rate * x^beta): consumption can never catch up with growth and
/// no finite equilibrium exists.
pub fn equilibrium_level(params: &TaskParams, share: f64, growth: f64) -> Option<f64> {
    if share <= 0.0 || params.rate <= 0.0 || params.alpha <= 0.0 {
        return None;
    }
    let target = growth / (params.rate * share.powf(params.beta));
    if !(target > 0.0 && target < 1.0) {
        return None;
    }
    // tanh(alpha * q / 2) = target  =>  q = (2 / alpha) * atanh(target)
    Some(2.0 / params.alpha * target.atanh())
}

fn derivative(params: &TaskParams, growth: f64, level: f64, share: f64) -> f64 {
    growth - consumption(params, level, share)
}

/// Advance all resource levels by `dt` with fixed-step RK4
///
/// The population shares are held constant over the interval; revision
/// events only land between integration ticks, so this matches the event
/// ordering of the engine. Tasks are mutually uncoupled given `x`, so each
/// level integrates independently. Errors on any non-finite result rather
/// than letting NaN propagate.
pub fn integrate(
    tasks: &[TaskParams],
    growth: &[f64],
    levels: &mut [f64],
    shares: &[f64],
    dt: f64,
    substeps: u32,
    now: f64,
) -> Result<()> {
    debug_assert_eq!(tasks.len(), levels.len());
    debug_assert_eq!(tasks.len(), shares.len());
    debug_assert_eq!(tasks.len(), growth.len());

    let h = dt / substeps as f64;
    for i in 0..tasks.len() {
        let params = &tasks[i];
        let w = growth[i];
        let x = shares[i];
        let mut q = levels[i];

        for _ in 0..substeps {
            let k1 = derivative(params, w, q, x);
            let k2 = derivative(params, w, q + h / 2.0 * k1, x);
            let k3 = derivative(params, w, q + h / 2.0 * k2, x);
            let k4 = derivative(params, w, q + h * k3, x);
            q += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        }

        if !q.is_finite() {
            return Err(SwarmError::NumericFault {
                task: TaskId(i as u32),
                time: now + dt,
                value: q,
            });
        }
        levels[i] = q;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TaskParams {
        TaskParams::foraging_default()
    }

    #[test]
    fn test_consumption_zero_at_zero_level() {
        let p = params();
        for x in [0.1, 0.25, 0.5, 1.0] {
            assert_eq!(consumption(&p, 0.0, x), 0.0);
        }
    }

    #[test]
    fn test_consumption_zero_at_zero_share() {
        let p = params();
        assert_eq!(consumption(&p, 50.0, 0.0), 0.0);

        // Also with beta = 0, where x^beta alone would be 0^0
        let mut p = params();
        p.beta = 0.0;
        assert_eq!(consumption(&p, 50.0, 0.0), 0.0);
    }

    #[test]
    fn test_consumption_increases_with_level_and_saturates() {
        let p = params();
        let low = consumption(&p, 10.0, 0.5);
        let high = consumption(&p, 100.0, 0.5);
        assert!(high > low, "consumption should grow with resource level");

        // Saturation: the tanh bound caps F at rate * x^beta
        let cap = p.rate * 0.5f64.powf(p.beta);
        let huge = consumption(&p, 1e6, 0.5);
        assert!(huge <= cap + 1e-9);
        assert!(huge > 0.99 * cap);
    }

    #[test]
    fn test_equilibrium_balances_growth() {
        let p = params();
        let share = 0.25;
        let growth = 0.5;
        let q_star = equilibrium_level(&p, share, growth).expect("saturable task");
        let f = consumption(&p, q_star, share);
        assert!(
            (f - growth).abs() < 1e-9,
            "F(q*, x) = {} should equal w = {}",
            f,
            growth
        );
    }

    #[test]
    fn test_equilibrium_unsaturable() {
        let p = params();
        // Growth beyond the consumption cap: no equilibrium
        assert!(equilibrium_level(&p, 0.25, 100.0).is_none());
        // Nobody serving the task: no equilibrium
        assert!(equilibrium_level(&p, 0.0, 0.5).is_none());
    }

    #[test]
    fn test_integration_approaches_equilibrium() {
        let tasks = vec![params()];
        let growth = vec![0.5];
        let shares = vec![0.25];
        let mut levels = vec![0.0];

        let q_star = equilibrium_level(&tasks[0], shares[0], growth[0]).unwrap();

        let mut t = 0.0;
        for _ in 0..40_000 {
            integrate(&tasks, &growth, &mut levels, &shares, 0.5, 4, t).unwrap();
            t += 0.5;
        }

        assert!(
            (levels[0] - q_star).abs() < 0.05 * q_star.abs().max(1.0),
            "level {} should approach equilibrium {}",
            levels[0],
            q_star
        );
    }

    #[test]
    fn test_integration_empty_task_grows_linearly() {
        let tasks = vec![params()];
        let growth = vec![0.5];
        let shares = vec![0.0];
        let mut levels = vec![0.0];

        integrate(&tasks, &growth, &mut levels, &shares, 10.0, 20, 0.0).unwrap();

        // With F = 0 the dynamics reduce to q̇ = w exactly
        assert!((levels[0] - 5.0).abs() < 1e-9);
    }
}
