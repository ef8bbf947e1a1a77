use super::config::{AllocationMethod, KktConfig};
use super::error::{AllocationError, BudgetBound};
use super::types::{AllocationProblem, ContinuousAllocation};

/// Stationary point of `v_i/(m_i+n_min) + λ_i·m_i − γ·m_i` clipped at zero.
/// Elements whose penalty does not exceed the shadow price get nothing.
fn stationary_component(v: f64, lambda: f64, n_min: f64, gamma: f64) -> f64 {
    let denom = lambda - gamma;
    if denom > 0.0 {
        ((v / denom).sqrt() - n_min).max(0.0)
    } else {
        0.0
    }
}

pub(super) fn stationary_allocation_into(
    problem: &AllocationProblem<'_>,
    gamma: f64,
    out: &mut [f64],
) {
    for ((m, &v), &lambda) in out
        .iter_mut()
        .zip(problem.variance.iter())
        .zip(problem.penalties.iter())
    {
        *m = stationary_component(v, lambda, problem.n_min, gamma);
    }
}

/// Closed-form allocation for a given shadow price.
pub fn stationary_allocation(problem: &AllocationProblem<'_>, gamma: f64) -> Vec<f64> {
    let mut out = vec![0.0; problem.len()];
    stationary_allocation_into(problem, gamma, &mut out);
    out
}

/// Total closed-form allocation at `gamma`. Non-decreasing in `gamma` below `min λ`.
pub fn compute_sum_m(problem: &AllocationProblem<'_>, gamma: f64) -> f64 {
    problem
        .variance
        .iter()
        .zip(problem.penalties.iter())
        .map(|(&v, &lambda)| stationary_component(v, lambda, problem.n_min, gamma))
        .sum()
}

/// Shadow-price bracket `[low, min λ − margin]`.
pub fn shadow_price_bracket(problem: &AllocationProblem<'_>, cfg: KktConfig) -> (f64, f64) {
    (cfg.bracket_low, problem.min_penalty() - cfg.bracket_high_margin)
}

/// Bisect the shadow price `γ` until the closed form spends the budget.
///
/// The bracket ends are checked before any halving: a budget outside
/// `[sum_m(low), sum_m(high)]` is reported instead of bisected. The loop always
/// runs `cfg.iterations` halvings.
pub fn solve_kkt(
    problem: &AllocationProblem<'_>,
    cfg: KktConfig,
) -> Result<ContinuousAllocation, AllocationError> {
    let budget = problem.budget;
    let (mut low, mut high) = shadow_price_bracket(problem, cfg);

    let sum_low = compute_sum_m(problem, low);
    if sum_low > budget {
        return Err(AllocationError::InfeasibleBudget {
            bound: BudgetBound::BelowReach,
            budget,
            reachable: sum_low,
        });
    }
    let sum_high = compute_sum_m(problem, high);
    if sum_high < budget {
        return Err(AllocationError::InfeasibleBudget {
            bound: BudgetBound::AboveReach,
            budget,
            reachable: sum_high,
        });
    }
    tracing::debug!(low, high, sum_low, sum_high, budget, "shadow-price bracket");

    for _ in 0..cfg.iterations {
        let mid = 0.5 * (low + high);
        if compute_sum_m(problem, mid) > budget {
            high = mid;
        } else {
            low = mid;
        }
    }

    let gamma = 0.5 * (low + high);
    let additional = stationary_allocation(problem, gamma);
    tracing::debug!(
        gamma,
        iterations = cfg.iterations,
        residual = additional.iter().sum::<f64>() - budget,
        "kkt bisection finished"
    );

    Ok(ContinuousAllocation {
        method: AllocationMethod::Kkt,
        additional,
        shadow_price: Some(gamma),
        iterations: cfg.iterations,
    })
}
