use super::config::{AllocationMethod, GradientConfig, zero_floor_error};
use super::error::AllocationError;
use super::simplex::SimplexProjector;
use super::types::{AllocationProblem, ContinuousAllocation};

/// Gradient of `Σ v_i/(m_i+n_min) + λ_i·m_i` written into `grad`.
pub(super) fn objective_gradient(problem: &AllocationProblem<'_>, m: &[f64], grad: &mut [f64]) {
    for (((g, &mi), &v), &lambda) in grad
        .iter_mut()
        .zip(m.iter())
        .zip(problem.variance.iter())
        .zip(problem.penalties.iter())
    {
        let n = mi + problem.n_min;
        *g = -v / (n * n) + lambda;
    }
}

pub(super) fn objective_value(problem: &AllocationProblem<'_>, m: &[f64]) -> f64 {
    m.iter()
        .zip(problem.variance.iter())
        .zip(problem.penalties.iter())
        .map(|((&mi, &v), &lambda)| v / (mi + problem.n_min) + lambda * mi)
        .sum()
}

/// Projected gradient descent from the uniform split.
///
/// Runs exactly `cfg.iterations` steps of `m ← P(m − lr·∇f)`. Step-size stability
/// is the caller's concern. A zero budget has the single feasible point `m = 0`
/// and returns it without iterating, since the projector has no threshold for it.
///
/// The floor must be positive: with `n_min = 0` the gradient has a pole at every
/// entry the projection clips to zero.
pub fn solve_projected_gradient(
    problem: &AllocationProblem<'_>,
    cfg: GradientConfig,
) -> Result<ContinuousAllocation, AllocationError> {
    if problem.n_min <= 0.0 {
        return Err(zero_floor_error());
    }

    let n = problem.len();
    let budget = problem.budget;

    if budget == 0.0 {
        tracing::debug!("zero additional budget; every element stays at the floor");
        return Ok(ContinuousAllocation {
            method: AllocationMethod::ProjectedGradient,
            additional: vec![0.0; n],
            shadow_price: None,
            iterations: 0,
        });
    }

    let mut m = vec![budget / n as f64; n];
    let mut grad = vec![0.0; n];
    let mut projector = SimplexProjector::new();

    for _ in 0..cfg.iterations {
        objective_gradient(problem, &m, &mut grad);
        for (mi, gi) in m.iter_mut().zip(grad.iter()) {
            *mi -= cfg.learning_rate * gi;
        }
        projector.project_in_place(&mut m, budget)?;
    }

    tracing::debug!(
        iterations = cfg.iterations,
        learning_rate = cfg.learning_rate,
        objective = objective_value(problem, &m),
        "projected gradient finished"
    );

    Ok(ContinuousAllocation {
        method: AllocationMethod::ProjectedGradient,
        additional: m,
        shadow_price: None,
        iterations: cfg.iterations,
    })
}
