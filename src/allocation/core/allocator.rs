use std::time::Instant;

use super::config::{AllocationConfig, AllocationMethod};
use super::error::AllocationError;
use super::gradient::solve_projected_gradient;
use super::kkt::solve_kkt;
use super::rounding::largest_remainder_round;
use super::types::{AllocationOutcome, AllocationProblem, ContinuousAllocation};

impl AllocationMethod {
    /// Continuous relaxation of `problem` with this strategy's settings from `cfg`.
    pub fn solve_continuous(
        self,
        problem: &AllocationProblem<'_>,
        cfg: &AllocationConfig,
    ) -> Result<ContinuousAllocation, AllocationError> {
        match self {
            Self::Kkt => solve_kkt(problem, cfg.kkt),
            Self::ProjectedGradient => solve_projected_gradient(problem, cfg.gradient),
        }
    }
}

/// Round a continuous solution of `problem` to integers summing to `problem.total()`.
pub fn round_allocation(
    problem: &AllocationProblem<'_>,
    continuous: &ContinuousAllocation,
) -> Result<Vec<u64>, AllocationError> {
    if continuous.additional.len() != problem.len() {
        return Err(AllocationError::InputShape {
            expected: problem.len(),
            actual: continuous.additional.len(),
        });
    }
    largest_remainder_round(&continuous.with_floor(problem.n_min()), problem.total())
}

/// Full pipeline with the strategy named in `cfg.method`.
pub fn allocate(
    variance: &[f64],
    cfg: &AllocationConfig,
) -> Result<AllocationOutcome, AllocationError> {
    allocate_with_method(variance, cfg, cfg.method)
}

/// Variance vector → penalties → continuous solve → largest-remainder rounding.
pub fn allocate_with_method(
    variance: &[f64],
    cfg: &AllocationConfig,
    method: AllocationMethod,
) -> Result<AllocationOutcome, AllocationError> {
    let problem = AllocationProblem::new(variance, cfg)?;

    let start = Instant::now();
    let continuous = method.solve_continuous(&problem, cfg)?;
    let solve_secs = start.elapsed().as_secs_f64();

    let samples = round_allocation(&problem, &continuous)?;
    tracing::debug!(
        method = method.label(),
        elements = problem.len(),
        total = problem.total(),
        solve_secs,
        "allocation rounded"
    );

    Ok(AllocationOutcome {
        continuous,
        samples,
        total: problem.total(),
        solve_secs,
    })
}
