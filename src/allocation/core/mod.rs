pub mod diagnostics;
mod allocator;
mod config;
mod error;
mod gradient;
mod kkt;
mod penalty;
mod rounding;
mod simplex;
mod types;

pub use allocator::{allocate, allocate_with_method, round_allocation};
pub use config::{
    AllocationConfig, AllocationMethod, BudgetParams, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    GradientConfig, KktConfig, PenaltyParams,
};
pub use error::{AllocationError, BudgetBound};
pub use gradient::solve_projected_gradient;
pub use kkt::{compute_sum_m, shadow_price_bracket, solve_kkt, stationary_allocation};
pub use penalty::penalty_coefficients;
pub use rounding::largest_remainder_round;
pub use simplex::{SimplexProjector, project_to_simplex};
pub use types::{AllocationOutcome, AllocationProblem, ContinuousAllocation};

#[cfg(test)]
#[path = "../tests.rs"]
mod tests;
