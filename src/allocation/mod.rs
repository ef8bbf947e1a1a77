mod core;

pub use self::core::diagnostics::{
    AllocationDivergence, AllocationReport, AllocationSummary, Histogram, HistogramSpec,
    TraceConfig, print_allocation_summary, print_divergence, print_histogram,
};
pub use self::core::{
    AllocationConfig, AllocationError, AllocationMethod, AllocationOutcome, AllocationProblem,
    BudgetBound, BudgetParams, ContinuousAllocation, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    GradientConfig, KktConfig, PenaltyParams, SimplexProjector, allocate, allocate_with_method,
    compute_sum_m, largest_remainder_round, penalty_coefficients, project_to_simplex,
    round_allocation, shadow_price_bracket, solve_kkt, solve_projected_gradient,
    stationary_allocation,
};
