use std::fmt;

/// Which side of the reachable range a requested budget fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetBound {
    /// Even the lowest shadow price allocates more than the budget.
    BelowReach,
    /// Even the highest shadow price allocates less than the budget.
    AboveReach,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AllocationError {
    InvalidConfig {
        name: &'static str,
        value: String,
    },
    InputShape {
        expected: usize,
        actual: usize,
    },
    InfeasibleBudget {
        bound: BudgetBound,
        budget: f64,
        reachable: f64,
    },
    DegenerateProjection {
        target: f64,
        len: usize,
    },
    InvalidAllocationEntry {
        index: usize,
        value: f64,
    },
    RoundingShortfall {
        shortfall: i128,
        elements: usize,
    },
    RoundingSumMismatch {
        expected: u64,
        actual: u64,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { name, value } => {
                write!(f, "invalid allocation parameter {name}={value}")
            }
            Self::InputShape { expected, actual } => write!(
                f,
                "variance vector has {actual} elements, expected {expected}"
            ),
            Self::InfeasibleBudget {
                bound: BudgetBound::BelowReach,
                budget,
                reachable,
            } => write!(
                f,
                "budget {budget} too small: lowest shadow price already allocates {reachable}"
            ),
            Self::InfeasibleBudget {
                bound: BudgetBound::AboveReach,
                budget,
                reachable,
            } => write!(
                f,
                "budget {budget} too large: highest shadow price only allocates {reachable}"
            ),
            Self::DegenerateProjection { target, len } => write!(
                f,
                "simplex projection of {len} elements onto sum {target} has no valid threshold"
            ),
            Self::InvalidAllocationEntry { index, value } => write!(
                f,
                "continuous allocation entry {index} is negative or non-finite: {value}"
            ),
            Self::RoundingShortfall {
                shortfall,
                elements,
            } => write!(
                f,
                "largest-remainder shortfall {shortfall} outside [0, {elements}]"
            ),
            Self::RoundingSumMismatch { expected, actual } => write!(
                f,
                "rounded allocation sums to {actual}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for AllocationError {}
