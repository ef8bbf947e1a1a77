use serde::Serialize;

use super::config::{AllocationConfig, AllocationMethod};
use super::error::AllocationError;
use super::penalty::penalty_coefficients;

/// Validated solver input: variances, their penalties, and the budget split.
#[derive(Debug, Clone)]
pub struct AllocationProblem<'a> {
    pub(super) variance: &'a [f64],
    pub(super) penalties: Vec<f64>,
    pub(super) n_min: f64,
    pub(super) budget: f64,
    pub(super) total: u64,
}

impl<'a> AllocationProblem<'a> {
    pub fn new(variance: &'a [f64], cfg: &AllocationConfig) -> Result<Self, AllocationError> {
        cfg.validate()?;
        if variance.len() != cfg.element_count {
            return Err(AllocationError::InputShape {
                expected: cfg.element_count,
                actual: variance.len(),
            });
        }

        Ok(Self {
            variance,
            penalties: penalty_coefficients(variance, cfg.penalty),
            n_min: cfg.budget.n_min as f64,
            budget: cfg.additional_budget() as f64,
            total: cfg.total_samples(),
        })
    }

    pub fn len(&self) -> usize {
        self.variance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variance.is_empty()
    }

    pub fn variance(&self) -> &[f64] {
        self.variance
    }

    pub fn penalties(&self) -> &[f64] {
        &self.penalties
    }

    /// Samples to distribute above the per-element floor.
    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn n_min(&self) -> f64 {
        self.n_min
    }

    /// Exact integer total the rounded allocation must hit.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub(super) fn min_penalty(&self) -> f64 {
        self.penalties.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Continuous relaxation produced by either strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousAllocation {
    pub method: AllocationMethod,
    /// Samples above `n_min` per element; sums to the additional budget.
    pub additional: Vec<f64>,
    /// Final shadow price, when the strategy computes one.
    pub shadow_price: Option<f64>,
    pub iterations: usize,
}

impl ContinuousAllocation {
    /// `n = m + n_min`
    pub fn with_floor(&self, n_min: f64) -> Vec<f64> {
        self.additional.iter().map(|m| m + n_min).collect()
    }

    pub fn sum(&self) -> f64 {
        self.additional.iter().sum()
    }
}

/// Integer allocation plus the continuous solution it was rounded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationOutcome {
    pub continuous: ContinuousAllocation,
    pub samples: Vec<u64>,
    pub total: u64,
    pub solve_secs: f64,
}

impl AllocationOutcome {
    pub fn method(&self) -> AllocationMethod {
        self.continuous.method
    }
}
