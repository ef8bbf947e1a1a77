use serde::Serialize;

use super::error::AllocationError;

pub const DEFAULT_GRID_WIDTH: usize = 784;
pub const DEFAULT_GRID_HEIGHT: usize = 784;
pub const DEFAULT_LAMBDA0: f64 = 0.1;
pub const DEFAULT_PENALTY_EPS: f64 = 1e-6;
pub const DEFAULT_N_MIN: u64 = 1;
pub const DEFAULT_SSP: u64 = 8;
pub const DEFAULT_BRACKET_LOW: f64 = -1e3;
pub const DEFAULT_BRACKET_HIGH_MARGIN: f64 = 1e-12;
pub const DEFAULT_BISECTION_ITERS: usize = 60;
pub const DEFAULT_GRADIENT_LR: f64 = 1.0;
pub const DEFAULT_GRADIENT_ITERS: usize = 1000;

/// Which numerical strategy produces the continuous relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Bisection on the shadow price with the closed-form stationary point.
    Kkt,
    /// Fixed-step gradient descent re-projected onto the budget simplex.
    ProjectedGradient,
}

impl AllocationMethod {
    pub fn label(self) -> &'static str {
        match self {
            Self::Kkt => "kkt",
            Self::ProjectedGradient => "gradient",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kkt" | "closed_form" | "closed-form" | "bisection" => Some(Self::Kkt),
            "gradient" | "pgd" | "projected_gradient" | "projected-gradient" => {
                Some(Self::ProjectedGradient)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PenaltyParams {
    /// Global penalty strength.
    pub lambda0: f64,
    /// Added to every variance before division.
    pub eps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetParams {
    /// Per-element floor on the sample count.
    pub n_min: u64,
    /// Desired average samples per element.
    pub ssp: u64,
}

impl BudgetParams {
    /// `N · ssp`, or `None` when it does not fit in a `u64`.
    pub fn checked_total(&self, elements: usize) -> Option<u64> {
        u64::try_from(elements).ok()?.checked_mul(self.ssp)
    }

    /// `N · ssp`, saturating. Validated configs never saturate.
    pub fn total(&self, elements: usize) -> u64 {
        self.checked_total(elements).unwrap_or(u64::MAX)
    }

    /// `N · ssp − N · n_min`, the samples distributed above the floor.
    pub fn additional(&self, elements: usize) -> u64 {
        let floor = (elements as u64).saturating_mul(self.n_min);
        self.total(elements).saturating_sub(floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KktConfig {
    /// Lower end of the shadow-price bracket.
    pub bracket_low: f64,
    /// Upper end sits this far below `min λ`.
    pub bracket_high_margin: f64,
    /// Bisection halvings; there is no early exit.
    pub iterations: usize,
}

impl Default for KktConfig {
    fn default() -> Self {
        Self {
            bracket_low: DEFAULT_BRACKET_LOW,
            bracket_high_margin: DEFAULT_BRACKET_HIGH_MARGIN,
            iterations: DEFAULT_BISECTION_ITERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientConfig {
    pub learning_rate: f64,
    /// Descent steps; there is no convergence test.
    pub iterations: usize,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_GRADIENT_LR,
            iterations: DEFAULT_GRADIENT_ITERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllocationConfig {
    pub element_count: usize,
    pub penalty: PenaltyParams,
    pub budget: BudgetParams,
    pub method: AllocationMethod,
    pub kkt: KktConfig,
    pub gradient: GradientConfig,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_GRID_WIDTH * DEFAULT_GRID_HEIGHT,
            penalty: PenaltyParams {
                lambda0: DEFAULT_LAMBDA0,
                eps: DEFAULT_PENALTY_EPS,
            },
            budget: BudgetParams {
                n_min: DEFAULT_N_MIN,
                ssp: DEFAULT_SSP,
            },
            method: AllocationMethod::Kkt,
            kkt: KktConfig::default(),
            gradient: GradientConfig::default(),
        }
    }
}

impl AllocationConfig {
    /// Config for a problem of `element_count` elements with the reference parameters.
    pub fn for_elements(element_count: usize) -> Self {
        Self {
            element_count,
            ..Self::default()
        }
    }

    pub fn with_method(self, method: AllocationMethod) -> Self {
        Self { method, ..self }
    }

    pub fn total_samples(&self) -> u64 {
        self.budget.total(self.element_count)
    }

    pub fn additional_budget(&self) -> u64 {
        self.budget.additional(self.element_count)
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        if self.element_count == 0 {
            return Err(invalid("element_count", self.element_count));
        }
        if self.budget.checked_total(self.element_count).is_none() {
            return Err(invalid(
                "ssp",
                format!(
                    "{} (total for {} elements overflows u64)",
                    self.budget.ssp, self.element_count
                ),
            ));
        }
        if self.budget.ssp < self.budget.n_min {
            return Err(invalid(
                "ssp",
                format!("{} (below n_min {})", self.budget.ssp, self.budget.n_min),
            ));
        }
        if !(self.penalty.lambda0.is_finite() && self.penalty.lambda0 > 0.0) {
            return Err(invalid("lambda0", self.penalty.lambda0));
        }
        if !(self.penalty.eps.is_finite() && self.penalty.eps > 0.0) {
            return Err(invalid("eps", self.penalty.eps));
        }
        if !self.kkt.bracket_low.is_finite() {
            return Err(invalid("bracket_low", self.kkt.bracket_low));
        }
        if !(self.kkt.bracket_high_margin.is_finite() && self.kkt.bracket_high_margin >= 0.0) {
            return Err(invalid("bracket_high_margin", self.kkt.bracket_high_margin));
        }
        if !(self.gradient.learning_rate.is_finite() && self.gradient.learning_rate > 0.0) {
            return Err(invalid("learning_rate", self.gradient.learning_rate));
        }
        if self.method == AllocationMethod::ProjectedGradient && self.budget.n_min == 0 {
            return Err(zero_floor_error());
        }
        Ok(())
    }
}

/// `v/(m+n_min)` has a pole at `m = 0` when the floor is zero, which the
/// fixed-step descent cannot cross. The closed form has no such restriction.
pub(super) fn zero_floor_error() -> AllocationError {
    invalid("n_min", "0 (projected gradient needs a positive floor)")
}

fn invalid(name: &'static str, value: impl ToString) -> AllocationError {
    AllocationError::InvalidConfig {
        name,
        value: value.to_string(),
    }
}
