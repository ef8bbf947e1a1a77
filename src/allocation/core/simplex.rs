use super::error::AllocationError;

/// Euclidean projection onto `{x | x ≥ 0, Σx = s}` by sorting and water-filling
/// (Wang & Carreira-Perpiñán, 2013).
///
/// The projector owns its sort buffer so repeated projections of equally sized
/// vectors do not reallocate.
#[derive(Debug, Default, Clone)]
pub struct SimplexProjector {
    sorted: Vec<f64>,
}

impl SimplexProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threshold `θ` such that `max(y − θ, 0)` lies on the simplex.
    ///
    /// Fails when no prefix satisfies `u_ρ · (ρ+1) > cumsum_ρ − s`. With a sorted
    /// prefix this happens for `s ≤ 0` and for non-finite input.
    pub fn threshold(&mut self, y: &[f64], target: f64) -> Result<f64, AllocationError> {
        let degenerate = AllocationError::DegenerateProjection {
            target,
            len: y.len(),
        };
        if !target.is_finite() || target < 0.0 {
            return Err(degenerate);
        }

        self.sorted.clear();
        self.sorted.extend_from_slice(y);
        self.sorted.sort_by(|a, b| b.total_cmp(a));

        let mut cumsum = 0.0_f64;
        let mut rho: Option<(usize, f64)> = None;
        for (j, &u) in self.sorted.iter().enumerate() {
            cumsum += u;
            if u * (j + 1) as f64 > cumsum - target {
                rho = Some((j, cumsum));
            }
        }

        let (rho, cumsum_rho) = rho.ok_or(degenerate)?;
        Ok((cumsum_rho - target) / (rho + 1) as f64)
    }

    /// Project `y` onto the simplex in place.
    pub fn project_in_place(&mut self, y: &mut [f64], target: f64) -> Result<(), AllocationError> {
        let theta = self.threshold(y, target)?;
        for yi in y.iter_mut() {
            *yi = (*yi - theta).max(0.0);
        }
        Ok(())
    }
}

/// Nearest point to `y` among non-negative vectors summing to `target`.
pub fn project_to_simplex(y: &[f64], target: f64) -> Result<Vec<f64>, AllocationError> {
    let mut x = y.to_vec();
    SimplexProjector::new().project_in_place(&mut x, target)?;
    Ok(x)
}
