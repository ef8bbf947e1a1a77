use super::error::AllocationError;

/// Largest-remainder rounding of `n` to integers summing to exactly `total`.
///
/// Every entry is floored, then the `total − Σ⌊n⌋` entries with the largest
/// fractional parts get one more sample. Ties go to the lower index. A
/// shortfall outside `[0, len]` or a final sum off `total` is an error; no
/// partial result is returned.
pub fn largest_remainder_round(n: &[f64], total: u64) -> Result<Vec<u64>, AllocationError> {
    if let Some((index, &value)) = n
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(AllocationError::InvalidAllocationEntry { index, value });
    }

    let floors: Vec<f64> = n.iter().map(|v| v.floor()).collect();
    let mut rounded: Vec<u64> = floors.iter().map(|&f| f as u64).collect();
    let floor_sum: u128 = rounded.iter().map(|&r| r as u128).sum();

    let shortfall = total as i128 - floor_sum as i128;
    if shortfall < 0 || shortfall > n.len() as i128 {
        return Err(AllocationError::RoundingShortfall {
            shortfall,
            elements: n.len(),
        });
    }

    let mut order: Vec<usize> = (0..n.len()).collect();
    // Stable: equal remainders keep index order.
    order.sort_by(|&a, &b| {
        let ra = n[a] - floors[a];
        let rb = n[b] - floors[b];
        rb.total_cmp(&ra)
    });
    for &i in order.iter().take(shortfall as usize) {
        rounded[i] += 1;
    }

    let actual: u64 = rounded.iter().sum();
    if actual != total {
        return Err(AllocationError::RoundingSumMismatch {
            expected: total,
            actual,
        });
    }
    Ok(rounded)
}
