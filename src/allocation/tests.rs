use super::diagnostics::{AllocationDivergence, AllocationSummary};
use super::{
    AllocationConfig, AllocationError, AllocationMethod, AllocationProblem, BudgetBound,
    BudgetParams, ContinuousAllocation, allocate, allocate_with_method, round_allocation,
    solve_kkt,
};

use fixtures::*;


#[test]
fn test_uniform_variance_allocates_ssp_everywhere() {
    let v = [1.0, 1.0, 1.0, 1.0];
    let cfg = config_for(4, 1, 8);
    assert_eq!(cfg.additional_budget(), 28);

    for method in BOTH_METHODS {
        let outcome = allocate_with_method(&v, &cfg, method).unwrap();
        assert_eq!(outcome.samples, vec![8, 8, 8, 8], "method {method:?}");
        assert_eq!(outcome.total, 32);
        for m in &outcome.continuous.additional {
            assert!((m - 7.0).abs() < 1e-9, "method {method:?}: m = {m}");
        }
    }
}

#[test]
fn test_spread_variance_matches_reference_integers() {
    let v = spread_variance();
    let cfg = config_for(v.len(), 1, 6);

    for method in BOTH_METHODS {
        let outcome = allocate_with_method(&v, &cfg, method).unwrap();
        assert_eq!(outcome.samples, vec![5, 1, 10, 1, 3, 16], "method {method:?}");
        assert_allocation_invariants(&outcome.samples, 1, 36);
    }
}

#[test]
fn test_strategies_agree_on_radial_field() {
    let v = radial_variance(6, 4);
    let cfg = config_for(v.len(), 2, 5);

    let kkt = allocate_with_method(&v, &cfg, AllocationMethod::Kkt).unwrap();
    let gradient = allocate_with_method(&v, &cfg, AllocationMethod::ProjectedGradient).unwrap();
    assert_allocation_invariants(&kkt.samples, 2, 120);
    assert_allocation_invariants(&gradient.samples, 2, 120);

    let divergence = AllocationDivergence::between(&kkt, &gradient);
    assert!(
        divergence.max_continuous_gap < 1e-3,
        "strategies diverged: {divergence:?}"
    );
    assert_eq!(divergence.integer_l1, 0);
    assert_eq!(kkt.samples[8], 16);
    assert_eq!(kkt.samples[0], 2);
}

#[test]
fn test_budget_is_exact_on_larger_grid() {
    let v = radial_variance(8, 8);
    let cfg = config_for(v.len(), 1, 8);

    for method in BOTH_METHODS {
        let outcome = allocate_with_method(&v, &cfg, method).unwrap();
        assert_allocation_invariants(&outcome.samples, 1, 512);
        let continuous_sum = outcome.continuous.sum();
        assert!(
            (continuous_sum - 448.0).abs() < 1e-6,
            "method {method:?}: continuous sum {continuous_sum}"
        );
    }
}

#[test]
fn test_higher_variance_never_gets_fewer_samples() {
    let v = radial_variance(8, 8);
    let cfg = config_for(v.len(), 1, 8);
    let problem = AllocationProblem::new(&v, &cfg).unwrap();
    let sol = solve_kkt(&problem, cfg.kkt).unwrap();

    for i in 0..v.len() {
        for j in 0..v.len() {
            if v[i] > v[j] {
                assert!(
                    sol.additional[i] >= sol.additional[j],
                    "v[{i}]={} > v[{j}]={} but m {} < {}",
                    v[i],
                    v[j],
                    sol.additional[i],
                    sol.additional[j]
                );
            }
        }
    }
}

#[test]
fn test_reruns_are_bit_identical() {
    let v = radial_variance(6, 4);
    let cfg = config_for(v.len(), 1, 6);

    for method in BOTH_METHODS {
        let first = allocate_with_method(&v, &cfg, method).unwrap();
        let second = allocate_with_method(&v, &cfg, method).unwrap();
        assert_eq!(first.samples, second.samples);
        assert_eq!(first.continuous, second.continuous);
    }
}

#[test]
fn test_symmetric_field_rounds_symmetrically() {
    // Ties between mirrored elements are broken by index, so the rounded
    // allocation can differ between mirror images by at most one sample.
    let v = radial_variance(8, 8);
    let cfg = config_for(v.len(), 1, 8);
    let outcome = allocate(&v, &cfg).unwrap();
    for j in 0..8 {
        for i in 0..8 {
            let a = outcome.samples[j * 8 + i];
            let b = outcome.samples[j * 8 + (7 - i)];
            assert!(a.abs_diff(b) <= 1, "({i},{j}): {a} vs {b}");
        }
    }
}

#[test]
fn test_shape_mismatch_is_rejected_before_solving() {
    let v = [1.0, 2.0, 3.0];
    let cfg = config_for(4, 1, 8);
    let err = allocate(&v, &cfg).unwrap_err();
    assert_eq!(
        err,
        AllocationError::InputShape {
            expected: 4,
            actual: 3
        }
    );
}

#[test]
fn test_infeasible_budget_surfaces_through_pipeline() {
    let v = [0.0, 0.0];
    let cfg = config_for(2, 1, 3);
    let err = allocate(&v, &cfg).unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InfeasibleBudget {
            bound: BudgetBound::AboveReach,
            ..
        }
    ));

    let v = [1e6, 1e6, 1e6];
    let cfg = config_for(3, 2, 2);
    let err = allocate(&v, &cfg).unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InfeasibleBudget {
            bound: BudgetBound::BelowReach,
            ..
        }
    ));
}

#[test]
fn test_zero_budget_keeps_everyone_at_floor() {
    let v = [0.5, 0.2, 0.9];
    let cfg = config_for(3, 3, 3);
    for method in BOTH_METHODS {
        let outcome = allocate_with_method(&v, &cfg, method).unwrap();
        assert_eq!(outcome.samples, vec![3, 3, 3], "method {method:?}");
    }
}

#[test]
fn test_zero_floor_is_supported_by_closed_form() {
    let v = spread_variance();
    let cfg = config_for(v.len(), 0, 4);
    let outcome = allocate_with_method(&v, &cfg, AllocationMethod::Kkt).unwrap();
    assert_allocation_invariants(&outcome.samples, 0, 24);
}

#[test]
fn test_zero_floor_is_refused_by_gradient_strategy() {
    let v = spread_variance();
    let cfg = config_for(v.len(), 0, 4);
    let err = allocate_with_method(&v, &cfg, AllocationMethod::ProjectedGradient).unwrap_err();
    assert!(
        matches!(err, AllocationError::InvalidConfig { name: "n_min", .. }),
        "unexpected error: {err}"
    );

    let err = allocate(&v, &cfg.with_method(AllocationMethod::ProjectedGradient)).unwrap_err();
    assert!(matches!(err, AllocationError::InvalidConfig { name: "n_min", .. }));

    let kkt = allocate_with_method(&v, &cfg, AllocationMethod::Kkt).unwrap();
    assert_allocation_invariants(&kkt.samples, 0, 24);
}

#[test]
fn test_round_allocation_checks_length() {
    let v = [1.0, 1.0];
    let cfg = config_for(2, 1, 2);
    let problem = AllocationProblem::new(&v, &cfg).unwrap();
    let bogus = ContinuousAllocation {
        method: AllocationMethod::Kkt,
        additional: vec![1.0, 0.5, 0.5],
        shadow_price: None,
        iterations: 0,
    };
    assert!(matches!(
        round_allocation(&problem, &bogus),
        Err(AllocationError::InputShape { .. })
    ));
}

#[test]
fn test_short_gradient_run_stays_feasible() {
    let v = spread_variance();
    let mut cfg = config_for(v.len(), 1, 6);
    cfg.gradient.iterations = 3;

    let gradient = allocate_with_method(&v, &cfg, AllocationMethod::ProjectedGradient).unwrap();
    assert_eq!(gradient.continuous.iterations, 3);
    assert_allocation_invariants(&gradient.samples, 1, 36);
}

#[test]
fn test_truncated_bisection_is_caught_by_rounding() {
    // Five halvings leave γ far below the root, so the closed form spends
    // almost nothing and the rounding shortfall exceeds the element count.
    let v = spread_variance();
    let mut cfg = config_for(v.len(), 1, 6);
    cfg.kkt.iterations = 5;

    let err = allocate_with_method(&v, &cfg, AllocationMethod::Kkt).unwrap_err();
    assert!(
        matches!(err, AllocationError::RoundingShortfall { elements: 6, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn test_summary_reflects_outcome() {
    let v = spread_variance();
    let cfg = AllocationConfig {
        budget: BudgetParams { n_min: 1, ssp: 6 },
        ..AllocationConfig::for_elements(v.len())
    };
    let outcome = allocate(&v, &cfg).unwrap();
    let summary = AllocationSummary::from_samples(&outcome.samples);
    assert_eq!(summary.sum, 36);
    assert_eq!(summary.min, 1);
    assert_eq!(summary.max, 16);
    assert_eq!(summary.distinct, vec![(1, 2), (3, 1), (5, 1), (10, 1), (16, 1)]);
}
