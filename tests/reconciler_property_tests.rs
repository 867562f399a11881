//! Property tests for the location quantity reconciler.

use std::collections::BTreeMap;

use proptest::prelude::*;

use freigabe::{reconcile, validate_distribution, SubmissionPolicy, WorkflowError};

const SITES: [&str; 5] = ["Storkow", "Brenz", "Gransee", "Passow", "Dedelow"];

fn distribution_strategy() -> impl Strategy<Value = BTreeMap<String, f64>> {
    proptest::collection::btree_map(
        proptest::sample::select(SITES.to_vec()).prop_map(str::to_string),
        0.0f64..10_000.0,
        1..5,
    )
}

proptest! {
    #[test]
    fn distributed_total_is_the_sum(
        total in 1.0f64..100_000.0,
        distribution in distribution_strategy()
    ) {
        let result = reconcile(total, &distribution);
        let expected: f64 = distribution.values().sum();
        prop_assert!((result.distributed_total - expected).abs() < 1e-9);
    }

    #[test]
    fn over_distribution_flag_matches_comparison(
        total in 1.0f64..100_000.0,
        distribution in distribution_strategy()
    ) {
        let result = reconcile(total, &distribution);
        let sum: f64 = distribution.values().sum();
        if sum > total + 1e-3 {
            prop_assert!(result.is_over_distributed);
        }
        if sum <= total {
            prop_assert!(!result.is_over_distributed);
        }
    }

    #[test]
    fn strict_policy_never_accepts_over_distribution(
        total in 1.0f64..10_000.0,
        distribution in distribution_strategy()
    ) {
        match validate_distribution(total, &distribution, SubmissionPolicy::Strict) {
            Ok(result) => prop_assert!(!result.is_over_distributed),
            Err(WorkflowError::Validation(_)) => {}
            Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
        }
    }

    #[test]
    fn advisory_policy_accepts_any_positive_distribution(
        total in 1.0f64..10_000.0,
        distribution in distribution_strategy()
    ) {
        prop_assume!(distribution.values().any(|q| *q > 0.0));
        let result = validate_distribution(total, &distribution, SubmissionPolicy::Advisory);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn zero_sum_distributions_always_block(
        total in 1.0f64..10_000.0,
        site in proptest::sample::select(SITES.to_vec())
    ) {
        let mut distribution = BTreeMap::new();
        distribution.insert(site.to_string(), 0.0);
        for policy in [SubmissionPolicy::Strict, SubmissionPolicy::Advisory] {
            let result = validate_distribution(total, &distribution, policy);
            prop_assert!(matches!(result, Err(WorkflowError::Validation(_))));
        }
    }
}

#[test]
fn spec_examples() {
    let mut exact = BTreeMap::new();
    exact.insert("A".to_string(), 300.0);
    exact.insert("B".to_string(), 700.0);
    let result = reconcile(1000.0, &exact);
    assert_eq!(result.distributed_total, 1000.0);
    assert!(!result.is_over_distributed);

    let mut over = BTreeMap::new();
    over.insert("A".to_string(), 300.0);
    over.insert("B".to_string(), 800.0);
    let result = reconcile(1000.0, &over);
    assert_eq!(result.distributed_total, 1100.0);
    assert!(result.is_over_distributed);
}
