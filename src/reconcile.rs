use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::roles::Location;

/// Tolerance for comparing distributed sums against the requested total.
/// Quantities are entered with at most three decimal places.
const QUANTITY_EPSILON: f64 = 1e-6;

/// How strictly a distribution is validated against the total.
///
/// Original submission blocks over-distribution outright; review-stage
/// corrections only warn, since planning may legitimately exceed the
/// original total pending sales renegotiation. The asymmetry is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPolicy {
    /// Over-distribution blocks the operation (creation / resubmission).
    Strict,
    /// Over-distribution is surfaced as a warning only (corrections).
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWarning {
    pub location: String,
    pub message: String,
}

/// Result of reconciling a per-location distribution against a total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub distributed_total: f64,
    pub is_over_distributed: bool,
    pub warnings: Vec<LocationWarning>,
}

/// Sum a distribution and flag over-distribution. Under-distribution is
/// allowed; the remainder stays unassigned until planning fills it.
pub fn reconcile(total_quantity: f64, distribution: &BTreeMap<String, f64>) -> Reconciliation {
    let distributed_total: f64 = distribution.values().sum();
    let is_over_distributed = distributed_total > total_quantity + QUANTITY_EPSILON;

    let mut warnings = Vec::new();
    for (name, quantity) in distribution {
        if Location::resolve(name).is_none() {
            warnings.push(LocationWarning {
                location: name.clone(),
                message: format!("'{name}' is not a recognized site name"),
            });
        }
        if *quantity < 0.0 {
            warnings.push(LocationWarning {
                location: name.clone(),
                message: format!("negative quantity {quantity} for '{name}'"),
            });
        }
    }
    if is_over_distributed {
        warnings.push(LocationWarning {
            location: String::new(),
            message: format!(
                "distributed {distributed_total} exceeds total quantity {total_quantity}"
            ),
        });
    }

    Reconciliation {
        distributed_total,
        is_over_distributed,
        warnings,
    }
}

/// Validate a distribution for a workflow operation.
///
/// Blocks everywhere: negative quantities, zero-sum distributions (at least
/// one site must receive a positive share). Blocks under `Strict` only:
/// over-distribution.
pub fn validate_distribution(
    total_quantity: f64,
    distribution: &BTreeMap<String, f64>,
    policy: SubmissionPolicy,
) -> Result<Reconciliation, WorkflowError> {
    if total_quantity <= 0.0 {
        return Err(WorkflowError::validation(
            "total quantity must be positive",
        ));
    }
    if distribution.values().any(|q| *q < 0.0) {
        return Err(WorkflowError::validation(
            "location quantities must be non-negative",
        ));
    }
    if !distribution.values().any(|q| *q > 0.0) {
        return Err(WorkflowError::validation(
            "at least one location must receive a positive share",
        ));
    }

    let reconciliation = reconcile(total_quantity, distribution);
    if reconciliation.is_over_distributed && policy == SubmissionPolicy::Strict {
        return Err(WorkflowError::validation(format!(
            "distributed total {} exceeds requested quantity {}",
            reconciliation.distributed_total, total_quantity
        )));
    }

    Ok(reconciliation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(name, qty)| (name.to_string(), *qty))
            .collect()
    }

    #[test]
    fn test_exact_distribution() {
        let result = reconcile(1000.0, &dist(&[("Storkow", 300.0), ("Brenz", 700.0)]));
        assert_eq!(result.distributed_total, 1000.0);
        assert!(!result.is_over_distributed);
    }

    #[test]
    fn test_over_distribution_flagged() {
        let result = reconcile(1000.0, &dist(&[("Storkow", 300.0), ("Brenz", 800.0)]));
        assert_eq!(result.distributed_total, 1100.0);
        assert!(result.is_over_distributed);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_under_distribution_allowed() {
        let result = validate_distribution(
            1000.0,
            &dist(&[("Storkow", 200.0)]),
            SubmissionPolicy::Strict,
        )
        .unwrap();
        assert_eq!(result.distributed_total, 200.0);
        assert!(!result.is_over_distributed);
    }

    #[test]
    fn test_zero_sum_blocks_everywhere() {
        for policy in [SubmissionPolicy::Strict, SubmissionPolicy::Advisory] {
            let err = validate_distribution(
                1000.0,
                &dist(&[("Storkow", 0.0), ("Brenz", 0.0)]),
                policy,
            )
            .unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)));
        }
    }

    #[test]
    fn test_over_distribution_blocks_strict_only() {
        let over = dist(&[("Storkow", 600.0), ("Brenz", 600.0)]);

        let err = validate_distribution(1000.0, &over, SubmissionPolicy::Strict).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let result = validate_distribution(1000.0, &over, SubmissionPolicy::Advisory).unwrap();
        assert!(result.is_over_distributed);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("exceeds total quantity")));
    }

    #[test]
    fn test_unrecognized_site_warns() {
        let result = reconcile(100.0, &dist(&[("Atlantis", 50.0)]));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location, "Atlantis");
    }

    #[test]
    fn test_negative_quantity_blocks() {
        let err = validate_distribution(
            100.0,
            &dist(&[("Storkow", -5.0), ("Brenz", 50.0)]),
            SubmissionPolicy::Advisory,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
