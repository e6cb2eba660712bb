//! Empirical order-of-convergence computation.

use crate::domain::error::AnalysisError;
use crate::domain::models::ConvergenceMode;

/// Compute per-pair convergence orders for an ordered `(independent,
/// error)` series. The result has length `len - 1`.
///
/// The refinement ratio between consecutive points depends on the mode:
/// grid spacing uses `h[i-1] / h[i]`; polynomial degree uses
/// `(p[i-1] + 1) / (p[i] + 1)`, since an order-p polynomial carries p+1
/// degrees of freedom along the axis. When the earlier error is exactly
/// zero the order is defined as `0.0`: there is no error left to measure
/// a rate from, and neither NaN nor infinity should propagate into the
/// report.
pub fn order(
    independent: &[f64],
    errors: &[f64],
    mode: ConvergenceMode,
) -> Result<Vec<f64>, AnalysisError> {
    if independent.len() != errors.len() {
        return Err(AnalysisError::LengthMismatch {
            independent: independent.len(),
            errors: errors.len(),
        });
    }

    let mut orders = Vec::with_capacity(independent.len().saturating_sub(1));
    for i in 1..independent.len() {
        let ratio = match mode {
            ConvergenceMode::GridSpacing => independent[i - 1] / independent[i],
            ConvergenceMode::PolynomialDegree => {
                (independent[i - 1] + 1.0) / (independent[i] + 1.0)
            }
        };
        let value = if errors[i - 1] == 0.0 {
            0.0
        } else {
            (errors[i] / errors[i - 1]).ln() / (1.0 / ratio).ln()
        };
        orders.push(value);
    }
    Ok(orders)
}

/// Arithmetic mean of a computed order sequence. Empty input yields `0.0`.
pub fn mean_order(orders: &[f64]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    orders.iter().sum::<f64>() / orders.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_halving_recovers_expected_order() {
        // Errors drop by 100x when h halves: order = log(100)/log(2).
        let orders = order(&[0.1, 0.05], &[1e-2, 1e-4], ConvergenceMode::GridSpacing).unwrap();
        assert_eq!(orders.len(), 1);
        assert!((orders[0] - 100f64.ln() / 2f64.ln()).abs() < 1e-12);
        assert!((orders[0] - 6.64).abs() < 0.01);
    }

    #[test]
    fn result_length_is_input_length_minus_one() {
        let orders = order(
            &[0.4, 0.2, 0.1, 0.05],
            &[1e-1, 1e-2, 1e-3, 1e-4],
            ConvergenceMode::GridSpacing,
        )
        .unwrap();
        assert_eq!(orders.len(), 3);
    }

    #[test]
    fn zero_prior_error_yields_exactly_zero() {
        let orders = order(&[0.1, 0.05], &[0.0, 1e-4], ConvergenceMode::GridSpacing).unwrap();
        assert_eq!(orders[0], 0.0);
    }

    #[test]
    fn length_mismatch_is_an_explicit_error() {
        let err = order(&[0.1, 0.05], &[1e-2], ConvergenceMode::GridSpacing).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LengthMismatch {
                independent: 2,
                errors: 1
            }
        );
    }

    #[test]
    fn polynomial_degree_ratio_counts_dofs() {
        // p: 1 -> 3 doubles the DOF count; ratio (p0+1)/(p1+1) = 1/2.
        let orders = order(&[1.0, 3.0], &[1e-2, 1e-4], ConvergenceMode::PolynomialDegree).unwrap();
        let expected = (1e-4f64 / 1e-2).ln() / (2.0f64).ln();
        assert!((orders[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn mean_order_averages_pairs() {
        assert_eq!(mean_order(&[]), 0.0);
        assert!((mean_order(&[3.0, 5.0]) - 4.0).abs() < 1e-12);
    }
}
