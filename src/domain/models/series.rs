//! Convergence series collected across a group of runs.

use serde::{Deserialize, Serialize};

/// Semantics of the independent variable in a convergence series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceMode {
    /// Independent variable is the grid spacing `h`; refinement ratio is
    /// `h[i-1] / h[i]`.
    GridSpacing,
    /// Independent variable is the polynomial degree `p`; refinement ratio
    /// is `(p[i-1] + 1) / (p[i] + 1)`, counting degrees of freedom.
    PolynomialDegree,
}

/// One measured point: independent variable plus one error per tracked
/// solution variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub independent: f64,
    pub errors: Vec<f64>,
}

/// Ordered sequence of (independent variable, errors) pairs scoped to one
/// convergence group. Built incrementally as runs in the group finish,
/// consumed once by the convergence calculator.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSeries {
    pub points: Vec<SeriesPoint>,
}

impl AnalysisSeries {
    pub fn push(&mut self, independent: f64, errors: Vec<f64>) {
        self.points.push(SeriesPoint {
            independent,
            errors,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Independent-variable values in insertion order.
    pub fn independents(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.independent).collect()
    }

    /// Number of error columns shared by every point.
    pub fn variable_count(&self) -> usize {
        self.points
            .iter()
            .map(|p| p.errors.len())
            .min()
            .unwrap_or(0)
    }

    /// Error values for one variable column, in insertion order.
    pub fn column(&self, variable: usize) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|p| p.errors.get(variable).copied())
            .collect()
    }
}
