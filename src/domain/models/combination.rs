//! Concrete parameter assignments produced by the expander.

use indexmap::IndexMap;
use serde::Serialize;

/// One concrete assignment of values to swept options.
///
/// Combinations are produced once by the expander and never mutated
/// afterwards. Each is uniquely addressable by `index`, its position in
/// the deterministic expansion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination {
    /// Position in the expansion order.
    pub index: usize,
    /// Option name to chosen value, in declaration order.
    pub assignment: IndexMap<String, String>,
}

impl Combination {
    pub fn new(index: usize, assignment: IndexMap<String, String>) -> Self {
        Self { index, assignment }
    }

    /// Chosen value for `name`, if this combination assigns it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignment.get(name).map(String::as_str)
    }

    /// Short human-readable form, e.g. `N=2, p=3`.
    pub fn label(&self) -> String {
        self.assignment
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
