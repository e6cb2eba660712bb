//! Swept-option declarations.
//!
//! A declaration names one parameter of the code under test together with
//! the candidate values the sweep must cover. Declarations are immutable
//! once parsed; the expander consumes them read-only.

use serde::{Deserialize, Serialize};

/// A forbidden co-occurrence attached to one value of an option.
///
/// While the owning option holds `value`, no combination may also assign
/// `forbidden_value` to the option named `forbidden_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Value of the owning option this rule applies to.
    pub value: String,
    /// Name of the option the rule constrains.
    pub forbidden_name: String,
    /// Value of `forbidden_name` that must not co-occur.
    pub forbidden_value: String,
}

/// One swept option: a name with an ordered list of candidate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDeclaration {
    pub name: String,
    /// Candidate values in declaration order.
    pub values: Vec<String>,
    /// Exclusion rules keyed on this option's values.
    pub exclusions: Vec<ExclusionRule>,
    /// If true, this option's values are iterated as standalone
    /// combinations instead of being multiplied into the cross product.
    pub exclude_from_cross: bool,
}

impl OptionDeclaration {
    /// Create a cross-combined declaration with no exclusions.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
            exclusions: Vec::new(),
            exclude_from_cross: false,
        }
    }

    /// The value substituted for this option when it is not being varied.
    pub fn default_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}
