//! Combination expansion.
//!
//! Turns a set of option declarations into the ordered list of concrete
//! parameter assignments a sweep must execute. Cross-combined options form
//! a Cartesian product in declaration order with the last option varying
//! fastest; options excluded from cross combination contribute standalone
//! combinations appended after the base grid, holding default values for
//! every other option. Exclusion rules then filter the raw set.
//!
//! The expansion order is deterministic: callers (and tests) may rely on
//! it exactly.

use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::error::ConfigError;
use crate::domain::models::{Combination, OptionDeclaration};

/// The expansion output: ordered combinations plus the per-option numeric
/// slot widths, surfaced in the machine-readable expansion listing.
#[derive(Debug, Clone, Serialize)]
pub struct Expansion {
    pub combinations: Vec<Combination>,
    /// Option name to number of numeric value slots; `< 0` means the
    /// option's values are not uniform numeric slots.
    pub digits: IndexMap<String, i32>,
}

/// Expand declarations into the concrete combination list.
///
/// With `enforce_unique_keys`, a duplicated option name is a configuration
/// error rather than a silently merged duplicate. Zero surviving
/// combinations after exclusion filtering is also a configuration error:
/// an empty sweep almost always means a broken declaration file, not
/// "nothing to do".
pub fn expand(
    declarations: &[OptionDeclaration],
    enforce_unique_keys: bool,
) -> Result<Expansion, ConfigError> {
    if enforce_unique_keys {
        let mut seen = std::collections::HashSet::new();
        for decl in declarations {
            if !seen.insert(decl.name.as_str()) {
                return Err(ConfigError::DuplicateOption(decl.name.clone()));
            }
        }
    }
    for decl in declarations {
        if decl.values.is_empty() {
            return Err(ConfigError::EmptyValues(decl.name.clone()));
        }
    }

    let digits = digit_slots(declarations);

    let cross: Vec<&OptionDeclaration> = declarations
        .iter()
        .filter(|d| !d.exclude_from_cross)
        .collect();
    let standalone: Vec<&OptionDeclaration> = declarations
        .iter()
        .filter(|d| d.exclude_from_cross)
        .collect();

    let mut raw: Vec<IndexMap<String, String>> = Vec::new();

    // Base grid: odometer over the cross-combined value lists, last
    // declaration varying fastest.
    if !cross.is_empty() {
        let mut cursor = vec![0usize; cross.len()];
        loop {
            let mut assignment = IndexMap::with_capacity(cross.len());
            for (decl, &value_idx) in cross.iter().zip(cursor.iter()) {
                assignment.insert(decl.name.clone(), decl.values[value_idx].clone());
            }
            raw.push(assignment);

            let mut pos = cross.len();
            loop {
                if pos == 0 {
                    break;
                }
                pos -= 1;
                cursor[pos] += 1;
                if cursor[pos] < cross[pos].values.len() {
                    break;
                }
                cursor[pos] = 0;
            }
            if cursor.iter().all(|&i| i == 0) {
                break;
            }
        }
    }

    // Standalone options: one combination per value, defaults everywhere
    // else. Keeps combinatorial blow-up linear for special-case options.
    for special in &standalone {
        for value in &special.values {
            let mut assignment = IndexMap::with_capacity(declarations.len());
            for decl in declarations {
                let chosen = if decl.name == special.name {
                    value.as_str()
                } else {
                    decl.default_value().unwrap_or_default()
                };
                assignment.insert(decl.name.clone(), chosen.to_string());
            }
            if !raw.contains(&assignment) {
                raw.push(assignment);
            }
        }
    }

    let filtered: Vec<IndexMap<String, String>> = raw
        .into_iter()
        .filter(|assignment| satisfies_exclusions(assignment, declarations))
        .collect();

    if filtered.is_empty() {
        return Err(ConfigError::NoValidCombinations);
    }

    let combinations = filtered
        .into_iter()
        .enumerate()
        .map(|(index, assignment)| Combination::new(index, assignment))
        .collect();

    Ok(Expansion {
        combinations,
        digits,
    })
}

/// True when no exclusion rule forbids a pair present in `assignment`.
fn satisfies_exclusions(
    assignment: &IndexMap<String, String>,
    declarations: &[OptionDeclaration],
) -> bool {
    for decl in declarations {
        let Some(chosen) = assignment.get(&decl.name) else {
            continue;
        };
        for rule in &decl.exclusions {
            if *chosen == rule.value
                && assignment.get(&rule.forbidden_name) == Some(&rule.forbidden_value)
            {
                return false;
            }
        }
    }
    true
}

/// Editable numeric slot widths per option.
///
/// An option whose every candidate value consists solely of float tokens
/// gets the token count of its first value; anything else is `-1`, "not an
/// editable numeric slot". Options whose values disagree on token count
/// are also `-1`.
fn digit_slots(declarations: &[OptionDeclaration]) -> IndexMap<String, i32> {
    let mut digits = IndexMap::with_capacity(declarations.len());
    for decl in declarations {
        digits.insert(decl.name.clone(), slot_width(&decl.values));
    }
    digits
}

fn slot_width(values: &[String]) -> i32 {
    let mut width: Option<usize> = None;
    for value in values {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        if tokens.is_empty() || tokens.iter().any(|t| t.parse::<f64>().is_err()) {
            return -1;
        }
        match width {
            None => width = Some(tokens.len()),
            Some(w) if w != tokens.len() => return -1,
            Some(_) => {}
        }
    }
    width.map_or(-1, |w| w as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ExclusionRule;
    use proptest::prelude::*;

    fn decl(name: &str, values: &[&str]) -> OptionDeclaration {
        OptionDeclaration::new(name, values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn cross_product_order_last_option_fastest() {
        let declarations = vec![decl("N", &["1", "2", "4"]), decl("p", &["2", "3"])];
        let expansion = expand(&declarations, true).unwrap();

        let pairs: Vec<(String, String)> = expansion
            .combinations
            .iter()
            .map(|c| {
                (
                    c.get("N").unwrap().to_string(),
                    c.get("p").unwrap().to_string(),
                )
            })
            .collect();

        let expected = [
            ("1", "2"),
            ("1", "3"),
            ("2", "2"),
            ("2", "3"),
            ("4", "2"),
            ("4", "3"),
        ];
        assert_eq!(pairs.len(), 6);
        for (got, want) in pairs.iter().zip(expected.iter()) {
            assert_eq!((got.0.as_str(), got.1.as_str()), *want);
        }
        // Indices address the expansion order.
        for (i, combo) in expansion.combinations.iter().enumerate() {
            assert_eq!(combo.index, i);
        }
    }

    #[test]
    fn standalone_options_append_after_grid() {
        let mut special = decl("limiter", &["minmod", "none"]);
        special.exclude_from_cross = true;
        let declarations = vec![decl("N", &["1", "2"]), special];

        let expansion = expand(&declarations, true).unwrap();
        // 2 grid rows + 2 standalone rows, but limiter=minmod with N at its
        // default duplicates nothing since grid rows omit standalone keys.
        assert_eq!(expansion.combinations.len(), 4);
        assert_eq!(expansion.combinations[0].get("limiter"), None);
        assert_eq!(expansion.combinations[2].get("limiter"), Some("minmod"));
        assert_eq!(expansion.combinations[2].get("N"), Some("1"));
        assert_eq!(expansion.combinations[3].get("limiter"), Some("none"));
    }

    #[test]
    fn exclusion_rules_drop_forbidden_pairs() {
        let mut n = decl("N", &["1", "2"]);
        n.exclusions.push(ExclusionRule {
            value: "2".to_string(),
            forbidden_name: "p".to_string(),
            forbidden_value: "3".to_string(),
        });
        let declarations = vec![n, decl("p", &["2", "3"])];

        let expansion = expand(&declarations, true).unwrap();
        assert_eq!(expansion.combinations.len(), 3);
        for combo in &expansion.combinations {
            assert!(!(combo.get("N") == Some("2") && combo.get("p") == Some("3")));
        }
    }

    #[test]
    fn duplicate_names_rejected_when_enforced() {
        let declarations = vec![decl("N", &["1"]), decl("N", &["2"])];
        let err = expand(&declarations, true).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateOption(name) if name == "N"));

        // Without enforcement the duplicate is tolerated (later wins in
        // each assignment).
        assert!(expand(&declarations, false).is_ok());
    }

    #[test]
    fn zero_survivors_is_a_configuration_error() {
        let mut n = decl("N", &["1"]);
        n.exclusions.push(ExclusionRule {
            value: "1".to_string(),
            forbidden_name: "p".to_string(),
            forbidden_value: "2".to_string(),
        });
        let declarations = vec![n, decl("p", &["2"])];
        let err = expand(&declarations, true).unwrap_err();
        assert!(matches!(err, ConfigError::NoValidCombinations));
    }

    #[test]
    fn empty_value_list_is_a_configuration_error() {
        let declarations = vec![decl("N", &[])];
        assert!(matches!(
            expand(&declarations, true).unwrap_err(),
            ConfigError::EmptyValues(name) if name == "N"
        ));
    }

    #[test]
    fn digit_slots_classify_numeric_and_text_values() {
        let declarations = vec![
            decl("N", &["1", "2", "4"]),
            decl("RefState", &["1.0 0.3 0.0", "1.0 0.5 0.0"]),
            decl("scheme", &["dg", "fv"]),
            decl("mixed", &["1.0", "1.0 2.0"]),
        ];
        let expansion = expand(&declarations, true).unwrap();
        assert_eq!(expansion.digits["N"], 1);
        assert_eq!(expansion.digits["RefState"], 3);
        assert_eq!(expansion.digits["scheme"], -1);
        assert_eq!(expansion.digits["mixed"], -1);
    }

    #[test]
    fn expansion_serializes_combinations_and_slot_widths() {
        let declarations = vec![decl("N", &["1", "2"]), decl("scheme", &["dg", "fv"])];
        let expansion = expand(&declarations, true).unwrap();

        let value = serde_json::to_value(&expansion).unwrap();
        assert_eq!(value["combinations"].as_array().unwrap().len(), 4);
        assert_eq!(value["digits"]["N"], 1);
        assert_eq!(value["digits"]["scheme"], -1);
    }

    proptest! {
        /// With no exclusions the expansion size is the product of the
        /// cross-combined value-list lengths.
        #[test]
        fn expansion_count_is_product(counts in prop::collection::vec(1usize..4, 1..4)) {
            let declarations: Vec<OptionDeclaration> = counts
                .iter()
                .enumerate()
                .map(|(i, &n)| {
                    decl(
                        &format!("opt{}", i),
                        &(0..n).map(|j| format!("v{}", j)).collect::<Vec<_>>()
                            .iter().map(String::as_str).collect::<Vec<_>>(),
                    )
                })
                .collect();

            let expansion = expand(&declarations, true).unwrap();
            let product: usize = counts.iter().product();
            prop_assert_eq!(expansion.combinations.len(), product);
        }
    }
}
