//! Option-declaration file parsing.
//!
//! The sweep is described by a small key/value file, one declaration per
//! line:
//!
//! ```text
//! ! comment (also #)
//! N = 1, 2, 4                    cross-combined option
//! nocross:limiter = minmod, none standalone option values
//! exclude:N=4, limiter=none      forbidden value pair
//! ```
//!
//! `exclude` lines attach an exclusion rule to the first named option:
//! while it holds the given value, every further `name=value` pair on the
//! line is forbidden. Exclude lines may appear anywhere; rules are
//! attached after all declarations are read.

use std::path::Path;

use crate::domain::error::ConfigError;
use crate::domain::models::{ExclusionRule, OptionDeclaration};

const NOCROSS_PREFIX: &str = "nocross:";
const EXCLUDE_PREFIX: &str = "exclude:";

/// Read and parse a declaration file.
pub fn load(path: &Path) -> Result<Vec<OptionDeclaration>, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|_| ConfigError::MissingInput(path.to_path_buf()))?;
    parse(&text)
}

/// Parse declaration-file content.
pub fn parse(text: &str) -> Result<Vec<OptionDeclaration>, ConfigError> {
    let mut declarations: Vec<OptionDeclaration> = Vec::new();
    // (line number, owner name, owner value, forbidden pairs)
    let mut pending_excludes: Vec<(usize, String, String, Vec<(String, String)>)> = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        if let Some(rest) = line.strip_prefix(EXCLUDE_PREFIX) {
            pending_excludes.push(parse_exclude(line_no, rest)?);
            continue;
        }

        let (name_part, exclude_from_cross) = match line.strip_prefix(NOCROSS_PREFIX) {
            Some(rest) => (rest, true),
            None => (line, false),
        };

        let Some((name, values_part)) = name_part.split_once('=') else {
            return Err(ConfigError::Parse {
                line: line_no,
                message: format!("expected 'name = v1, v2, ...', got '{}'", line),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::Parse {
                line: line_no,
                message: "empty option name".to_string(),
            });
        }
        let values: Vec<String> = values_part
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        declarations.push(OptionDeclaration {
            name: name.to_string(),
            values,
            exclusions: Vec::new(),
            exclude_from_cross,
        });
    }

    for (line_no, owner, owner_value, forbidden) in pending_excludes {
        let Some(decl) = declarations.iter_mut().find(|d| d.name == owner) else {
            return Err(ConfigError::Parse {
                line: line_no,
                message: format!("exclude rule references undeclared option '{}'", owner),
            });
        };
        for (forbidden_name, forbidden_value) in forbidden {
            decl.exclusions.push(ExclusionRule {
                value: owner_value.clone(),
                forbidden_name,
                forbidden_value,
            });
        }
    }

    Ok(declarations)
}

/// Parse the pair list of one `exclude:` line. The first pair owns the
/// rule; at least one further pair must follow.
fn parse_exclude(
    line_no: usize,
    rest: &str,
) -> Result<(usize, String, String, Vec<(String, String)>), ConfigError> {
    let mut pairs = Vec::new();
    for part in rest.split(',') {
        let Some((name, value)) = part.split_once('=') else {
            return Err(ConfigError::Parse {
                line: line_no,
                message: format!("expected 'name=value' in exclude rule, got '{}'", part.trim()),
            });
        };
        pairs.push((name.trim().to_string(), value.trim().to_string()));
    }
    if pairs.len() < 2 {
        return Err(ConfigError::Parse {
            line: line_no,
            message: "exclude rule needs at least two name=value pairs".to_string(),
        });
    }
    let (owner, owner_value) = pairs.remove(0);
    Ok((line_no, owner, owner_value, pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_comments_and_blanks() {
        let text = "\
! sweep description
N = 1, 2, 4

# polynomial degrees
p = 2, 3
";
        let declarations = parse(text).unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "N");
        assert_eq!(declarations[0].values, vec!["1", "2", "4"]);
        assert!(!declarations[0].exclude_from_cross);
        assert_eq!(declarations[1].values, vec!["2", "3"]);
    }

    #[test]
    fn nocross_prefix_marks_standalone_options() {
        let declarations = parse("nocross:limiter = minmod, none\n").unwrap();
        assert_eq!(declarations[0].name, "limiter");
        assert!(declarations[0].exclude_from_cross);
    }

    #[test]
    fn exclude_lines_attach_rules_to_the_owner() {
        let text = "N = 1, 2, 4\np = 2, 3\nexclude:N=4, p=3\n";
        let declarations = parse(text).unwrap();
        let n = &declarations[0];
        assert_eq!(n.exclusions.len(), 1);
        assert_eq!(n.exclusions[0].value, "4");
        assert_eq!(n.exclusions[0].forbidden_name, "p");
        assert_eq!(n.exclusions[0].forbidden_value, "3");
    }

    #[test]
    fn exclude_before_declaration_still_attaches() {
        let text = "exclude:N=2, p=3\nN = 1, 2\np = 2, 3\n";
        let declarations = parse(text).unwrap();
        assert_eq!(declarations[0].exclusions.len(), 1);
    }

    #[test]
    fn exclude_with_unknown_owner_is_a_parse_error() {
        let err = parse("N = 1\nexclude:M=1, N=1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn exclude_with_a_single_pair_is_a_parse_error() {
        let err = parse("N = 1\nexclude:N=1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));
    }

    #[test]
    fn line_without_equals_is_a_parse_error() {
        let err = parse("N 1 2 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load(Path::new("/nonexistent/combinations.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput(_)));
    }
}
