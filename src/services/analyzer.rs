//! Log scraping.
//!
//! Extracts numeric quantities from the tail of captured run output by
//! locating a labeled line and parsing the numbers after its `:`
//! delimiter. A missing metric is an error, never a silent empty series:
//! an absent label usually means a crashed or incomplete run.

use crate::domain::error::AnalysisError;

pub use crate::domain::models::config::DEFAULT_SCAN_WINDOW;

/// Scrape the numbers following `label` out of the last `scan_last_n`
/// lines of `text`.
///
/// When the label appears several times inside the window, the last
/// matching line wins. Everything after the first `:` on that line is
/// split on whitespace and parsed as floats.
pub fn extract_labeled_numbers(
    text: &str,
    label: &str,
    scan_last_n: usize,
) -> Result<Vec<f64>, AnalysisError> {
    let lines: Vec<&str> = text.lines().collect();
    let window_start = lines.len().saturating_sub(scan_last_n);

    for line in lines[window_start..].iter().rev() {
        if !line.contains(label) {
            continue;
        }
        let rest = line.split_once(':').map(|(_, r)| r).unwrap_or("");
        let mut numbers = Vec::new();
        for token in rest.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| AnalysisError::MalformedNumber {
                label: label.to_string(),
                token: token.to_string(),
            })?;
            numbers.push(value);
        }
        if numbers.is_empty() {
            // A matching line that carries no numbers is as suspicious as
            // a missing one.
            return Err(AnalysisError::MalformedNumber {
                label: label.to_string(),
                token: rest.trim().to_string(),
            });
        }
        return Ok(numbers);
    }

    Err(AnalysisError::MetricNotFound {
        label: label.to_string(),
        window: scan_last_n,
    })
}

/// Generic fallback when no labeled line format is guaranteed: scan all
/// lines from the end, token by token, and return the first token that
/// parses as a float.
pub fn last_numeric_token(text: &str) -> Result<f64, AnalysisError> {
    for line in text.lines().rev() {
        for token in line.split_whitespace().rev() {
            if let Ok(value) = token.parse::<f64>() {
                return Ok(value);
            }
        }
    }
    Err(AnalysisError::NoNumericToken)
}
