//! Dotted numeric version comparison
//!
//! Not semver: versions are split on `.` and each component is read as a
//! number. Components that are not numbers (`0-beta`, `next`, empty) count as
//! `0`, and missing trailing components count as `0`.
//! The ordering is total, so malformed input still takes part in a fold.

use std::cmp::Ordering;

use indexmap::IndexMap;

/// Numeric value of one version component; non-numeric text is 0
fn component_value(component: &str) -> f64 {
    component
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Compare two dotted versions component by component.
///
/// `compare_versions("1.2", "1.2.0")` is `Equal`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<f64> = a.split('.').map(component_value).collect();
    let b_parts: Vec<f64> = b.split('.').map(component_value).collect();

    for i in 0..a_parts.len().max(b_parts.len()) {
        let a_part = a_parts.get(i).copied().unwrap_or(0.0);
        let b_part = b_parts.get(i).copied().unwrap_or(0.0);

        if a_part > b_part {
            return Ordering::Greater;
        }
        if a_part < b_part {
            return Ordering::Less;
        }
    }

    Ordering::Equal
}

/// Pick the highest version from a tag→version mapping (e.g. npm dist-tags).
///
/// Folds in mapping order; a candidate replaces the current latest only when
/// strictly greater, so on equal versions the first one seen is kept.
/// Returns `None` for an absent or empty mapping.
pub fn latest_of(versions: Option<&IndexMap<String, String>>) -> Option<String> {
    versions?
        .values()
        .fold(None, |latest: Option<&String>, current| match latest {
            Some(latest) if compare_versions(current, latest) != Ordering::Greater => Some(latest),
            _ => Some(current),
        })
        .cloned()
}
