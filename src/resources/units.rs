//! Unit conversions that are safe to apply silently.

/// (target unit, source unit, factor): `target += factor * source`.
const CONVERSIONS: &[(&str, &str, f64)] = &[
    ("tonne", "kg", 1.0e-3),
    ("kg", "g", 1.0e-3),
    ("tonne", "g", 1.0e-6),
];

/// Factor that converts a quantity in `source` units into `target` units.
///
/// Returns `None` for any pair outside the fixed table; such quantities must
/// not be combined.
pub fn conversion_factor(target: &str, source: &str) -> Option<f64> {
    if target == source {
        return Some(1.0);
    }
    CONVERSIONS
        .iter()
        .find(|(t, s, _)| *t == target && *s == source)
        .map(|(_, _, factor)| *factor)
}
