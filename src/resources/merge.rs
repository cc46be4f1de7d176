//! Unit-aware ledger addition.

use crate::resources::entry::ResourceLedger;
use crate::resources::units::conversion_factor;

/// Add every resource in `source` into `target`, like `target += source`.
///
/// - Resources missing from `target` are deep-copied in.
/// - Numeric values are summed after converting through the fixed unit table.
/// - Numeric values with unconvertible units are appended to the target's
///   `incompatible_units` instead of being combined.
/// - Pairs where either side lacks a numeric value are left alone.
pub fn add_resources(target: &mut ResourceLedger, source: &ResourceLedger) {
    for (resource, s) in source {
        let Some(t) = target.get_mut(resource) else {
            target.insert(resource.clone(), s.clone());
            continue;
        };

        let (Some(t_amount), Some(s_amount)) = (t.amount(), s.amount()) else {
            log::trace!("Skipping non-numeric resource '{}'", resource);
            continue;
        };

        match conversion_factor(&t.unit, &s.unit) {
            Some(factor) => {
                if !t.set_amount(t_amount + factor * s_amount) {
                    continue;
                }
                t.incompatible_units
                    .extend(s.incompatible_units.iter().cloned());
            }
            None => {
                log::debug!(
                    "Resource '{}': cannot add '{}' to '{}', keeping it aside",
                    resource,
                    s.unit,
                    t.unit
                );
                t.incompatible_units.push(s.clone());
            }
        }
    }
}
