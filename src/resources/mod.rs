//! Resource ledgers and their roll-up across component trees.
//!
//! This module provides:
//! - Ledger entries (`entry`)
//! - The fixed unit conversion table (`units`)
//! - Unit-aware ledger addition (`merge`)
//! - Recursive roll-up through the entity cache (`aggregator`)

pub mod aggregator;
pub mod entry;
pub mod merge;
pub mod units;

pub use aggregator::{CycleDiagnostic, ResourceAggregator, Rollup};
pub use entry::{ResourceEntry, ResourceLedger};
pub use merge::add_resources;
