//! Version registry and performance ledger
//!
//! Durable record of what was trained, when, and how well it scored. The
//! registry owns artifact files and the current-version pointer; the ledger
//! keeps the metric history the trend reports are built from.

pub mod ledger;
pub mod versions;

pub use ledger::{PerformanceLedger, PerformanceSnapshot, TrendReport};
pub use versions::{ModelVersion, VersionRegistry};
