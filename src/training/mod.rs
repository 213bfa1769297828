//! Training and evaluation
//!
//! Deterministic candidate fitting on the feedback log and the held-out
//! scoring that feeds the promotion decision.

pub mod evaluator;
pub mod trainer;

pub use evaluator::evaluate;
pub use trainer::{TrainedArtifacts, Trainer};
