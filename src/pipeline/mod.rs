//! Retraining pipeline policies
//!
//! The two pure decision points of the learning loop: when a retraining
//! cycle is due, and whether its candidate earns promotion. The loop itself
//! runs in `crate::system`.

pub mod gate;
pub mod trigger;

pub use gate::{GateDecision, PromotionGate};
pub use trigger::{RetrainTrigger, TriggerDecision};
