//! Promotion gate
//!
//! Compares a candidate's held-out metrics against the current version.
//! Either metric clearing the margin is enough; equality is not (strict
//! inequality, so a threshold of zero still demands real improvement).

use std::fmt;

use crate::registry::PerformanceSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// No current version exists; the candidate wins by default.
    Bootstrap,
    Promote { accuracy_delta: f64, f1_delta: f64 },
    Reject { accuracy_delta: f64, f1_delta: f64 },
}

impl GateDecision {
    pub fn approved(&self) -> bool {
        matches!(self, GateDecision::Bootstrap | GateDecision::Promote { .. })
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Bootstrap => write!(f, "bootstrap promotion"),
            GateDecision::Promote {
                accuracy_delta,
                f1_delta,
            } => write!(
                f,
                "promoted (accuracy {accuracy_delta:+.4}, f1 {f1_delta:+.4})"
            ),
            GateDecision::Reject {
                accuracy_delta,
                f1_delta,
            } => write!(
                f,
                "rejected (accuracy {accuracy_delta:+.4}, f1 {f1_delta:+.4})"
            ),
        }
    }
}

pub struct PromotionGate;

impl PromotionGate {
    pub fn should_promote(
        candidate: &PerformanceSnapshot,
        current: Option<&PerformanceSnapshot>,
        threshold: f64,
    ) -> GateDecision {
        let Some(current) = current else {
            return GateDecision::Bootstrap;
        };

        let accuracy_delta = candidate.accuracy - current.accuracy;
        let f1_delta = candidate.f1 - current.f1;

        if accuracy_delta > threshold || f1_delta > threshold {
            GateDecision::Promote {
                accuracy_delta,
                f1_delta,
            }
        } else {
            GateDecision::Reject {
                accuracy_delta,
                f1_delta,
            }
        }
    }
}
