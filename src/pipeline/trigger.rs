//! Retraining trigger policy
//!
//! Decides whether enough feedback has accumulated to justify a retraining
//! cycle. Purely a read of the feedback store and the registry; the caller
//! owns when and under which lock the decision is acted on.

use std::fmt;

use crate::config::LearningConfig;
use crate::feedback::FeedbackStore;
use crate::registry::VersionRegistry;

/// Outcome of a trigger evaluation. Declines carry the reason so the skip
/// can be logged meaningfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    Retrain,
    /// The whole log is still below the feedback threshold.
    BelowThreshold { available: usize, required: usize },
    /// The current version is younger than the retraining interval.
    TooRecent { days_since: i64, required_days: i64 },
    /// Not enough entries postdate the current version.
    InsufficientNewFeedback { available: usize, required: usize },
}

impl TriggerDecision {
    pub fn is_due(&self) -> bool {
        matches!(self, TriggerDecision::Retrain)
    }
}

impl fmt::Display for TriggerDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerDecision::Retrain => write!(f, "retraining due"),
            TriggerDecision::BelowThreshold {
                available,
                required,
            } => write!(f, "{available} of {required} required feedback entries"),
            TriggerDecision::TooRecent {
                days_since,
                required_days,
            } => write!(
                f,
                "last training {days_since} days ago, interval is {required_days}"
            ),
            TriggerDecision::InsufficientNewFeedback {
                available,
                required,
            } => write!(
                f,
                "{available} of {required} required entries newer than current version"
            ),
        }
    }
}

pub struct RetrainTrigger;

impl RetrainTrigger {
    /// All conditions must hold: total volume, elapsed time since the
    /// current version, and fresh volume since it. With no current version
    /// the volume check alone decides (bootstrap).
    pub async fn should_retrain(
        feedback: &FeedbackStore,
        registry: &VersionRegistry,
        cfg: &LearningConfig,
    ) -> TriggerDecision {
        let available = feedback.count().await;
        if available < cfg.min_feedback_threshold {
            return TriggerDecision::BelowThreshold {
                available,
                required: cfg.min_feedback_threshold,
            };
        }

        if let Some(current) = registry.current().await {
            let days_since = (chrono::Utc::now() - current.created_at).num_days();
            if days_since < cfg.retraining_interval_days {
                return TriggerDecision::TooRecent {
                    days_since,
                    required_days: cfg.retraining_interval_days,
                };
            }

            let new_entries = feedback.count_after(current.created_at).await;
            if new_entries < cfg.new_feedback_floor() {
                return TriggerDecision::InsufficientNewFeedback {
                    available: new_entries,
                    required: cfg.new_feedback_floor(),
                };
            }
        }

        TriggerDecision::Retrain
    }
}
