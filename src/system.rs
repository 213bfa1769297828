//! Learning system facade
//!
//! Owns the three durable collections and runs the retraining pipeline:
//! trigger evaluation, training, held-out evaluation, the promotion gate,
//! and registration. At most one pipeline runs per process; contenders skip
//! rather than queue, and failures inside the pipeline are logged and
//! reported without failing the submission that triggered them.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::feedback::{FeedbackStatistics, FeedbackStore, NewFeedback};
use crate::model::{SoftVoteEnsemble, TfidfVectorizer};
use crate::pipeline::{GateDecision, PromotionGate, RetrainTrigger};
use crate::registry::{PerformanceLedger, PerformanceSnapshot, TrendReport, VersionRegistry};
use crate::training::{evaluate, Trainer};

/// What one retraining pipeline run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrainOutcome {
    /// Trigger declined; carries the reason.
    NotDue(String),
    /// Another pipeline held the lock.
    Busy,
    Promoted {
        version_id: String,
    },
    Rejected {
        accuracy_delta: f64,
        f1_delta: f64,
    },
    /// The pipeline aborted; logged, never propagated as an error.
    Failed(String),
}

impl fmt::Display for RetrainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrainOutcome::NotDue(reason) => write!(f, "not due ({reason})"),
            RetrainOutcome::Busy => write!(f, "another retraining cycle is in progress"),
            RetrainOutcome::Promoted { version_id } => {
                write!(f, "promoted version {version_id}")
            }
            RetrainOutcome::Rejected {
                accuracy_delta,
                f1_delta,
            } => write!(
                f,
                "candidate rejected (accuracy {accuracy_delta:+.4}, f1 {f1_delta:+.4})"
            ),
            RetrainOutcome::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Receipt for one accepted feedback submission.
#[derive(Debug, Clone)]
pub struct FeedbackAck {
    pub feedback_id: String,
    /// What the opportunistic pipeline run did afterwards.
    pub retrain: RetrainOutcome,
}

/// Receipt for an accepted batch.
#[derive(Debug, Clone)]
pub struct BatchAck {
    pub feedback_ids: Vec<String>,
    pub retrain: RetrainOutcome,
}

/// Composite health report for operators and the serving layer.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub feedback_collected: usize,
    pub model_versions: usize,
    pub current_performance: Option<PerformanceSnapshot>,
    pub retraining_threshold: usize,
    pub days_since_last_training: Option<i64>,
    pub feedback_statistics: FeedbackStatistics,
    pub performance_trends: Option<TrendReport>,
}

pub struct LearningSystem {
    config: Config,
    feedback: FeedbackStore,
    registry: VersionRegistry,
    ledger: PerformanceLedger,
    trainer: Trainer,
    retrain_lock: Mutex<()>,
}

impl LearningSystem {
    /// Open the system rooted at the configured data directory, loading the
    /// durable collections.
    pub async fn open(config: Config) -> Result<Self> {
        let feedback_dir = config.feedback_dir();
        let feedback = FeedbackStore::new(feedback_dir.join("user_feedback.json"));
        let ledger = PerformanceLedger::new(feedback_dir.join("performance_history.json"));
        let registry = VersionRegistry::new(
            feedback_dir.join("model_versions.json"),
            config.models_dir(),
        );

        feedback.load().await?;
        ledger.load().await?;
        registry.load().await?;

        info!(
            "Learning system ready: {} feedback entries, {} model versions",
            feedback.count().await,
            registry.version_count().await
        );

        let trainer = Trainer::new(config.clone());
        Ok(Self {
            config,
            feedback,
            registry,
            ledger,
            trainer,
            retrain_lock: Mutex::new(()),
        })
    }

    /// Record one correction and opportunistically run the pipeline.
    /// Validation and persistence errors surface; pipeline failures do not.
    pub async fn submit_feedback(&self, feedback: NewFeedback) -> Result<FeedbackAck> {
        let feedback_id = self.feedback.append(feedback).await?;
        let retrain = self.run_retrain_cycle().await;
        Ok(FeedbackAck {
            feedback_id,
            retrain,
        })
    }

    /// Record a batch atomically, then run the pipeline once.
    pub async fn submit_feedback_batch(&self, batch: Vec<NewFeedback>) -> Result<BatchAck> {
        let feedback_ids = self.feedback.append_batch(batch).await?;
        let retrain = self.run_retrain_cycle().await;
        Ok(BatchAck {
            feedback_ids,
            retrain,
        })
    }

    pub async fn feedback_statistics(&self) -> FeedbackStatistics {
        FeedbackStatistics::compute(&self.feedback.list_all().await)
    }

    pub async fn system_status(&self) -> SystemStatus {
        let current = self.registry.current().await;
        let days_since_last_training = current
            .as_ref()
            .map(|version| (chrono::Utc::now() - version.created_at).num_days());

        SystemStatus {
            feedback_collected: self.feedback.count().await,
            model_versions: self.registry.version_count().await,
            current_performance: current.map(|version| version.snapshot),
            retraining_threshold: self.config.learning.min_feedback_threshold,
            days_since_last_training,
            feedback_statistics: self.feedback_statistics().await,
            performance_trends: self.ledger.trends().await,
        }
    }

    /// Serving boundary: artifacts of the current version. Callers re-fetch
    /// per prediction so a promotion takes effect without restart.
    pub async fn current_model_and_vectorizer(
        &self,
    ) -> Option<(Arc<SoftVoteEnsemble>, Arc<TfidfVectorizer>)> {
        self.registry.current_artifacts().await
    }

    /// Every recorded version, oldest first.
    pub async fn versions(&self) -> Vec<crate::registry::ModelVersion> {
        self.registry.list().await
    }

    /// Run the retraining pipeline if it is due and no other run holds the
    /// lock. The trigger is re-evaluated under the lock so a pipeline that
    /// finished while we contended suppresses an immediate second run.
    pub async fn run_retrain_cycle(&self) -> RetrainOutcome {
        let decision = RetrainTrigger::should_retrain(
            &self.feedback,
            &self.registry,
            &self.config.learning,
        )
        .await;
        if !decision.is_due() {
            debug!("Retraining skipped: {}", decision);
            return RetrainOutcome::NotDue(decision.to_string());
        }

        let Ok(_guard) = self.retrain_lock.try_lock() else {
            debug!("Retraining skipped: pipeline already running");
            return RetrainOutcome::Busy;
        };

        let decision = RetrainTrigger::should_retrain(
            &self.feedback,
            &self.registry,
            &self.config.learning,
        )
        .await;
        if !decision.is_due() {
            debug!("Retraining no longer due after acquiring lock: {}", decision);
            return RetrainOutcome::NotDue(decision.to_string());
        }

        info!("Starting retraining cycle");
        match self.retrain_under_lock().await {
            Ok(outcome) => {
                info!("Retraining cycle finished: {}", outcome);
                outcome
            }
            Err(err) => {
                warn!("Retraining cycle failed: {}", err);
                RetrainOutcome::Failed(err.to_string())
            }
        }
    }

    async fn retrain_under_lock(&self) -> Result<RetrainOutcome> {
        let entries = self.feedback.list_all().await;
        let feedback_count = entries.len();

        let artifacts = self.trainer.train(&entries)?;
        let candidate = evaluate(
            &artifacts.ensemble,
            &artifacts.vectorizer,
            &artifacts.holdout_texts,
            &artifacts.holdout_labels,
        )?;

        let current = self.registry.current().await.map(|version| version.snapshot);
        let decision = PromotionGate::should_promote(
            &candidate,
            current.as_ref(),
            self.config.learning.promotion_threshold,
        );
        info!("Promotion gate: {}", decision);

        match decision {
            GateDecision::Bootstrap | GateDecision::Promote { .. } => {
                let version_id = self
                    .registry
                    .register(
                        &artifacts.ensemble,
                        &artifacts.vectorizer,
                        candidate.clone(),
                        feedback_count,
                    )
                    .await?;
                self.ledger.record(candidate).await?;
                Ok(RetrainOutcome::Promoted { version_id })
            }
            GateDecision::Reject {
                accuracy_delta,
                f1_delta,
            } => Ok(RetrainOutcome::Rejected {
                accuracy_delta,
                f1_delta,
            }),
        }
    }
}
