//! User feedback store
//!
//! Append-only log of prediction corrections. Entries are validated at the
//! boundary, never mutated once appended, and write-through persisted so the
//! on-disk log always matches memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{LearningError, Result};
use crate::types::Label;

/// Input for one correction, before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// Original article text the prediction was made on.
    pub text: String,
    /// What the deployed model said.
    pub predicted_label: Label,
    /// What the user says is true.
    pub actual_label: Label,
    /// Model confidence at prediction time, in [0, 1].
    pub confidence: Option<f64>,
    /// Submitting user, if known.
    pub user_id: Option<String>,
}

impl NewFeedback {
    fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(LearningError::Validation(
                "feedback text is empty".to_string(),
            ));
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(LearningError::Validation(format!(
                    "confidence {confidence} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// One stored correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Unique id, `fb_<yyyymmdd_HHMMSS>_<n>` with `n` the log length at
    /// append time.
    pub id: String,
    pub text: String,
    pub predicted_label: Label,
    pub actual_label: Label,
    pub confidence: Option<f64>,
    pub user_id: Option<String>,
    /// Assigned at append time, immutable afterwards.
    pub timestamp: DateTime<Utc>,
}

/// Persistent append-only feedback log.
pub struct FeedbackStore {
    entries: Arc<RwLock<Vec<FeedbackEntry>>>,
    path: PathBuf,
}

impl FeedbackStore {
    /// Store backed by the given JSON file. Call `load` to pick up any
    /// existing log before appending.
    pub fn new(path: PathBuf) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            path,
        }
    }

    /// Validate, assign id and timestamp, persist, return the new id.
    /// The in-memory append is rolled back if the write fails.
    pub async fn append(&self, feedback: NewFeedback) -> Result<String> {
        feedback.validate()?;

        let mut entries = self.entries.write().await;
        let entry = build_entry(feedback, entries.len());
        let id = entry.id.clone();
        entries.push(entry);

        if let Err(err) = self.persist(&entries).await {
            entries.pop();
            return Err(err);
        }

        debug!("Appended feedback {}", id);
        Ok(id)
    }

    /// Append several corrections with a single persistence flush. The batch
    /// is atomic: any invalid entry or failed write leaves the log untouched.
    pub async fn append_batch(&self, batch: Vec<NewFeedback>) -> Result<Vec<String>> {
        for feedback in &batch {
            feedback.validate()?;
        }

        let mut entries = self.entries.write().await;
        let before = entries.len();
        let mut ids = Vec::with_capacity(batch.len());
        for feedback in batch {
            let entry = build_entry(feedback, entries.len());
            ids.push(entry.id.clone());
            entries.push(entry);
        }

        if let Err(err) = self.persist(&entries).await {
            entries.truncate(before);
            return Err(err);
        }

        debug!("Appended {} feedback entries in batch", ids.len());
        Ok(ids)
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Entries strictly newer than `t`.
    pub async fn count_after(&self, t: DateTime<Utc>) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.timestamp > t)
            .count()
    }

    /// Every entry, insertion order.
    pub async fn list_all(&self) -> Vec<FeedbackEntry> {
        self.entries.read().await.clone()
    }

    /// Load the log from disk, replacing the in-memory state. Missing file
    /// means an empty log, not an error.
    pub async fn load(&self) -> Result<()> {
        if self.path.exists() {
            let json = tokio::fs::read_to_string(&self.path).await?;
            let loaded: Vec<FeedbackEntry> = serde_json::from_str(&json)?;
            let mut entries = self.entries.write().await;
            *entries = loaded;
            info!("Loaded {} feedback entries from {:?}", entries.len(), self.path);
        }
        Ok(())
    }

    async fn persist(&self, entries: &[FeedbackEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

fn build_entry(feedback: NewFeedback, log_len: usize) -> FeedbackEntry {
    let timestamp = Utc::now();
    FeedbackEntry {
        id: format!("fb_{}_{}", timestamp.format("%Y%m%d_%H%M%S"), log_len),
        text: feedback.text,
        predicted_label: feedback.predicted_label,
        actual_label: feedback.actual_label,
        confidence: feedback.confidence,
        user_id: feedback.user_id,
        timestamp,
    }
}
