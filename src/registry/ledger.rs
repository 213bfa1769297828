//! Performance ledger
//!
//! Evaluation history of every promoted version, keyed by evaluation
//! timestamp. Snapshots are immutable once recorded; the ledger only grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;

/// Held-out metrics of one evaluation run. All four values are in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub evaluated_at: DateTime<Utc>,
}

/// Trend summary over the recorded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    /// Accuracy per recorded snapshot, ascending by evaluation time.
    pub accuracy: Vec<f64>,
    /// F1 per recorded snapshot, same order.
    pub f1: Vec<f64>,
    /// Evaluation days (YYYY-MM-DD), same order.
    pub timestamps: Vec<String>,
    /// (last - first) / count, per metric.
    pub accuracy_improvement_rate: f64,
    pub f1_improvement_rate: f64,
    /// Population standard deviation, per metric.
    pub accuracy_stability: f64,
    pub f1_stability: f64,
}

impl TrendReport {
    /// None when the history is empty.
    pub fn from_history(history: &[PerformanceSnapshot]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let accuracy: Vec<f64> = history.iter().map(|s| s.accuracy).collect();
        let f1: Vec<f64> = history.iter().map(|s| s.f1).collect();
        let timestamps: Vec<String> = history
            .iter()
            .map(|s| s.evaluated_at.format("%Y-%m-%d").to_string())
            .collect();

        let n = history.len() as f64;
        let improvement = |series: &[f64]| (series[series.len() - 1] - series[0]) / n;
        let stability = |series: &[f64]| {
            let mean = series.iter().sum::<f64>() / n;
            (series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
        };

        Some(Self {
            accuracy_improvement_rate: improvement(&accuracy),
            f1_improvement_rate: improvement(&f1),
            accuracy_stability: stability(&accuracy),
            f1_stability: stability(&f1),
            accuracy,
            f1,
            timestamps,
        })
    }
}

/// Persistent, append-only metric history.
pub struct PerformanceLedger {
    history: Arc<RwLock<BTreeMap<DateTime<Utc>, PerformanceSnapshot>>>,
    path: PathBuf,
}

impl PerformanceLedger {
    pub fn new(path: PathBuf) -> Self {
        Self {
            history: Arc::new(RwLock::new(BTreeMap::new())),
            path,
        }
    }

    /// Append a snapshot and persist. Rolled back if the write fails.
    pub async fn record(&self, snapshot: PerformanceSnapshot) -> Result<()> {
        let mut history = self.history.write().await;
        let key = snapshot.evaluated_at;
        let previous = history.insert(key, snapshot);

        if let Err(err) = self.persist(&history).await {
            match previous {
                Some(snapshot) => {
                    history.insert(key, snapshot);
                }
                None => {
                    history.remove(&key);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// All snapshots, ascending by evaluation time.
    pub async fn history(&self) -> Vec<PerformanceSnapshot> {
        self.history.read().await.values().cloned().collect()
    }

    pub async fn latest(&self) -> Option<PerformanceSnapshot> {
        self.history
            .read()
            .await
            .values()
            .next_back()
            .cloned()
    }

    pub async fn trends(&self) -> Option<TrendReport> {
        let history = self.history().await;
        TrendReport::from_history(&history)
    }

    /// Load history from disk, replacing in-memory state. Missing file means
    /// an empty history.
    pub async fn load(&self) -> Result<()> {
        if self.path.exists() {
            let json = tokio::fs::read_to_string(&self.path).await?;
            let snapshots: Vec<PerformanceSnapshot> = serde_json::from_str(&json)?;
            let mut history = self.history.write().await;
            *history = snapshots
                .into_iter()
                .map(|s| (s.evaluated_at, s))
                .collect();
            info!("Loaded {} performance snapshots from {:?}", history.len(), self.path);
        }
        Ok(())
    }

    async fn persist(
        &self,
        history: &BTreeMap<DateTime<Utc>, PerformanceSnapshot>,
    ) -> Result<()> {
        let snapshots: Vec<&PerformanceSnapshot> = history.values().collect();
        let json = serde_json::to_string_pretty(&snapshots)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
