//! Model version registry
//!
//! Owns every trained artifact and the pointer to the version currently
//! serving predictions. Registration is all-or-nothing: artifacts and
//! metadata are staged to temporary files and renamed into place, with the
//! metadata rename as the commit point, so a crash or failed write never
//! leaves a half-registered version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{LearningError, Result};
use crate::model::{SoftVoteEnsemble, TfidfVectorizer};
use crate::registry::ledger::PerformanceSnapshot;

/// Metadata of one trained version. Artifact files are exclusively owned by
/// the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Compact UTC stamp (millisecond precision) plus a sequence suffix,
    /// e.g. `20250812T143052081-0003`. Fixed width, so lexicographic and
    /// chronological order coincide, and safe to embed in filenames.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    /// Held-out metrics at creation time.
    pub snapshot: PerformanceSnapshot,
    /// Feedback entries the version was trained on.
    pub feedback_count: usize,
}

struct CurrentModel {
    version: ModelVersion,
    ensemble: Arc<SoftVoteEnsemble>,
    vectorizer: Arc<TfidfVectorizer>,
}

struct RegistryState {
    /// Chronological, oldest first. Versions are superseded, never deleted.
    versions: Vec<ModelVersion>,
    current: Option<CurrentModel>,
}

pub struct VersionRegistry {
    state: Arc<RwLock<RegistryState>>,
    metadata_path: PathBuf,
    models_dir: PathBuf,
}

impl VersionRegistry {
    pub fn new(metadata_path: PathBuf, models_dir: PathBuf) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                versions: Vec::new(),
                current: None,
            })),
            metadata_path,
            models_dir,
        }
    }

    /// Persist a trained version and make it current. Returns the new id.
    pub async fn register(
        &self,
        ensemble: &SoftVoteEnsemble,
        vectorizer: &TfidfVectorizer,
        snapshot: PerformanceSnapshot,
        feedback_count: usize,
    ) -> Result<String> {
        let mut state = self.state.write().await;

        let created_at = Utc::now();
        let id = format!(
            "{}-{:04}",
            created_at.format("%Y%m%dT%H%M%S%3f"),
            state.versions.len()
        );
        let model_path = self.models_dir.join(format!("model_v{id}.json"));
        let vectorizer_path = self.models_dir.join(format!("vectorizer_v{id}.json"));

        let version = ModelVersion {
            id: id.clone(),
            created_at,
            model_path: model_path.clone(),
            vectorizer_path: vectorizer_path.clone(),
            snapshot,
            feedback_count,
        };

        let model_json = serde_json::to_string_pretty(ensemble)?;
        let vectorizer_json = serde_json::to_string_pretty(vectorizer)?;
        let mut metadata: Vec<&ModelVersion> = state.versions.iter().collect();
        metadata.push(&version);
        let metadata_json = serde_json::to_string_pretty(&metadata)?;

        tokio::fs::create_dir_all(&self.models_dir)
            .await
            .map_err(|e| persistence(&self.models_dir, "creating models dir", e))?;
        if let Some(parent) = self.metadata_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(parent, "creating metadata dir", e))?;
        }

        // Stage everything first, then rename; metadata last as the commit.
        let staged = [
            (tmp_path(&model_path), model_json, model_path.clone()),
            (
                tmp_path(&vectorizer_path),
                vectorizer_json,
                vectorizer_path.clone(),
            ),
            (
                tmp_path(&self.metadata_path),
                metadata_json,
                self.metadata_path.clone(),
            ),
        ];

        for (tmp, json, _) in &staged {
            if let Err(err) = tokio::fs::write(tmp, json).await {
                cleanup(&staged).await;
                return Err(persistence(tmp, "staging", err));
            }
        }
        for (tmp, _, dest) in &staged {
            if let Err(err) = tokio::fs::rename(tmp, dest).await {
                cleanup(&staged).await;
                return Err(persistence(dest, "committing", err));
            }
        }

        info!(
            "Registered model version {} (accuracy {:.4}, f1 {:.4}, {} feedback entries)",
            id, version.snapshot.accuracy, version.snapshot.f1, feedback_count
        );
        state.current = Some(CurrentModel {
            version: version.clone(),
            ensemble: Arc::new(ensemble.clone()),
            vectorizer: Arc::new(vectorizer.clone()),
        });
        state.versions.push(version);
        Ok(id)
    }

    /// Metadata of the currently served version, if any.
    pub async fn current(&self) -> Option<ModelVersion> {
        self.state
            .read()
            .await
            .current
            .as_ref()
            .map(|c| c.version.clone())
    }

    /// Atomic snapshot of the serving artifacts. Callers re-fetch per
    /// prediction so a promotion takes effect without a restart.
    pub async fn current_artifacts(
        &self,
    ) -> Option<(Arc<SoftVoteEnsemble>, Arc<TfidfVectorizer>)> {
        self.state
            .read()
            .await
            .current
            .as_ref()
            .map(|c| (Arc::clone(&c.ensemble), Arc::clone(&c.vectorizer)))
    }

    pub async fn get(&self, id: &str) -> Result<ModelVersion> {
        self.state
            .read()
            .await
            .versions
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| LearningError::NotFound(id.to_string()))
    }

    pub async fn version_count(&self) -> usize {
        self.state.read().await.versions.len()
    }

    /// Every version, oldest first.
    pub async fn list(&self) -> Vec<ModelVersion> {
        self.state.read().await.versions.clone()
    }

    /// Load metadata from disk and rehydrate the newest version's artifacts.
    /// Missing metadata file means an empty registry.
    pub async fn load(&self) -> Result<()> {
        if !self.metadata_path.exists() {
            return Ok(());
        }

        let json = tokio::fs::read_to_string(&self.metadata_path).await?;
        let mut versions: Vec<ModelVersion> = serde_json::from_str(&json)?;
        versions.sort_by(|a, b| a.id.cmp(&b.id));

        let current = match versions.last() {
            Some(newest) => Some(CurrentModel {
                version: newest.clone(),
                ensemble: Arc::new(read_artifact(&newest.model_path).await?),
                vectorizer: Arc::new(read_artifact(&newest.vectorizer_path).await?),
            }),
            None => None,
        };

        let mut state = self.state.write().await;
        info!(
            "Loaded {} model versions from {:?}, current: {}",
            versions.len(),
            self.metadata_path,
            current
                .as_ref()
                .map(|c| c.version.id.as_str())
                .unwrap_or("none")
        );
        state.versions = versions;
        state.current = current;
        Ok(())
    }
}

async fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| persistence(path, "reading artifact", e))?;
    Ok(serde_json::from_str(&json)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn persistence(path: &Path, action: &str, err: std::io::Error) -> LearningError {
    LearningError::Persistence(format!("{action} {}: {err}", path.display()))
}

async fn cleanup(staged: &[(PathBuf, String, PathBuf)]) {
    for (tmp, _, _) in staged {
        if tokio::fs::remove_file(tmp).await.is_err() && tmp.exists() {
            warn!("Could not remove staging file {:?}", tmp);
        }
    }
}
