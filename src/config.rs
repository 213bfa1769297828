//! Configuration management
//!
//! Manages the learning-core configuration: retraining policy thresholds,
//! trainer hyperparameters, and storage locations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Retraining policy and promotion thresholds
    #[serde(default)]
    pub learning: LearningConfig,
    /// Trainer hyperparameters
    #[serde(default)]
    pub trainer: TrainerConfig,
    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Retraining policy and promotion thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Minimum feedback samples before retraining is considered
    #[serde(default = "default_min_feedback_threshold")]
    pub min_feedback_threshold: usize,
    /// Days between retraining attempts
    #[serde(default = "default_retraining_interval_days")]
    pub retraining_interval_days: i64,
    /// Minimum held-out improvement (accuracy or f1) for promotion
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: f64,
    /// Fraction of feedback withheld from training for evaluation
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,
}

fn default_min_feedback_threshold() -> usize {
    100
}

fn default_retraining_interval_days() -> i64 {
    7
}

fn default_promotion_threshold() -> f64 {
    0.02
}

fn default_holdout_fraction() -> f64 {
    0.2
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_feedback_threshold: default_min_feedback_threshold(),
            retraining_interval_days: default_retraining_interval_days(),
            promotion_threshold: default_promotion_threshold(),
            holdout_fraction: default_holdout_fraction(),
        }
    }
}

impl LearningConfig {
    /// New-feedback floor for the third retraining condition
    /// (integer floor of half the threshold).
    pub fn new_feedback_floor(&self) -> usize {
        self.min_feedback_threshold / 2
    }
}

/// Trainer hyperparameters
///
/// Every stochastic step in training derives from `seed`, so identical
/// feedback plus identical config reproduces the same artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Vocabulary cap for the TF-IDF vectorizer
    #[serde(default = "default_max_vocabulary")]
    pub max_vocabulary: usize,
    /// Seed for the split shuffle, bagging, and feature subsampling
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Gradient-descent epochs for the logistic member
    #[serde(default = "default_logistic_epochs")]
    pub logistic_epochs: usize,
    /// Gradient-descent learning rate
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// L2 regularization strength for the logistic member
    #[serde(default = "default_l2_regularization")]
    pub l2_regularization: f64,
    /// Number of trees in the forest member
    #[serde(default = "default_forest_trees")]
    pub forest_trees: usize,
    /// Maximum tree depth
    #[serde(default = "default_forest_max_depth")]
    pub forest_max_depth: usize,
    /// Minimum samples required to split a node
    #[serde(default = "default_forest_min_split")]
    pub forest_min_split: usize,
}

fn default_max_vocabulary() -> usize {
    5000
}

fn default_seed() -> u64 {
    42
}

fn default_logistic_epochs() -> usize {
    1000
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_l2_regularization() -> f64 {
    0.001
}

fn default_forest_trees() -> usize {
    100
}

fn default_forest_max_depth() -> usize {
    10
}

fn default_forest_min_split() -> usize {
    2
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_vocabulary: default_max_vocabulary(),
            seed: default_seed(),
            logistic_epochs: default_logistic_epochs(),
            learning_rate: default_learning_rate(),
            l2_regularization: default_l2_regularization(),
            forest_trees: default_forest_trees(),
            forest_max_depth: default_forest_max_depth(),
            forest_min_split: default_forest_min_split(),
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory override; platform data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, creating defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Resolved data directory (config override or platform default)
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(default_data_dir)
    }

    /// Directory holding the three durable JSON collections
    pub fn feedback_dir(&self) -> PathBuf {
        self.data_dir().join("feedback")
    }

    /// Directory holding serialized model artifacts, one pair per version
    pub fn models_dir(&self) -> PathBuf {
        self.data_dir().join("models")
    }

    /// Config rooted at a custom data directory (tests, ad-hoc deployments)
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: Some(data_dir),
            },
            ..Default::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning: LearningConfig::default(),
            trainer: TrainerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to get config directory")?;
    Ok(base.join("newsguard").join("config.toml"))
}

/// Default data directory under the platform data dir
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsguard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let cfg = LearningConfig::default();
        assert_eq!(cfg.min_feedback_threshold, 100);
        assert_eq!(cfg.retraining_interval_days, 7);
        assert_eq!(cfg.promotion_threshold, 0.02);
        assert_eq!(cfg.new_feedback_floor(), 50);
    }

    #[test]
    fn test_new_feedback_floor_uses_integer_division() {
        let cfg = LearningConfig {
            min_feedback_threshold: 101,
            ..Default::default()
        };
        assert_eq!(cfg.new_feedback_floor(), 50);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.learning.min_feedback_threshold,
            config.learning.min_feedback_threshold
        );
        assert_eq!(parsed.trainer.max_vocabulary, 5000);
        assert_eq!(parsed.trainer.seed, 42);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.learning.min_feedback_threshold, 100);
        assert_eq!(parsed.trainer.forest_trees, 100);
        assert!(parsed.storage.data_dir.is_none());
    }

    #[test]
    fn test_storage_dirs_derive_from_data_dir() {
        let config = Config::with_data_dir(PathBuf::from("/tmp/ng-test"));
        assert_eq!(config.feedback_dir(), PathBuf::from("/tmp/ng-test/feedback"));
        assert_eq!(config.models_dir(), PathBuf::from("/tmp/ng-test/models"));
    }
}
