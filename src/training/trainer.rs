//! Candidate model trainer
//!
//! Turns the accumulated feedback log into a fitted ensemble plus the
//! held-out slice the evaluator scores it on. Every stochastic step (the
//! shuffle-split, bagging, feature subsampling) derives from the configured
//! seed, so the same log and config always produce the same candidate.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::config::Config;
use crate::error::{LearningError, Result};
use crate::feedback::FeedbackEntry;
use crate::model::{LogisticRegression, RandomForest, SoftVoteEnsemble, TfidfVectorizer};

/// Output of one training run, ready for evaluation.
#[derive(Debug)]
pub struct TrainedArtifacts {
    pub ensemble: SoftVoteEnsemble,
    pub vectorizer: TfidfVectorizer,
    /// Held-out slice, never seen by the vectorizer or the members.
    pub holdout_texts: Vec<String>,
    pub holdout_labels: Vec<f64>,
}

pub struct Trainer {
    config: Config,
}

impl Trainer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fit a candidate on the feedback log.
    pub fn train(&self, entries: &[FeedbackEntry]) -> Result<TrainedArtifacts> {
        let required = self.config.learning.min_feedback_threshold;
        if entries.len() < required {
            return Err(LearningError::InsufficientData {
                available: entries.len(),
                required,
            });
        }

        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let labels: Vec<f64> = entries.iter().map(|e| e.actual_label.as_target()).collect();

        let trainer = &self.config.trainer;
        let n = entries.len();
        let holdout_len = ((n as f64 * self.config.learning.holdout_fraction).ceil() as usize)
            .max(1)
            .min(n.saturating_sub(1));

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(trainer.seed);
        indices.shuffle(&mut rng);
        let (holdout_indices, train_indices) = indices.split_at(holdout_len);

        let train_texts: Vec<String> =
            train_indices.iter().map(|&i| texts[i].clone()).collect();
        let train_labels: Vec<f64> = train_indices.iter().map(|&i| labels[i]).collect();
        let holdout_texts: Vec<String> =
            holdout_indices.iter().map(|&i| texts[i].clone()).collect();
        let holdout_labels: Vec<f64> = holdout_indices.iter().map(|&i| labels[i]).collect();

        debug!(
            "Training candidate on {} entries ({} train / {} held out)",
            n,
            train_texts.len(),
            holdout_texts.len()
        );

        let vectorizer = TfidfVectorizer::fit(&train_texts, trainer.max_vocabulary);
        let features = vectorizer.transform_batch(&train_texts);

        let logistic = LogisticRegression::fit(
            &features,
            &train_labels,
            trainer.logistic_epochs,
            trainer.learning_rate,
            trainer.l2_regularization,
        );
        let forest = RandomForest::fit(
            &features,
            &train_labels,
            trainer.forest_trees,
            trainer.forest_max_depth,
            trainer.forest_min_split,
            trainer.seed,
        );

        Ok(TrainedArtifacts {
            ensemble: SoftVoteEnsemble::new(logistic, forest),
            vectorizer,
            holdout_texts,
            holdout_labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Label;
    use chrono::Utc;

    const FAKE_WORDS: [&str; 6] = [
        "shocking", "miracle", "exposed", "conspiracy", "secret", "clickbait",
    ];
    const REAL_WORDS: [&str; 6] = [
        "council", "budget", "report", "published", "quarterly", "minutes",
    ];

    fn entry(text: String, actual: Label) -> FeedbackEntry {
        FeedbackEntry {
            id: format!("fb_test_{}", text.len()),
            text,
            predicted_label: match actual {
                Label::Fake => Label::Real,
                Label::Real => Label::Fake,
            },
            actual_label: actual,
            confidence: Some(0.6),
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    fn balanced_entries(n: usize) -> Vec<FeedbackEntry> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    let words = [FAKE_WORDS[i % 6], FAKE_WORDS[(i + 1) % 6]];
                    entry(
                        format!("{} {} headline number {}", words[0], words[1], i),
                        Label::Fake,
                    )
                } else {
                    let words = [REAL_WORDS[i % 6], REAL_WORDS[(i + 1) % 6]];
                    entry(
                        format!("{} {} item number {}", words[0], words[1], i),
                        Label::Real,
                    )
                }
            })
            .collect()
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.trainer.logistic_epochs = 200;
        config.trainer.forest_trees = 10;
        config.trainer.forest_max_depth = 5;
        config
    }

    #[test]
    fn test_insufficient_data_is_rejected() {
        let trainer = Trainer::new(fast_config());
        let err = trainer.train(&balanced_entries(50)).unwrap_err();
        match err {
            LearningError::InsufficientData {
                available,
                required,
            } => {
                assert_eq!(available, 50);
                assert_eq!(required, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_train_produces_holdout_split() {
        let trainer = Trainer::new(fast_config());
        let artifacts = trainer.train(&balanced_entries(100)).unwrap();

        assert_eq!(artifacts.holdout_texts.len(), 20);
        assert_eq!(artifacts.holdout_labels.len(), 20);
        assert!(artifacts.vectorizer.vocabulary_len() > 0);

        // A seeded shuffle of a balanced log keeps both classes in the
        // held-out slice.
        assert!(artifacts.holdout_labels.iter().any(|&l| l == 1.0));
        assert!(artifacts.holdout_labels.iter().any(|&l| l == 0.0));
    }

    #[test]
    fn test_candidate_separates_the_classes() {
        let trainer = Trainer::new(fast_config());
        let artifacts = trainer.train(&balanced_entries(100)).unwrap();

        let fake = artifacts
            .vectorizer
            .transform("shocking miracle conspiracy exposed");
        let real = artifacts.vectorizer.transform("council budget report published");
        assert!(artifacts.ensemble.predict_proba(&fake) > 0.5);
        assert!(artifacts.ensemble.predict_proba(&real) < 0.5);
    }

    #[test]
    fn test_training_is_deterministic() {
        let entries = balanced_entries(100);
        let trainer = Trainer::new(fast_config());

        let a = trainer.train(&entries).unwrap();
        let b = trainer.train(&entries).unwrap();
        assert_eq!(a.ensemble, b.ensemble);
        assert_eq!(a.vectorizer, b.vectorizer);
        assert_eq!(a.holdout_texts, b.holdout_texts);
    }
}
