//! Soft-voting ensemble over the logistic and forest members
//!
//! Averages the two members' positive-class probabilities. This is the
//! artifact the registry persists per version and the serving layer scores
//! with.

use serde::{Deserialize, Serialize};

use crate::model::forest::RandomForest;
use crate::model::logistic::LogisticRegression;
use crate::types::Label;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftVoteEnsemble {
    logistic: LogisticRegression,
    forest: RandomForest,
}

/// One live prediction with the detail the serving layer shows users.
#[derive(Debug, Clone, Serialize)]
pub struct EnsemblePrediction {
    pub label: Label,
    /// Probability mass on the winning class.
    pub confidence: f64,
    /// Averaged probability of the FAKE class.
    pub probability_fake: f64,
    pub logistic_probability: f64,
    pub forest_probability: f64,
    /// Fraction of members whose hard vote matches the ensemble label.
    pub agreement: f64,
}

impl SoftVoteEnsemble {
    pub fn new(logistic: LogisticRegression, forest: RandomForest) -> Self {
        Self { logistic, forest }
    }

    /// Averaged probability of the FAKE class.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        (self.logistic.predict_proba(features) + self.forest.predict_proba(features)) / 2.0
    }

    /// Hard 0.0/1.0 decision on the averaged probability.
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.predict_proba(features) >= 0.5 {
            1.0
        } else {
            0.0
        }
    }

    pub fn predict_with_confidence(&self, features: &[f64]) -> EnsemblePrediction {
        let logistic_probability = self.logistic.predict_proba(features);
        let forest_probability = self.forest.predict_proba(features);
        let probability_fake = (logistic_probability + forest_probability) / 2.0;

        let label = Label::from_target(probability_fake);
        let target = label.as_target();
        let member_votes = [
            self.logistic.predict(features),
            self.forest.predict(features),
        ];
        let agreement = member_votes.iter().filter(|&&vote| vote == target).count() as f64
            / member_votes.len() as f64;

        EnsemblePrediction {
            label,
            confidence: probability_fake.max(1.0 - probability_fake),
            probability_fake,
            logistic_probability,
            forest_probability,
            agreement,
        }
    }
}
