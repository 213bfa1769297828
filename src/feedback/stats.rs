//! Aggregate feedback statistics
//!
//! Pure summary over the feedback log: volume by day, disagreement counts,
//! and the confidence profile of the model's mistakes. Feeds the system
//! status report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::feedback::store::FeedbackEntry;

/// How many entries the log needs before per-day accuracy is meaningful.
const DAILY_ACCURACY_MIN_ENTRIES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStatistics {
    pub total_feedback: usize,
    /// Entries per calendar day (YYYY-MM-DD), ascending.
    pub feedback_by_date: BTreeMap<String, usize>,
    /// Entries where the prediction disagreed with the user's label.
    pub accuracy_discrepancies: usize,
    /// Disagreements the model was sure about (confidence > 0.8).
    pub high_confidence_errors: usize,
    /// Disagreements the model already doubted (confidence < 0.5).
    pub low_confidence_errors: usize,
    /// Fraction of agreeing predictions per day; only populated once the
    /// log holds more than `DAILY_ACCURACY_MIN_ENTRIES` entries.
    pub daily_accuracy: Option<BTreeMap<String, f64>>,
}

impl FeedbackStatistics {
    pub fn compute(entries: &[FeedbackEntry]) -> Self {
        let mut feedback_by_date: BTreeMap<String, usize> = BTreeMap::new();
        let mut accuracy_discrepancies = 0;
        let mut high_confidence_errors = 0;
        let mut low_confidence_errors = 0;
        let mut daily_hits: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for entry in entries {
            let date = entry.timestamp.format("%Y-%m-%d").to_string();
            *feedback_by_date.entry(date.clone()).or_default() += 1;

            let correct = entry.predicted_label == entry.actual_label;
            let (hits, total) = daily_hits.entry(date).or_default();
            *total += 1;
            if correct {
                *hits += 1;
            } else {
                accuracy_discrepancies += 1;
                match entry.confidence {
                    Some(confidence) if confidence > 0.8 => high_confidence_errors += 1,
                    Some(confidence) if confidence < 0.5 => low_confidence_errors += 1,
                    _ => {}
                }
            }
        }

        let daily_accuracy = if entries.len() > DAILY_ACCURACY_MIN_ENTRIES {
            Some(
                daily_hits
                    .into_iter()
                    .map(|(date, (hits, total))| (date, hits as f64 / total as f64))
                    .collect(),
            )
        } else {
            None
        };

        Self {
            total_feedback: entries.len(),
            feedback_by_date,
            accuracy_discrepancies,
            high_confidence_errors,
            low_confidence_errors,
            daily_accuracy,
        }
    }
}
