//! Held-out evaluation
//!
//! Scores a fitted candidate on the slice the trainer kept aside. Binary
//! metrics with FAKE as the positive class; any component with a zero
//! denominator is reported as 0.0 rather than NaN, so downstream comparisons
//! always see ordered numbers.

use chrono::Utc;
use tracing::debug;

use crate::error::{LearningError, Result};
use crate::model::{SoftVoteEnsemble, TfidfVectorizer};
use crate::registry::PerformanceSnapshot;

pub fn evaluate(
    ensemble: &SoftVoteEnsemble,
    vectorizer: &TfidfVectorizer,
    texts: &[String],
    labels: &[f64],
) -> Result<PerformanceSnapshot> {
    if texts.is_empty() {
        return Err(LearningError::Evaluation(
            "held-out set is empty".to_string(),
        ));
    }
    if texts.len() != labels.len() {
        return Err(LearningError::Evaluation(format!(
            "{} texts but {} labels",
            texts.len(),
            labels.len()
        )));
    }
    let positives = labels.iter().filter(|&&l| l == 1.0).count();
    if positives == 0 || positives == labels.len() {
        return Err(LearningError::Evaluation(
            "held-out set contains a single class".to_string(),
        ));
    }

    let mut tp = 0usize;
    let mut tn = 0usize;
    let mut fp = 0usize;
    let mut fne = 0usize;
    for (text, &label) in texts.iter().zip(labels) {
        let predicted = ensemble.predict(&vectorizer.transform(text));
        match (predicted == 1.0, label == 1.0) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (true, false) => fp += 1,
            (false, true) => fne += 1,
        }
    }

    let accuracy = (tp + tn) as f64 / texts.len() as f64;
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fne);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    debug!(
        "Evaluated candidate on {} held-out entries: accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
        texts.len(),
        accuracy,
        precision,
        recall,
        f1
    );

    Ok(PerformanceSnapshot {
        accuracy,
        precision,
        recall,
        f1,
        evaluated_at: Utc::now(),
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticRegression, RandomForest};

    fn fit_on(docs: &[&str], labels: &[f64]) -> (SoftVoteEnsemble, TfidfVectorizer) {
        let docs: Vec<String> = docs.iter().map(|d| d.to_string()).collect();
        let vectorizer = TfidfVectorizer::fit(&docs, 100);
        let features = vectorizer.transform_batch(&docs);
        let ensemble = SoftVoteEnsemble::new(
            LogisticRegression::fit(&features, labels, 300, 0.5, 0.001),
            RandomForest::fit(&features, labels, 10, 5, 2, 42),
        );
        (ensemble, vectorizer)
    }

    fn strings(docs: &[&str]) -> Vec<String> {
        docs.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_empty_holdout_is_an_error() {
        let (ensemble, vectorizer) = fit_on(
            &["miracle cure", "budget report"],
            &[1.0, 0.0],
        );
        let err = evaluate(&ensemble, &vectorizer, &[], &[]).unwrap_err();
        assert!(matches!(err, LearningError::Evaluation(_)));
    }

    #[test]
    fn test_single_class_holdout_is_an_error() {
        let (ensemble, vectorizer) = fit_on(
            &["miracle cure", "budget report"],
            &[1.0, 0.0],
        );
        let err = evaluate(
            &ensemble,
            &vectorizer,
            &strings(&["miracle cure", "miracle scandal"]),
            &[1.0, 1.0],
        )
        .unwrap_err();
        assert!(matches!(err, LearningError::Evaluation(_)));
    }

    #[test]
    fn test_perfect_classifier_scores_one() {
        let (ensemble, vectorizer) = fit_on(
            &[
                "shocking miracle cure",
                "secret conspiracy exposed",
                "council budget published",
                "quarterly report minutes",
            ],
            &[1.0, 1.0, 0.0, 0.0],
        );
        let snapshot = evaluate(
            &ensemble,
            &vectorizer,
            &strings(&["shocking miracle conspiracy", "council quarterly report"]),
            &[1.0, 0.0],
        )
        .unwrap();
        assert_eq!(snapshot.accuracy, 1.0);
        assert_eq!(snapshot.precision, 1.0);
        assert_eq!(snapshot.recall, 1.0);
        assert_eq!(snapshot.f1, 1.0);
    }

    #[test]
    fn test_never_positive_model_scores_zero_without_nan() {
        // Fit on a single-class log so the ensemble always answers REAL.
        let (ensemble, vectorizer) = fit_on(
            &["council budget", "quarterly report", "published minutes"],
            &[0.0, 0.0, 0.0],
        );
        let snapshot = evaluate(
            &ensemble,
            &vectorizer,
            &strings(&["shocking miracle", "council budget"]),
            &[1.0, 0.0],
        )
        .unwrap();
        assert_eq!(snapshot.precision, 0.0);
        assert_eq!(snapshot.recall, 0.0);
        assert_eq!(snapshot.f1, 0.0);
        assert!(!snapshot.accuracy.is_nan());
        assert_eq!(snapshot.accuracy, 0.5);
    }
}
