//! End-to-end tests for the continuous learning loop:
//! - feedback persistence across process restarts
//! - trigger firing exactly at the volume threshold
//! - bootstrap promotion and the serving boundary picking it up
//! - rejection of a candidate that does not beat the current model
//! - concurrent submissions producing at most one new version

use newsguard::{Config, Label, LearningSystem, NewFeedback, RetrainOutcome};
use std::sync::Arc;
use tempfile::TempDir;

const FAKE_WORDS: [&str; 6] = [
    "shocking", "miracle", "exposed", "conspiracy", "secret", "clickbait",
];
const REAL_WORDS: [&str; 6] = [
    "council", "budget", "report", "published", "quarterly", "minutes",
];

fn fast_config(dir: &TempDir, threshold: usize) -> Config {
    let mut config = Config::with_data_dir(dir.path().to_path_buf());
    config.learning.min_feedback_threshold = threshold;
    config.trainer.logistic_epochs = 200;
    config.trainer.forest_trees = 10;
    config.trainer.forest_max_depth = 5;
    config
}

/// A user correction where the deployed model guessed the opposite label.
fn correction(i: usize) -> NewFeedback {
    let (words, actual) = if i % 2 == 0 {
        (FAKE_WORDS, Label::Fake)
    } else {
        (REAL_WORDS, Label::Real)
    };
    NewFeedback {
        text: format!(
            "{} {} {} story {}",
            words[i % 6],
            words[(i + 1) % 6],
            words[(i + 2) % 6],
            i
        ),
        predicted_label: match actual {
            Label::Fake => Label::Real,
            Label::Real => Label::Fake,
        },
        actual_label: actual,
        confidence: Some(0.9),
        user_id: Some("tester".to_string()),
    }
}

// =====================================================================
// FEEDBACK DURABILITY
// =====================================================================

#[tokio::test]
async fn feedback_survives_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config = fast_config(&dir, 100);

    let mut ids = Vec::new();
    {
        let system = LearningSystem::open(config.clone()).await?;
        for i in 0..3 {
            let ack = system.submit_feedback(correction(i)).await?;
            assert!(matches!(ack.retrain, RetrainOutcome::NotDue(_)));
            ids.push(ack.feedback_id);
        }
    }

    let reopened = LearningSystem::open(config).await?;
    let status = reopened.system_status().await;
    assert_eq!(status.feedback_collected, 3);
    assert_eq!(status.model_versions, 0);
    assert_eq!(status.retraining_threshold, 100);
    assert!(status.current_performance.is_none());
    assert!(status.days_since_last_training.is_none());
    assert!(status.performance_trends.is_none());

    // Every synthetic correction disagrees with the deployed prediction.
    let stats = reopened.feedback_statistics().await;
    assert_eq!(stats.total_feedback, 3);
    assert_eq!(stats.accuracy_discrepancies, 3);
    assert_eq!(stats.high_confidence_errors, 3);
    assert_eq!(stats.low_confidence_errors, 0);

    Ok(())
}

#[tokio::test]
async fn invalid_feedback_is_rejected_whole() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let system = LearningSystem::open(fast_config(&dir, 100)).await?;

    let blank = NewFeedback {
        text: "   ".to_string(),
        ..correction(0)
    };
    assert!(system.submit_feedback(blank).await.is_err());

    let out_of_range = NewFeedback {
        confidence: Some(1.5),
        ..correction(0)
    };
    assert!(system.submit_feedback(out_of_range).await.is_err());

    // One bad record rejects the whole batch; nothing is stored.
    let mut batch: Vec<NewFeedback> = (0..3).map(correction).collect();
    batch.push(NewFeedback {
        text: String::new(),
        ..correction(3)
    });
    assert!(system.submit_feedback_batch(batch).await.is_err());

    assert_eq!(system.system_status().await.feedback_collected, 0);
    Ok(())
}

// =====================================================================
// TRIGGER BOUNDARY AND BOOTSTRAP PROMOTION
// =====================================================================

#[tokio::test]
async fn trigger_fires_exactly_at_threshold() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let system = LearningSystem::open(fast_config(&dir, 100)).await?;

    let batch: Vec<NewFeedback> = (0..99).map(correction).collect();
    let ack = system.submit_feedback_batch(batch).await?;
    assert!(
        matches!(ack.retrain, RetrainOutcome::NotDue(_)),
        "99 entries must stay below the threshold, got {}",
        ack.retrain
    );
    assert_eq!(system.system_status().await.model_versions, 0);

    let ack = system.submit_feedback(correction(99)).await?;
    assert!(
        matches!(ack.retrain, RetrainOutcome::Promoted { .. }),
        "the 100th entry must trigger a bootstrap promotion, got {}",
        ack.retrain
    );
    assert_eq!(system.system_status().await.model_versions, 1);

    Ok(())
}

#[tokio::test]
async fn promoted_version_serves_predictions() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let system = LearningSystem::open(fast_config(&dir, 100)).await?;

    let batch: Vec<NewFeedback> = (0..100).map(correction).collect();
    let ack = system.submit_feedback_batch(batch).await?;
    assert!(matches!(ack.retrain, RetrainOutcome::Promoted { .. }));

    let (ensemble, vectorizer) = system
        .current_model_and_vectorizer()
        .await
        .expect("a current version after promotion");

    let fake = ensemble.predict_with_confidence(
        &vectorizer.transform("shocking secret miracle cure exposed"),
    );
    assert_eq!(fake.label, Label::Fake);
    assert!(fake.confidence >= 0.5);

    let real = ensemble.predict_with_confidence(
        &vectorizer.transform("council published the quarterly budget report"),
    );
    assert_eq!(real.label, Label::Real);

    let versions = system.versions().await;
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].feedback_count, 100);
    assert!(versions[0].model_path.exists());
    assert!(versions[0].vectorizer_path.exists());

    // One promotion leaves one ledger entry behind.
    let trends = system
        .system_status()
        .await
        .performance_trends
        .expect("trends after first promotion");
    assert_eq!(trends.accuracy.len(), 1);

    Ok(())
}

// =====================================================================
// PROMOTION GATE
// =====================================================================

#[tokio::test]
async fn unimproved_candidate_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut config = fast_config(&dir, 100);
    config.learning.retraining_interval_days = 0;
    let system = LearningSystem::open(config).await?;

    let batch: Vec<NewFeedback> = (0..100).map(correction).collect();
    let ack = system.submit_feedback_batch(batch).await?;
    assert!(matches!(ack.retrain, RetrainOutcome::Promoted { .. }));

    // 49 fresh entries stay below the new-feedback floor (threshold / 2).
    let batch: Vec<NewFeedback> = (100..149).map(correction).collect();
    let ack = system.submit_feedback_batch(batch).await?;
    assert!(
        matches!(ack.retrain, RetrainOutcome::NotDue(_)),
        "expected not due, got {}",
        ack.retrain
    );

    // The 50th reaches the floor. The candidate retrains on the same
    // separable distribution, matches the current scores, and the gate
    // rejects it for lack of improvement.
    let ack = system.submit_feedback(correction(149)).await?;
    assert!(
        matches!(ack.retrain, RetrainOutcome::Rejected { .. }),
        "expected rejection, got {}",
        ack.retrain
    );

    let status = system.system_status().await;
    assert_eq!(status.model_versions, 1);
    let trends = status.performance_trends.expect("trends");
    assert_eq!(trends.accuracy.len(), 1, "rejection must not touch the ledger");

    Ok(())
}

// =====================================================================
// CONCURRENCY
// =====================================================================

#[tokio::test]
async fn concurrent_submissions_cause_one_retrain() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let system = Arc::new(LearningSystem::open(fast_config(&dir, 100)).await?);

    let batch: Vec<NewFeedback> = (0..98).map(correction).collect();
    system.submit_feedback_batch(batch).await?;

    let first = {
        let system = Arc::clone(&system);
        tokio::spawn(async move { system.submit_feedback(correction(98)).await })
    };
    let second = {
        let system = Arc::clone(&system);
        tokio::spawn(async move { system.submit_feedback(correction(99)).await })
    };

    let outcomes = [first.await??.retrain, second.await??.retrain];
    let promotions = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, RetrainOutcome::Promoted { .. }))
        .count();
    assert_eq!(
        promotions, 1,
        "exactly one submission may promote, got {} and {}",
        outcomes[0], outcomes[1]
    );

    let status = system.system_status().await;
    assert_eq!(status.feedback_collected, 100);
    assert_eq!(status.model_versions, 1);

    Ok(())
}
