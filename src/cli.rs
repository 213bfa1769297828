//! CLI interface for newsguard
//!
//! Stands in for the serving layer: submits corrections, scores text with
//! the current version, and reports on the loop's state.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Config;
use crate::feedback::NewFeedback;
use crate::system::LearningSystem;
use crate::types::Label;

#[derive(Parser)]
#[command(name = "newsguard")]
#[command(about = "Continuous learning loop for a FAKE/REAL news classifier", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory override (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage correction feedback
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommands,
    },
    /// Score text with the current model version
    Predict {
        /// Article text to classify
        text: String,
    },
    /// Run a retraining cycle now, if the trigger allows it
    Retrain,
    /// Show system status
    Status {
        /// Emit machine-readable JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// List recorded model versions
    Versions,
}

#[derive(Subcommand)]
enum FeedbackCommands {
    /// Submit one prediction correction
    Add {
        /// Original article text
        text: String,
        /// Label the deployed model predicted (FAKE or REAL)
        #[arg(short, long)]
        predicted: String,
        /// Label the user says is correct (FAKE or REAL)
        #[arg(short, long)]
        actual: String,
        /// Model confidence at prediction time (0..1)
        #[arg(short, long)]
        confidence: Option<f64>,
        /// Submitting user id
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Submit a batch of corrections from a JSON file
    Batch {
        /// Path to a JSON array of {text, predicted_label, actual_label,
        /// confidence?, user_id?} objects
        file: PathBuf,
    },
    /// Show feedback statistics
    Stats,
}

/// One record of the batch file format.
#[derive(serde::Deserialize)]
struct BatchRecord {
    text: String,
    predicted_label: Label,
    actual_label: Label,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    user_id: Option<String>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = Some(data_dir);
    }
    let system = LearningSystem::open(config).await?;

    match cli.command {
        Commands::Feedback { command } => match command {
            FeedbackCommands::Add {
                text,
                predicted,
                actual,
                confidence,
                user,
            } => {
                let feedback = NewFeedback {
                    text,
                    predicted_label: Label::from_str(&predicted)?,
                    actual_label: Label::from_str(&actual)?,
                    confidence,
                    user_id: user,
                };
                let ack = system.submit_feedback(feedback).await?;
                println!("Recorded feedback {}", ack.feedback_id);
                println!("Retraining: {}", ack.retrain);
            }

            FeedbackCommands::Batch { file } => {
                let contents = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let records: Vec<BatchRecord> = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", file.display()))?;
                let batch: Vec<NewFeedback> = records
                    .into_iter()
                    .map(|r| NewFeedback {
                        text: r.text,
                        predicted_label: r.predicted_label,
                        actual_label: r.actual_label,
                        confidence: r.confidence,
                        user_id: r.user_id,
                    })
                    .collect();

                let ack = system.submit_feedback_batch(batch).await?;
                println!("Recorded {} feedback entries", ack.feedback_ids.len());
                println!("Retraining: {}", ack.retrain);
            }

            FeedbackCommands::Stats => {
                let stats = system.feedback_statistics().await;
                println!("Feedback Statistics");
                println!("===================");
                println!("Total feedback: {}", stats.total_feedback);
                println!("Prediction disagreements: {}", stats.accuracy_discrepancies);
                println!("High-confidence errors: {}", stats.high_confidence_errors);
                println!("Low-confidence errors: {}", stats.low_confidence_errors);
                if !stats.feedback_by_date.is_empty() {
                    println!();
                    println!("By date:");
                    for (date, count) in &stats.feedback_by_date {
                        println!("  {}: {}", date, count);
                    }
                }
                if let Some(daily) = &stats.daily_accuracy {
                    println!();
                    println!("Daily accuracy:");
                    for (date, accuracy) in daily {
                        println!("  {}: {:.4}", date, accuracy);
                    }
                }
            }
        },

        Commands::Predict { text } => match system.current_model_and_vectorizer().await {
            Some((ensemble, vectorizer)) => {
                let prediction = ensemble.predict_with_confidence(&vectorizer.transform(&text));
                println!("Prediction: {}", prediction.label);
                println!("Confidence: {:.4}", prediction.confidence);
                println!("P(FAKE): {:.4}", prediction.probability_fake);
                println!(
                    "Members: logistic {:.4}, forest {:.4} (agreement {:.0}%)",
                    prediction.logistic_probability,
                    prediction.forest_probability,
                    prediction.agreement * 100.0
                );
            }
            None => {
                println!("No model version available yet. Submit feedback to train one.");
            }
        },

        Commands::Retrain => {
            let outcome = system.run_retrain_cycle().await;
            println!("Retraining: {}", outcome);
        }

        Commands::Status { json } => {
            let status = system.system_status().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("NewsGuard Status");
                println!("================");
                println!("Feedback collected: {}", status.feedback_collected);
                println!("Model versions: {}", status.model_versions);
                println!("Retraining threshold: {}", status.retraining_threshold);
                match status.days_since_last_training {
                    Some(days) => println!("Days since last training: {}", days),
                    None => println!("Days since last training: never trained"),
                }
                match &status.current_performance {
                    Some(p) => {
                        println!();
                        println!("Current performance:");
                        println!("  accuracy:  {:.4}", p.accuracy);
                        println!("  precision: {:.4}", p.precision);
                        println!("  recall:    {:.4}", p.recall);
                        println!("  f1:        {:.4}", p.f1);
                    }
                    None => {
                        println!();
                        println!("No trained model yet.");
                    }
                }
                if let Some(trends) = &status.performance_trends {
                    println!();
                    println!("Trends over {} evaluations:", trends.accuracy.len());
                    println!(
                        "  accuracy: improvement rate {:+.4}, stability {:.4}",
                        trends.accuracy_improvement_rate, trends.accuracy_stability
                    );
                    println!(
                        "  f1:       improvement rate {:+.4}, stability {:.4}",
                        trends.f1_improvement_rate, trends.f1_stability
                    );
                }
            }
        }

        Commands::Versions => {
            let versions = system.versions().await;
            if versions.is_empty() {
                println!("No model versions recorded.");
            } else {
                println!("{} model versions:", versions.len());
                for version in &versions {
                    println!(
                        "  {}  created {}, accuracy {:.4}, f1 {:.4}, {} feedback entries",
                        version.id,
                        version.created_at.format("%Y-%m-%d %H:%M:%S"),
                        version.snapshot.accuracy,
                        version.snapshot.f1,
                        version.feedback_count
                    );
                }
            }
        }
    }

    Ok(())
}
