//! NewsGuard - Continuous Learning Library
//!
//! Model governance loop for a deployed FAKE/REAL news classifier:
//! - Append-only feedback store for user corrections
//! - Policy-driven retraining trigger (volume, recency, freshness)
//! - Deterministic TF-IDF + soft-vote ensemble trainer
//! - Held-out evaluation and a margin-based promotion gate
//! - Version registry with atomic artifact persistence
//! - Performance ledger with trend analysis
//!
//! # Example
//!
//! ```ignore
//! use newsguard::config::Config;
//! use newsguard::feedback::NewFeedback;
//! use newsguard::system::LearningSystem;
//! use newsguard::types::Label;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let system = LearningSystem::open(Config::load()?).await?;
//!     let ack = system
//!         .submit_feedback(NewFeedback {
//!             text: "BREAKING: miracle cure discovered!".to_string(),
//!             predicted_label: Label::Real,
//!             actual_label: Label::Fake,
//!             confidence: Some(0.87),
//!             user_id: None,
//!         })
//!         .await?;
//!     println!("recorded {}, pipeline: {}", ack.feedback_id, ack.retrain);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod types;

// Learning loop
pub mod feedback;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod system;
pub mod training;

// Binary surface
pub mod cli;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{LearningError, Result};
pub use feedback::{FeedbackEntry, FeedbackStatistics, FeedbackStore, NewFeedback};
pub use model::{EnsemblePrediction, SoftVoteEnsemble, TfidfVectorizer};
pub use registry::{ModelVersion, PerformanceSnapshot, TrendReport};
pub use system::{BatchAck, FeedbackAck, LearningSystem, RetrainOutcome, SystemStatus};
pub use types::Label;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
