//! Feedback collection
//!
//! Append-only log of user corrections plus aggregate statistics over it.
//! Feedback is the only training input the learning loop has.

pub mod stats;
pub mod store;

pub use stats::FeedbackStatistics;
pub use store::{FeedbackEntry, FeedbackStore, NewFeedback};
