//! Classifier family
//!
//! Text normalization, TF-IDF features, and the two-member soft-vote
//! ensemble (logistic regression + random forest) that each trained version
//! packages together.

pub mod ensemble;
pub mod forest;
pub mod logistic;
pub mod text;
pub mod vectorizer;

pub use ensemble::{EnsemblePrediction, SoftVoteEnsemble};
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use vectorizer::TfidfVectorizer;
