//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Classification label for a news item.
///
/// Serialized as the uppercase strings `"FAKE"` / `"REAL"` so the on-disk
/// feedback log stays readable and matches what the serving layer sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "FAKE")]
    Fake,
    #[serde(rename = "REAL")]
    Real,
}

impl Label {
    /// Training-label mapping, fixed across retraining cycles: FAKE is the
    /// positive class.
    pub fn as_target(&self) -> f64 {
        match self {
            Label::Fake => 1.0,
            Label::Real => 0.0,
        }
    }

    /// Inverse of [`Label::as_target`] for thresholded model output.
    pub fn from_target(value: f64) -> Self {
        if value >= 0.5 {
            Label::Fake
        } else {
            Label::Real
        }
    }
}

impl std::str::FromStr for Label {
    type Err = crate::error::LearningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FAKE" => Ok(Label::Fake),
            "REAL" => Ok(Label::Real),
            other => Err(crate::error::LearningError::Validation(format!(
                "label must be FAKE or REAL, got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Fake => write!(f, "FAKE"),
            Label::Real => write!(f, "REAL"),
        }
    }
}
