//! Logistic regression ensemble member
//!
//! Batch gradient descent over the full training set with L2 regularization.
//! Weights start at zero and every step is a pure function of the data and
//! hyperparameters, so refitting on identical input reproduces the exact
//! same model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    /// Fit on dense feature rows with 0.0/1.0 labels.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[f64],
        epochs: usize,
        learning_rate: f64,
        l2_regularization: f64,
    ) -> Self {
        let dim = features.first().map(Vec::len).unwrap_or(0);
        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;

        if features.is_empty() {
            return Self { weights, bias };
        }

        let n = features.len() as f64;
        for _ in 0..epochs {
            let mut grad_weights = vec![0.0; dim];
            let mut grad_bias = 0.0;

            for (row, &label) in features.iter().zip(labels) {
                let error = sigmoid(dot(&weights, row) + bias) - label;
                for (grad, &x) in grad_weights.iter_mut().zip(row) {
                    *grad += error * x;
                }
                grad_bias += error;
            }

            for (weight, grad) in weights.iter_mut().zip(&grad_weights) {
                *weight -= learning_rate * (grad / n + l2_regularization * *weight);
            }
            bias -= learning_rate * grad_bias / n;
        }

        Self { weights, bias }
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, features) + self.bias)
    }

    /// Hard 0.0/1.0 decision at the 0.5 boundary.
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.predict_proba(features) >= 0.5 {
            1.0
        } else {
            0.0
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}
