use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Tunables shared by every grading step of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct GradingPolicy {
    /// Minimum similarity for a short answer to count as correct.
    pub similarity_threshold: f64,
    /// Upper bound of the scaled score (20 for the usual 0-20 marking).
    pub score_scale: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.60,
            score_scale: 20.0,
        }
    }
}

impl From<&Config> for GradingPolicy {
    fn from(config: &Config) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            score_scale: config.score_scale,
        }
    }
}
