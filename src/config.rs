use std::env;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub similarity_threshold: f64,
    pub score_scale: f64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.60,
            score_scale: 20.0,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            similarity_threshold: env::var("QUIZ_SIMILARITY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.similarity_threshold),
            score_scale: env::var("QUIZ_SCORE_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.score_scale),
            default_page_size: env::var("QUIZ_DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_page_size),
            max_page_size: env::var("QUIZ_MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_page_size),
        }
    }

    /// Rejects values the grading pipeline cannot work with.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(AppError::ValidationError(format!(
                "QUIZ_SIMILARITY_THRESHOLD must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }

        if self.score_scale.is_nan() || self.score_scale <= 0.0 {
            return Err(AppError::ValidationError(format!(
                "QUIZ_SCORE_SCALE must be positive, got {}",
                self.score_scale
            )));
        }

        if self.default_page_size < 1 || self.default_page_size > self.max_page_size {
            return Err(AppError::ValidationError(format!(
                "QUIZ_DEFAULT_PAGE_SIZE must be within [1, {}], got {}",
                self.max_page_size, self.default_page_size
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            similarity_threshold: 0.60,
            score_scale: 20.0,
            default_page_size: 10,
            max_page_size: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(config.similarity_threshold >= 0.0);
        assert!(config.score_scale > 0.0);
        assert!(config.default_page_size > 0);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        assert_eq!(config.similarity_threshold, 0.60);
        assert_eq!(config.score_scale, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = Config {
            similarity_threshold: 1.5,
            ..Config::test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_scale() {
        let config = Config {
            score_scale: 0.0,
            ..Config::test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_page_size_above_max() {
        let config = Config {
            default_page_size: 500,
            ..Config::test_config()
        };
        assert!(config.validate().is_err());
    }
}
