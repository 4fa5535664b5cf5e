use std::env;

use crate::errors::{AppError, AppResult};

/// Tunables for scoring and adaptive recommendation.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Fraction removed from a multiple-choice score per incorrect pick.
    pub incorrect_penalty: f64,
    /// A difficulty level whose mean score falls below this is a knowledge gap.
    pub gap_threshold: f64,
    /// A difficulty level whose mean score rises above this is a strong area.
    pub strong_threshold: f64,
    pub min_difficulty: u8,
    pub max_difficulty: u8,
    /// Level recommended to users without any completed session.
    pub default_difficulty: u8,
    pub velocity_window: usize,
    pub recent_performance_len: usize,
    pub max_time_spent_secs: u32,
    pub profile_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            incorrect_penalty: parse_var("QUIZ_INCORRECT_PENALTY", defaults.incorrect_penalty),
            gap_threshold: parse_var("QUIZ_GAP_THRESHOLD", defaults.gap_threshold),
            strong_threshold: parse_var("QUIZ_STRONG_THRESHOLD", defaults.strong_threshold),
            min_difficulty: parse_var("QUIZ_MIN_DIFFICULTY", defaults.min_difficulty),
            max_difficulty: parse_var("QUIZ_MAX_DIFFICULTY", defaults.max_difficulty),
            default_difficulty: parse_var("QUIZ_DEFAULT_DIFFICULTY", defaults.default_difficulty),
            velocity_window: parse_var("QUIZ_VELOCITY_WINDOW", defaults.velocity_window),
            recent_performance_len: parse_var(
                "QUIZ_RECENT_PERFORMANCE_LEN",
                defaults.recent_performance_len,
            ),
            max_time_spent_secs: parse_var("QUIZ_MAX_TIME_SPENT_SECS", defaults.max_time_spent_secs),
            profile_cache_ttl_secs: parse_var(
                "QUIZ_PROFILE_CACHE_TTL_SECS",
                defaults.profile_cache_ttl_secs,
            ),
        }
    }

    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.incorrect_penalty) {
            return Err(AppError::ValidationError(format!(
                "incorrect_penalty must be within [0, 1], got {}",
                self.incorrect_penalty
            )));
        }

        if self.gap_threshold > self.strong_threshold {
            return Err(AppError::ValidationError(format!(
                "gap_threshold ({}) must not exceed strong_threshold ({})",
                self.gap_threshold, self.strong_threshold
            )));
        }

        if self.min_difficulty < 1
            || self.min_difficulty > self.max_difficulty
            || self.max_difficulty > 10
        {
            return Err(AppError::ValidationError(format!(
                "difficulty range [{}, {}] must lie within [1, 10]",
                self.min_difficulty, self.max_difficulty
            )));
        }

        if !(self.min_difficulty..=self.max_difficulty).contains(&self.default_difficulty) {
            return Err(AppError::ValidationError(format!(
                "default_difficulty {} is outside [{}, {}]",
                self.default_difficulty, self.min_difficulty, self.max_difficulty
            )));
        }

        if self.velocity_window == 0 || self.recent_performance_len < self.velocity_window {
            return Err(AppError::ValidationError(
                "velocity_window must be positive and no larger than recent_performance_len"
                    .to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            profile_cache_ttl_secs: 1,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            incorrect_penalty: 0.10,
            gap_threshold: 60.0,
            strong_threshold: 80.0,
            min_difficulty: 1,
            max_difficulty: 10,
            default_difficulty: 5,
            velocity_window: 5,
            recent_performance_len: 10,
            max_time_spent_secs: 3600,
            profile_cache_ttl_secs: 300,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(config.max_difficulty >= config.min_difficulty);
        assert!(config.velocity_window > 0);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.incorrect_penalty, 0.10);
        assert_eq!(config.gap_threshold, 60.0);
        assert_eq!(config.strong_threshold, 80.0);
        assert_eq!(config.max_time_spent_secs, 3600);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = Config {
            gap_threshold: 90.0,
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_default_difficulty() {
        let config = Config {
            default_difficulty: 11,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("QUIZ_TEST_GARBAGE_VALUE", "not-a-number");
        let value: f64 = parse_var("QUIZ_TEST_GARBAGE_VALUE", 1.5);
        assert_eq!(value, 1.5);
    }
}
