//! Configuration Module - Collector Tuning Parameters
//!
//! Manages the configuration parameters for the collector.
//! All parameters have sensible defaults.

/// Initial collection threshold: the tracked-object count at which the first
/// automatic collection is triggered.
pub const INITIAL_THRESHOLD: usize = 6;

/// Main configuration for the conservative garbage collector
///
/// # Examples
///
/// ```rust
/// use cgc::GcConfig;
///
/// // Use default configuration
/// let config = GcConfig::default();
///
/// // Custom configuration for a chatty, late-triggering collector
/// let config = GcConfig {
///     initial_threshold: 64,
///     verbose: true,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Tracked-object count at which the next allocation triggers a
    /// collection cycle.
    ///
    /// Only the first cycle uses this value; after every completed cycle the
    /// threshold is recomputed as twice the survivor count.
    ///
    /// Default: 6
    pub initial_threshold: usize,

    /// Enable verbose cycle logging
    ///
    /// Prints cycle phase lines (`[CGC] ...`) with timings to stdout.
    /// Default: false
    pub verbose: bool,

    /// Enable statistics collection
    ///
    /// Collects cycle counts, allocation counts and reclaim totals.
    /// Default: true
    pub stats_enabled: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            initial_threshold: INITIAL_THRESHOLD,
            verbose: false,
            stats_enabled: true,
        }
    }
}

impl GcConfig {
    /// Validate configuration
    ///
    /// Checks if all values are in valid ranges.
    /// Returns error if configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cgc::GcConfig;
    ///
    /// let config = GcConfig {
    ///     initial_threshold: 0, // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(
                "initial_threshold must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - CGC_INITIAL_THRESHOLD
    /// - CGC_VERBOSE
    /// - CGC_STATS
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CGC_INITIAL_THRESHOLD") {
            if let Ok(threshold) = val.parse::<usize>() {
                config.initial_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("CGC_VERBOSE") {
            config.verbose = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("CGC_STATS") {
            config.stats_enabled = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GcConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_threshold, INITIAL_THRESHOLD);
        assert!(config.stats_enabled);
        assert!(!config.verbose);
    }

    #[test]
    fn test_invalid_threshold() {
        let config = GcConfig {
            initial_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
