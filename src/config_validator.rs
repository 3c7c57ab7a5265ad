use crate::config::Config;
use crate::error::ThrottlerError;

/// Validates configuration objects for consistency and correctness
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates one limiter's window and capacity
    pub fn validate_window(
        name: &str,
        window_ms: u64,
        max_events: u32,
    ) -> Result<(), ThrottlerError> {
        if window_ms == 0 {
            return Err(ThrottlerError::Validation(format!(
                "{} window must be greater than 0",
                name
            )));
        }

        if max_events == 0 {
            return Err(ThrottlerError::Validation(format!(
                "{} max events must be at least 1",
                name
            )));
        }

        Ok(())
    }

    /// Validates the cleanup period
    pub fn validate_cleanup_interval(interval_ms: u64) -> Result<(), ThrottlerError> {
        if interval_ms == 0 {
            return Err(ThrottlerError::Validation(
                "Cleanup interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates a log level name
    pub fn validate_log_level(level: &str) -> Result<(), ThrottlerError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&level.to_lowercase().as_str()) {
            return Err(ThrottlerError::Validation(format!(
                "Invalid log level '{}'. Must be one of: {:?}",
                level, valid_levels
            )));
        }

        Ok(())
    }

    /// Validates the whole service configuration
    pub fn validate_config(config: &Config) -> Result<(), ThrottlerError> {
        Self::validate_window("Order limiter", config.order_window_ms, config.order_max_events)?;
        Self::validate_window(
            "Request limiter",
            config.request_window_ms,
            config.request_max_events,
        )?;
        Self::validate_cleanup_interval(config.cleanup_interval_ms)?;
        Self::validate_log_level(&config.log_level)?;

        Ok(())
    }
}
