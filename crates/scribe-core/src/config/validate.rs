//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.workflow.summary_points == 0 {
            return Err(ConfigError::ValidationError(
                "workflow.summary_points must be > 0".into(),
            ));
        }
        if self.workflow.retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "workflow.retry_attempts must be > 0".into(),
            ));
        }
        if self.workflow.max_validation_chars == 0 {
            return Err(ConfigError::ValidationError(
                "workflow.max_validation_chars must be > 0".into(),
            ));
        }
        Ok(())
    }
}
