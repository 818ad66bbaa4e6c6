//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::jobs::WorkedDaysJobConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the stored collections
    pub data_dir: PathBuf,

    /// Seconds between worked-days recomputations
    pub worked_days_interval_secs: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("PAYROLL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let worked_days_interval_secs = env::var("WORKED_DAYS_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("WORKED_DAYS_INTERVAL_SECS"))?;
        if worked_days_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("WORKED_DAYS_INTERVAL_SECS"));
        }

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            data_dir,
            worked_days_interval_secs,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn worked_days_job(&self) -> WorkedDaysJobConfig {
        WorkedDaysJobConfig {
            interval: Duration::from_secs(self.worked_days_interval_secs),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_days_job_interval() {
        let config = Config {
            data_dir: PathBuf::from("./data"),
            worked_days_interval_secs: 60,
            environment: "production".to_string(),
        };

        assert!(config.is_production());
        assert_eq!(config.worked_days_job().interval, Duration::from_secs(60));
    }
}
