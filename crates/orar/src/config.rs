/// Runtime configuration for fetching and calendar generation
use crate::error::OrarError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Public page describing the structure of the academic year.
pub const DEFAULT_CALENDAR_URL: &str = "https://www.ubbcluj.ro/ro/studenti/structura_an_universitar";

/// Timezone every schedule page is written in.
pub const DEFAULT_TIMEZONE: &str = "Europe/Bucharest";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrarConfig {
    /// Page holding the academic year structure tables
    pub calendar_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
    /// How many pages are fetched concurrently in one batch
    pub batch_size: usize,
    /// Pause between two batches, in milliseconds
    pub batch_delay_ms: u64,
    /// How long a scraped academic calendar stays fresh, in seconds
    pub calendar_ttl_secs: u64,
    /// IANA name of the institution's timezone
    pub timezone: String,
}

impl Default for OrarConfig {
    fn default() -> Self {
        Self {
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
            user_agent: concat!("orar/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 15,
            batch_size: 5,
            batch_delay_ms: 1_000,
            calendar_ttl_secs: 24 * 60 * 60,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl OrarConfig {
    /// Loads the configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON configuration file
    ///
    /// # Returns
    /// * `Ok(OrarConfig)` - Loaded configuration
    /// * `Err` - If the file can't be read, parsed, or holds invalid values
    pub fn load(path: &Path) -> Result<Self, OrarError> {
        let content = fs::read_to_string(path).map_err(|e| OrarError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        let config: OrarConfig = serde_json::from_str(&content).map_err(|e| OrarError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make the fetcher misbehave.
    pub fn validate(&self) -> Result<(), OrarError> {
        if self.batch_size == 0 {
            return Err(OrarError::Config {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(OrarError::Config {
                message: "request_timeout_secs must be at least 1".to_string(),
            });
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(OrarError::Config {
                message: format!("unknown timezone {}", self.timezone),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn calendar_ttl(&self) -> Duration {
        Duration::from_secs(self.calendar_ttl_secs)
    }

    /// Parsed timezone; falls back to Europe/Bucharest if the name is unknown.
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .unwrap_or(chrono_tz::Europe::Bucharest)
    }
}
