//! Error types shared by the timetable, academic calendar and feed subsystems.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or assembling schedules.
#[derive(Debug, Error, Clone)]
pub enum OrarError {
    /// The URL does not follow `.../orar/{YEAR}-{SEMESTER}/tabelar/{CODE}.html`
    #[error("Unrecognized timetable URL {url}: {message}")]
    SourceFormat { url: String, message: String },

    /// The page is too small to hold a timetable (usually not published yet)
    #[error("Empty timetable page ({bytes} bytes), program not yet started")]
    EmptyDocument { bytes: usize },

    /// The page has content but no table looks like a timetable
    #[error("No timetable located in page ({bytes} bytes)")]
    NoTimetableFound { bytes: usize },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The academic calendar page could not be fetched or parsed
    #[error("Academic calendar unavailable: {message}")]
    CalendarScrape { message: String },

    /// A caller-supplied timetable could not be read
    #[error("Invalid timetable: {message}")]
    InvalidTimetable { message: String },

    /// Configuration file could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl OrarError {
    /// Returns true for outcomes that are expected and should not be reported
    /// as failures, like a schedule page that has not been filled in yet.
    pub fn is_benign(&self) -> bool {
        matches!(self, OrarError::EmptyDocument { .. })
    }

    /// Returns true if this error is potentially transient.
    ///
    /// Nothing in this crate retries on its own; batch callers use this to
    /// decide what to report as "try again later".
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrarError::Network { .. } | OrarError::CalendarScrape { .. }
        )
    }
}

impl From<reqwest::Error> for OrarError {
    fn from(err: reqwest::Error) -> Self {
        OrarError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for OrarError {
    fn from(err: url::ParseError) -> Self {
        OrarError::SourceFormat {
            url: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OrarError {
    fn from(err: serde_json::Error) -> Self {
        OrarError::InvalidTimetable {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for OrarError {
    fn from(err: std::io::Error) -> Self {
        OrarError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_benign() {
        assert!(OrarError::EmptyDocument { bytes: 400 }.is_benign());
        assert!(!OrarError::NoTimetableFound { bytes: 4000 }.is_benign());
    }

    #[test]
    fn test_network_is_retryable() {
        let err = OrarError::Network {
            message: "timed out".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!OrarError::SourceFormat {
            url: "x".to_string(),
            message: "bad".to_string()
        }
        .is_retryable());
    }
}
