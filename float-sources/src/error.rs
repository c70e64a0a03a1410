//! Provider and chain failures.

use std::{fmt, time::Duration};

use ocean_model::DataSource;
use thiserror::Error;

/// Why a single provider produced no usable data. Never fatal on its own.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("undecodable response: {0}")]
    Decode(String),

    /// The provider cannot serve this variable/region.
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("no observations matched")]
    Empty,

    #[error("provider disabled by configuration")]
    Disabled,
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderFailure::Timeout(Duration::ZERO)
        } else if e.is_decode() {
            ProviderFailure::Decode(e.to_string())
        } else {
            ProviderFailure::Transport(e.to_string())
        }
    }
}

/// One provider's outcome in a failed chain run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub source: DataSource,
    pub failure: ProviderFailure,
}

/// Every provider in the chain failed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("[Float Sources] no data source could answer: {}", AttemptList(.attempts))]
pub struct DataUnavailableError {
    pub attempts: Vec<ProviderAttempt>,
}

struct AttemptList<'a>(&'a [ProviderAttempt]);

impl fmt::Display for AttemptList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no providers configured");
        }
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", a.source, a.failure)?;
        }
        Ok(())
    }
}
