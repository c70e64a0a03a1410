//! Ordered provider fallback.

use std::sync::Arc;

use chrono::Utc;
use ocean_model::{DataSource, Query, Record};
use tracing::{info, instrument, warn};

use crate::{
    error::{DataUnavailableError, ProviderAttempt, ProviderFailure},
    provider::DataProvider,
};

/// Records from the first provider that answered, plus notes about skipped ones.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub records: Vec<Record>,
    pub source: DataSource,
    pub warnings: Vec<String>,
}

/// Tries providers in order; the first usable answer wins.
pub struct DataSourceChain {
    providers: Vec<Arc<dyn DataProvider>>,
}

impl DataSourceChain {
    pub fn new(providers: Vec<Arc<dyn DataProvider>>) -> Self {
        Self { providers }
    }

    pub fn sources(&self) -> Vec<DataSource> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    /// Fetches records for `query`.
    ///
    /// A provider is skipped when it fails, exceeds its timeout, or returns
    /// nothing. Providers resolve missing region and variable to defaults, so
    /// an empty answer is never final.
    ///
    /// # Errors
    /// [`DataUnavailableError`] when every provider was skipped.
    #[instrument(skip_all, fields(variable = query.variable_or_default().as_str(), concrete = query.is_concrete()))]
    pub async fn fetch(&self, query: &Query) -> Result<ChainOutcome, DataUnavailableError> {
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        for provider in &self.providers {
            let source = provider.source();
            let budget = provider.timeout();

            let outcome = match tokio::time::timeout(budget, provider.fetch(query)).await {
                Err(_) => Err(ProviderFailure::Timeout(budget)),
                Ok(Ok(obs)) if obs.is_empty() => Err(ProviderFailure::Empty),
                Ok(res) => res,
            };

            match outcome {
                Ok(observations) => {
                    let retrieved_at = Utc::now();
                    let records: Vec<Record> = observations
                        .into_iter()
                        .map(|o| o.stamp(source, retrieved_at))
                        .collect();
                    info!(%source, count = records.len(), skipped = attempts.len(), "data source answered");

                    let warnings = attempts
                        .iter()
                        .map(|a| format!("{} data unavailable ({}); used {source} data", a.source, a.failure))
                        .collect();
                    return Ok(ChainOutcome {
                        records,
                        source,
                        warnings,
                    });
                }
                Err(failure) => {
                    warn!(%source, error = %failure, "data source skipped");
                    attempts.push(ProviderAttempt { source, failure });
                }
            }
        }

        Err(DataUnavailableError { attempts })
    }
}
