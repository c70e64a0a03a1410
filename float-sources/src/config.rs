//! Provider configuration loaded from environment variables.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    chain::DataSourceChain,
    live::{ErddapClient, LiveProvider},
    mock::MockProvider,
    provider::DataProvider,
    synthetic::SyntheticProvider,
};

pub const DEFAULT_ERDDAP_URL: &str = "https://erddap.ifremer.fr/erddap";

#[derive(Clone, Debug)]
pub struct FloatSourcesConfig {
    pub erddap_url: String,
    pub live_timeout: Duration,
    pub live_enabled: bool,
    /// Guard for the local providers.
    pub local_timeout: Duration,
}

impl Default for FloatSourcesConfig {
    fn default() -> Self {
        Self {
            erddap_url: DEFAULT_ERDDAP_URL.to_string(),
            live_timeout: Duration::from_millis(8000),
            live_enabled: true,
            local_timeout: Duration::from_secs(1),
        }
    }
}

impl FloatSourcesConfig {
    /// `ARGO_ERDDAP_URL`, `LIVE_TIMEOUT_MS`, `LIVE_ENABLED`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            erddap_url: std::env::var("ARGO_ERDDAP_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(d.erddap_url),
            live_timeout: Duration::from_millis(parse("LIVE_TIMEOUT_MS", 8000u64)),
            live_enabled: parse("LIVE_ENABLED", d.live_enabled),
            local_timeout: d.local_timeout,
        }
    }

    /// Standard chain: live → synthetic → mock.
    ///
    /// An unusable ERDDAP URL leaves the live provider out with a warning.
    pub fn build_chain(&self, anchor: DateTime<Utc>) -> DataSourceChain {
        let mut providers: Vec<Arc<dyn DataProvider>> = Vec::with_capacity(3);

        match ErddapClient::new(&self.erddap_url, self.live_timeout) {
            Ok(client) => providers.push(Arc::new(
                LiveProvider::new(Arc::new(client), self.live_timeout).enabled(self.live_enabled),
            )),
            Err(e) => warn!(error = %e, url = %self.erddap_url, "live provider unavailable"),
        }
        providers.push(Arc::new(
            SyntheticProvider::new(anchor).with_timeout(self.local_timeout),
        ));
        providers.push(Arc::new(MockProvider::new()));

        DataSourceChain::new(providers)
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().to_ascii_lowercase().parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_model::DataSource;

    #[test]
    fn standard_chain_order() {
        let chain = FloatSourcesConfig::default().build_chain(Utc::now());
        assert_eq!(
            chain.sources(),
            vec![DataSource::Live, DataSource::Synthetic, DataSource::Mock]
        );
    }

    #[test]
    fn bad_url_drops_live_provider() {
        let cfg = FloatSourcesConfig {
            erddap_url: "not a url".into(),
            ..FloatSourcesConfig::default()
        };
        assert_eq!(
            cfg.build_chain(Utc::now()).sources(),
            vec![DataSource::Synthetic, DataSource::Mock]
        );
    }
}
