//! Argo float data behind an ordered fallback chain.
//!
//! - [`LiveProvider`] over a [`FloatApi`] (ERDDAP in production)
//! - [`SyntheticProvider`]: deterministic climatology-shaped data
//! - [`MockProvider`]: static fixtures, never fails
//! - [`DataSourceChain`]: first usable answer wins, records stamped with provenance

pub mod chain;
pub mod config;
pub mod error;
pub mod live;
pub mod mock;
pub mod provider;
pub mod synthetic;

pub use chain::{ChainOutcome, DataSourceChain};
pub use config::FloatSourcesConfig;
pub use error::{DataUnavailableError, ProviderAttempt, ProviderFailure};
pub use live::{ErddapClient, FloatApi, LiveProvider, LiveRequest};
pub use mock::MockProvider;
pub use provider::{DataProvider, ResolvedQuery};
pub use synthetic::SyntheticProvider;
