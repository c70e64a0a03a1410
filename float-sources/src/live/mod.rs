//! Live Argo observations from a remote float API.

pub mod erddap;

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use ocean_model::{BoundingBox, DataSource, DepthRange, Observation, Query, TimeRange, Variable};
use tracing::{debug, instrument};

use crate::{
    error::ProviderFailure,
    provider::{DataProvider, ResolvedQuery},
};

pub use erddap::ErddapClient;

/// Half-width of the pressure window around a single requested depth (m).
pub const POINT_DEPTH_TOLERANCE_M: f64 = 10.0;

/// Fully resolved request handed to a [`FloatApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRequest {
    pub bbox: BoundingBox,
    pub variable: Variable,
    pub depth: DepthRange,
    pub time: TimeRange,
}

impl LiveRequest {
    pub fn from_query(query: &Query, now: DateTime<Utc>) -> Self {
        let r = ResolvedQuery::resolve(query, now);
        let depth = if r.depth.is_point() {
            DepthRange::clamped(
                r.depth.min() - POINT_DEPTH_TOLERANCE_M,
                r.depth.max() + POINT_DEPTH_TOLERANCE_M,
            )
        } else {
            r.depth
        };
        Self {
            bbox: r.bbox,
            variable: r.variable,
            depth,
            time: r.time,
        }
    }
}

/// Remote float API seam; real client is [`ErddapClient`].
pub trait FloatApi: Send + Sync {
    fn fetch_live_observations<'a>(
        &'a self,
        request: &'a LiveRequest,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>>;
}

pub struct LiveProvider {
    api: Arc<dyn FloatApi>,
    timeout: Duration,
    enabled: bool,
}

impl LiveProvider {
    pub fn new(api: Arc<dyn FloatApi>, timeout: Duration) -> Self {
        Self {
            api,
            timeout,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[instrument(skip_all, fields(variable = query.variable_or_default().as_str()))]
    async fn fetch_inner(&self, query: &Query) -> Result<Vec<Observation>, ProviderFailure> {
        if !self.enabled {
            return Err(ProviderFailure::Disabled);
        }
        let request = LiveRequest::from_query(query, Utc::now());
        let observations = self.api.fetch_live_observations(&request).await?;
        debug!(count = observations.len(), "live observations received");
        Ok(observations)
    }
}

impl DataProvider for LiveProvider {
    fn source(&self) -> DataSource {
        DataSource::Live
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(self.fetch_inner(query))
    }
}
