pub mod metrics;
pub mod snapshot;

pub use metrics::{MetricInfo, METRICS};
pub use snapshot::{MetricEntry, Snapshot, SnapshotProvider};

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::regime::RegimeWeights;
use crate::signal::{Horizon, ScoreRange, Signal};

/// Free-form query context passed through to the provider untouched.
pub type QueryContext = BTreeMap<String, serde_json::Value>;

/// One metric lookup. Every lookup in a scoring call carries the same
/// `as_of`, so a provider can pin all of them to a single snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MetricQuery<'a> {
    /// Opaque namespaced id, e.g. `constraint.power_access_good`
    pub metric_id: &'a str,
    pub company: &'a str,
    pub horizon: Horizon,
    pub as_of: Option<NaiveDate>,
    pub context: Option<&'a QueryContext>,
}

/// Failure reported by a provider. Opaque to the engine: any variant is
/// converted into a per-metric fallback at the fetch boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown company '{0}'")]
    UnknownCompany(String),

    #[error("metric '{metric_id}' not available for '{company}'")]
    MissingMetric { metric_id: String, company: String },

    #[error("metric '{metric_id}' cannot be expressed in {range}: {reason}")]
    Unnormalizable {
        metric_id: String,
        range: ScoreRange,
        reason: String,
    },

    #[error("provider has no regime mixture recommendation")]
    NoRegimeMixture,

    #[error("provider backend failed: {0}")]
    Backend(String),
}

/// Data-retrieval capability consumed by the scoring engine.
///
/// Implementations normalize their own sources; the engine never interprets
/// metric ids, only checks the returned ranges. Must be shareable across
/// threads because factor groups may be computed in parallel.
pub trait DataProvider: Send + Sync {
    /// Raw value in whatever scale the provider natively has.
    fn get_value(&self, query: &MetricQuery<'_>) -> Result<Signal, ProviderError>;

    /// Value normalized into `range`.
    fn get_score(&self, query: &MetricQuery<'_>, range: ScoreRange) -> Result<Signal, ProviderError>;

    /// Recommended (current-state, not forecast) regime weights.
    fn get_regime_mixture(
        &self,
        _horizon: Horizon,
        _as_of: Option<NaiveDate>,
        _context: Option<&QueryContext>,
    ) -> Result<RegimeWeights, ProviderError> {
        Err(ProviderError::NoRegimeMixture)
    }
}

impl<P: DataProvider + ?Sized> DataProvider for std::sync::Arc<P> {
    fn get_value(&self, query: &MetricQuery<'_>) -> Result<Signal, ProviderError> {
        (**self).get_value(query)
    }

    fn get_score(&self, query: &MetricQuery<'_>, range: ScoreRange) -> Result<Signal, ProviderError> {
        (**self).get_score(query, range)
    }

    fn get_regime_mixture(
        &self,
        horizon: Horizon,
        as_of: Option<NaiveDate>,
        context: Option<&QueryContext>,
    ) -> Result<RegimeWeights, ProviderError> {
        (**self).get_regime_mixture(horizon, as_of, context)
    }
}
