use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

use super::ScoreRequest;
use crate::provider::{DataProvider, MetricQuery, ProviderError};
use crate::scoring::RubricConfig;
use crate::signal::{ScoreRange, Signal};

/// Debug key under which degraded metrics are listed.
pub const FALLBACKS_KEY: &str = "fallbacks";

/// Why a metric could not be used. Never escapes a factor group: the metric
/// falls back to its neutral default and the reason lands in `debug`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalUnavailable {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("value {value} outside requested range {range}")]
    OutOfRange { value: f64, range: ScoreRange },

    #[error("confidence {confidence} below floor {floor}")]
    LowConfidence { confidence: f64, floor: f64 },

    #[error("signal is {age} days old, limit is {limit}")]
    Stale { age: u32, limit: u32 },
}

/// Per-group metric fetcher.
///
/// Pins every lookup to the request's company, horizon and `as_of`, applies
/// the confidence and freshness filters, and records what it saw.
pub struct SignalReader<'a> {
    provider: &'a dyn DataProvider,
    request: &'a ScoreRequest<'a>,
    confidence_floor: f64,
    max_freshness_days: Option<u32>,
    debug: BTreeMap<String, Value>,
    fallbacks: BTreeMap<String, String>,
}

impl<'a> SignalReader<'a> {
    pub fn new(
        provider: &'a dyn DataProvider,
        request: &'a ScoreRequest<'a>,
        config: &RubricConfig,
    ) -> Self {
        Self {
            provider,
            request,
            confidence_floor: config.confidence_floor,
            max_freshness_days: config.max_freshness_days,
            debug: BTreeMap::new(),
            fallbacks: BTreeMap::new(),
        }
    }

    /// Fetch a 0..1 score, or `None` if it is unavailable for any reason.
    pub fn score(&mut self, metric_id: &str) -> Option<f64> {
        match self.fetch(metric_id) {
            Ok(signal) => {
                self.debug.insert(metric_id.to_string(), json!(signal.value));
                Some(signal.value)
            }
            Err(reason) => {
                warn!(
                    company = self.request.company,
                    metric = metric_id,
                    %reason,
                    "metric unavailable, using neutral default"
                );
                self.fallbacks.insert(metric_id.to_string(), reason.to_string());
                None
            }
        }
    }

    fn fetch(&self, metric_id: &str) -> Result<Signal, SignalUnavailable> {
        let query = MetricQuery {
            metric_id,
            company: self.request.company,
            horizon: self.request.horizon,
            as_of: self.request.as_of,
            context: None,
        };
        let signal = self.provider.get_score(&query, ScoreRange::UNIT)?;

        if !ScoreRange::UNIT.contains(signal.value) {
            return Err(SignalUnavailable::OutOfRange {
                value: signal.value,
                range: ScoreRange::UNIT,
            });
        }
        // NaN confidence fails this check as well
        if !(signal.confidence >= self.confidence_floor) {
            return Err(SignalUnavailable::LowConfidence {
                confidence: signal.confidence,
                floor: self.confidence_floor,
            });
        }
        if let Some(limit) = self.max_freshness_days {
            if signal.freshness_days > limit {
                return Err(SignalUnavailable::Stale {
                    age: signal.freshness_days,
                    limit,
                });
            }
        }
        Ok(signal)
    }

    /// Record a derived value next to the raw metrics.
    pub fn note(&mut self, key: &str, value: impl Into<Value>) {
        self.debug.insert(key.to_string(), value.into());
    }

    pub fn finish(mut self) -> BTreeMap<String, Value> {
        if !self.fallbacks.is_empty() {
            self.debug.insert(FALLBACKS_KEY.to_string(), json!(self.fallbacks));
        }
        self.debug
    }
}
