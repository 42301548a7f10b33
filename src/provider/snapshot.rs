use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use super::{DataProvider, MetricQuery, ProviderError, QueryContext};
use crate::regime::RegimeWeights;
use crate::signal::{Horizon, Scale, ScoreRange, Signal};

/// A metric as written in a data file: either a bare 0..1 score or a full
/// signal object with scale and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricEntry {
    Bare(f64),
    Full(Signal),
}

impl MetricEntry {
    fn to_signal(&self) -> Signal {
        match self {
            MetricEntry::Bare(v) => Signal::score01(*v),
            MetricEntry::Full(s) => s.clone(),
        }
    }
}

/// Point-in-time dataset backing a [`SnapshotProvider`].
///
/// Example JSON:
/// ```json
/// {
///   "as_of": "2026-02-16",
///   "regime_mixture": { "power_constrained_boom": 0.35, "security_arms_race": 0.35 },
///   "companies": {
///     "Microsoft": {
///       "constraint.power_access_good": 0.8,
///       "trust.security_incident_bad": { "value": 0.3, "confidence": 0.6 }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    #[serde(default)]
    pub regime_mixture: Option<RegimeWeights>,

    #[serde(default)]
    pub companies: BTreeMap<String, BTreeMap<String, MetricEntry>>,
}

/// Provider answering every query from one immutable [`Snapshot`].
///
/// All lookups observe the same data, which makes it a natural fit for the
/// engine's single-`as_of` requirement and for tests.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(json).context("Failed to parse snapshot JSON")?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Load a snapshot from a JSON data file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open data file at {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse data file at {}", path.display()))?;

        info!(
            path = %path.display(),
            companies = snapshot.companies.len(),
            has_regime_mixture = snapshot.regime_mixture.is_some(),
            "loaded data snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.snapshot.as_of = Some(as_of);
        self
    }

    pub fn with_regime_mixture(mut self, weights: RegimeWeights) -> Self {
        self.snapshot.regime_mixture = Some(weights);
        self
    }

    /// Add a bare 0..1 score.
    pub fn with_score(self, company: &str, metric_id: &str, value: f64) -> Self {
        self.with_entry(company, metric_id, MetricEntry::Bare(value))
    }

    pub fn with_signal(self, company: &str, metric_id: &str, signal: Signal) -> Self {
        self.with_entry(company, metric_id, MetricEntry::Full(signal))
    }

    fn with_entry(mut self, company: &str, metric_id: &str, entry: MetricEntry) -> Self {
        self.snapshot
            .companies
            .entry(company.to_string())
            .or_default()
            .insert(metric_id.to_string(), entry);
        self
    }

    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.snapshot.companies.keys().map(String::as_str)
    }

    /// Company lookup: exact name first, then case-insensitive.
    fn company_metrics(&self, company: &str) -> Result<&BTreeMap<String, MetricEntry>, ProviderError> {
        if let Some(metrics) = self.snapshot.companies.get(company) {
            return Ok(metrics);
        }
        self.snapshot
            .companies
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(company))
            .map(|(_, metrics)| metrics)
            .ok_or_else(|| ProviderError::UnknownCompany(company.to_string()))
    }

    /// Days by which the requested date trails the snapshot date.
    fn staleness_days(&self, as_of: Option<NaiveDate>) -> Result<u32, ProviderError> {
        match (self.snapshot.as_of, as_of) {
            (Some(snap), Some(wanted)) if wanted < snap => Err(ProviderError::Backend(format!(
                "snapshot dated {} cannot answer a query as of {}",
                snap, wanted
            ))),
            (Some(snap), Some(wanted)) => Ok((wanted - snap).num_days().max(0) as u32),
            _ => Ok(0),
        }
    }
}

impl DataProvider for SnapshotProvider {
    fn get_value(&self, query: &MetricQuery<'_>) -> Result<Signal, ProviderError> {
        let metrics = self.company_metrics(query.company)?;
        let entry = metrics
            .get(query.metric_id)
            .ok_or_else(|| ProviderError::MissingMetric {
                metric_id: query.metric_id.to_string(),
                company: query.company.to_string(),
            })?;

        let mut signal = entry.to_signal();
        signal.freshness_days = signal
            .freshness_days
            .saturating_add(self.staleness_days(query.as_of)?);
        if let Some(snap) = self.snapshot.as_of {
            signal = signal.with_detail("snapshot_as_of", serde_json::json!(snap.to_string()));
        }
        Ok(signal)
    }

    fn get_score(&self, query: &MetricQuery<'_>, range: ScoreRange) -> Result<Signal, ProviderError> {
        let mut signal = self.get_value(query)?;
        let unnormalizable = |reason: String| ProviderError::Unnormalizable {
            metric_id: query.metric_id.to_string(),
            range,
            reason,
        };

        let value = match signal.scale.bounds() {
            Some(native) => {
                if !native.contains(signal.value) {
                    return Err(unnormalizable(format!(
                        "value {} outside its declared scale {}",
                        signal.value, native
                    )));
                }
                native.rescale_to(signal.value, range)
            }
            None => {
                if !range.contains(signal.value) {
                    return Err(unnormalizable(format!("raw value {} outside range", signal.value)));
                }
                signal.value
            }
        };

        signal.value = value;
        signal.scale = if range == ScoreRange::UNIT {
            Scale::Score01
        } else if range == ScoreRange::new(-1.0, 1.0) {
            Scale::ScoreNeg1To1
        } else {
            Scale::Raw
        };
        Ok(signal)
    }

    fn get_regime_mixture(
        &self,
        _horizon: Horizon,
        _as_of: Option<NaiveDate>,
        _context: Option<&QueryContext>,
    ) -> Result<RegimeWeights, ProviderError> {
        self.snapshot
            .regime_mixture
            .clone()
            .ok_or(ProviderError::NoRegimeMixture)
    }
}
