use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scoring horizon. Signals are always current or trailing-window values;
/// the horizon only tells the provider which window to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// 0-2 years
    Short,
    /// 2-5 years
    Mid,
    /// 5-12 years
    Long,
}

impl Horizon {
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Short => "0-2y",
            Horizon::Mid => "2-5y",
            Horizon::Long => "5-12y",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Horizon::Short => "short",
            Horizon::Mid => "mid",
            Horizon::Long => "long",
        };
        write!(f, "{} ({})", name, self.label())
    }
}

/// Range and meaning of a signal's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scale {
    #[serde(rename = "raw")]
    Raw,
    #[default]
    #[serde(rename = "score_0_1")]
    Score01,
    #[serde(rename = "score_neg1_1")]
    ScoreNeg1To1,
    #[serde(rename = "percent")]
    Percent,
}

impl Scale {
    /// Native bounds of the scale, `None` for raw values.
    pub fn bounds(&self) -> Option<ScoreRange> {
        match self {
            Scale::Raw => None,
            Scale::Score01 => Some(ScoreRange::UNIT),
            Scale::ScoreNeg1To1 => Some(ScoreRange::new(-1.0, 1.0)),
            Scale::Percent => Some(ScoreRange::new(0.0, 100.0)),
        }
    }
}

/// Closed interval a normalized score must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub lo: f64,
    pub hi: f64,
}

impl ScoreRange {
    pub const UNIT: ScoreRange = ScoreRange { lo: 0.0, hi: 1.0 };

    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lo && value <= self.hi
    }

    /// Linearly map `value` from this range onto `target`.
    pub fn rescale_to(&self, value: f64, target: ScoreRange) -> f64 {
        let span = self.hi - self.lo;
        if span == 0.0 {
            return target.lo;
        }
        target.lo + (value - self.lo) / span * (target.hi - target.lo)
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A single provider-supplied metric value plus provenance.
///
/// Immutable once returned; confidence and freshness are advisory and
/// default to fully confident, fresh data when the provider omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub value: f64,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub freshness_days: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Signal {
    pub fn new(value: f64, scale: Scale) -> Self {
        Self {
            value,
            scale,
            confidence: default_confidence(),
            freshness_days: 0,
            details: BTreeMap::new(),
        }
    }

    pub fn score01(value: f64) -> Self {
        Self::new(value, Scale::Score01)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_freshness_days(mut self, days: u32) -> Self {
        self.freshness_days = days;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Format an optional as-of date the way the CLI and breakdowns show it.
pub fn format_as_of(as_of: Option<NaiveDate>) -> String {
    as_of
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "latest".to_string())
}
