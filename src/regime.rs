use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ScoringError, ValidationError};
use crate::provider::DataProvider;
use crate::signal::Horizon;

/// Named macro condition. Closed set: adding one is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    PowerConstrainedBoom,
    PowerConstrainedStagflation,
    TrustCollapse,
    RegulatoryClampdown,
    HyperCompetition,
    CapitalConcentration,
    GeopoliticalBifurcation,
    SecurityArmsRace,
}

impl Regime {
    pub const ALL: [Regime; 8] = [
        Regime::PowerConstrainedBoom,
        Regime::PowerConstrainedStagflation,
        Regime::TrustCollapse,
        Regime::RegulatoryClampdown,
        Regime::HyperCompetition,
        Regime::CapitalConcentration,
        Regime::GeopoliticalBifurcation,
        Regime::SecurityArmsRace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Regime::PowerConstrainedBoom => "power_constrained_boom",
            Regime::PowerConstrainedStagflation => "power_constrained_stagflation",
            Regime::TrustCollapse => "trust_collapse",
            Regime::RegulatoryClampdown => "regulatory_clampdown",
            Regime::HyperCompetition => "hyper_competition",
            Regime::CapitalConcentration => "capital_concentration",
            Regime::GeopoliticalBifurcation => "geopolitical_bifurcation",
            Regime::SecurityArmsRace => "security_arms_race",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Regime {
    type Err = ValidationError;

    /// Accepts the snake_case name in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Regime::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| ValidationError::UnknownRegime(s.trim().to_string()))
    }
}

/// Raw, unvalidated regime weights as supplied by a caller or provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegimeWeights(BTreeMap<Regime, f64>);

impl RegimeWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, regime: Regime, weight: f64) -> Self {
        self.0.insert(regime, weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Regime, f64)> + '_ {
        self.0.iter().map(|(r, w)| (*r, *w))
    }

    /// Parse a `name=weight` pair as given on the command line.
    pub fn parse_pair(s: &str) -> Result<(Regime, f64), ValidationError> {
        let (name, weight) = s
            .split_once('=')
            .ok_or_else(|| ValidationError::UnknownRegime(s.to_string()))?;
        let regime: Regime = name.parse()?;
        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| ValidationError::NonFiniteWeight { regime })?;
        Ok((regime, weight))
    }
}

impl FromIterator<(Regime, f64)> for RegimeWeights {
    fn from_iter<I: IntoIterator<Item = (Regime, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalized regime weights: non-negative and summing to 1.
///
/// Only obtainable through [`RegimeMixture::normalize`], so every value of
/// this type upholds the invariant. Regimes without an entry weigh 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegimeMixture {
    weights: BTreeMap<Regime, f64>,
}

impl RegimeMixture {
    pub fn normalize(raw: &RegimeWeights) -> Result<Self, ValidationError> {
        let mut largest: f64 = 0.0;
        for (regime, weight) in raw.iter() {
            if !weight.is_finite() {
                return Err(ValidationError::NonFiniteWeight { regime });
            }
            if weight < 0.0 {
                return Err(ValidationError::NegativeWeight { regime, weight });
            }
            largest = largest.max(weight);
        }
        if largest <= 0.0 {
            return Err(ValidationError::ZeroTotalWeight);
        }

        // Scale by the largest weight first so the sum cannot overflow.
        let total: f64 = raw.iter().map(|(_, w)| w / largest).sum();
        Ok(Self {
            weights: raw.iter().map(|(r, w)| (r, w / largest / total)).collect(),
        })
    }

    pub fn weight(&self, regime: Regime) -> f64 {
        self.weights.get(&regime).copied().unwrap_or(0.0)
    }

    /// Combined weight of several regimes, capped at 1.
    pub fn combined(&self, regimes: &[Regime]) -> f64 {
        regimes.iter().map(|r| self.weight(*r)).sum::<f64>().min(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Regime, f64)> + '_ {
        self.weights.iter().map(|(r, w)| (*r, *w))
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Resolve the mixture for one scoring call.
///
/// Caller-supplied weights win; otherwise the provider's recommendation is
/// used. Both go through the same validation and normalization.
pub fn resolve_mixture(
    supplied: Option<&RegimeWeights>,
    provider: &dyn DataProvider,
    horizon: Horizon,
    as_of: Option<NaiveDate>,
) -> Result<RegimeMixture, ScoringError> {
    let mixture = match supplied {
        Some(weights) => RegimeMixture::normalize(weights)?,
        None => {
            let recommended = provider
                .get_regime_mixture(horizon, as_of, None)
                .map_err(ScoringError::MixtureUnavailable)?;
            RegimeMixture::normalize(&recommended)?
        }
    };
    let source = if supplied.is_some() { "caller" } else { "provider" };
    debug!(source, regimes = mixture.weights.len(), "resolved regime mixture");
    Ok(mixture)
}
