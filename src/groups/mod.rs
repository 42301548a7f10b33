pub mod reader;

mod adaptation;
mod capital;
mod constraint;
mod control_points;
mod georeg;
mod macro_liquidity;
mod trust;

pub use reader::{SignalReader, SignalUnavailable};

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::provider::DataProvider;
use crate::regime::RegimeMixture;
use crate::scoring::transforms::{clamp, to_signed};
use crate::scoring::RubricConfig;
use crate::signal::Horizon;

/// Upper bound of any single group multiplier.
pub const MAX_MULTIPLIER: f64 = 1.25;

/// Goodness assumed for a missing input in non-separable formulas.
pub(crate) const NEUTRAL: f64 = 0.5;

/// Who is being scored, over which horizon, and against which snapshot date.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    pub company: &'a str,
    pub horizon: Horizon,
    pub as_of: Option<NaiveDate>,
}

/// The seven factor groups, in aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FactorGroup {
    #[serde(rename = "macro")]
    MacroLiquidity,
    #[serde(rename = "constraint")]
    Constraint,
    #[serde(rename = "trust")]
    Trust,
    #[serde(rename = "control_points")]
    ControlPoints,
    #[serde(rename = "adaptation")]
    Adaptation,
    #[serde(rename = "georeg")]
    GeoRegulatory,
    #[serde(rename = "capital_alloc")]
    CapitalAllocation,
}

impl FactorGroup {
    pub const ALL: [FactorGroup; 7] = [
        FactorGroup::MacroLiquidity,
        FactorGroup::Constraint,
        FactorGroup::Trust,
        FactorGroup::ControlPoints,
        FactorGroup::Adaptation,
        FactorGroup::GeoRegulatory,
        FactorGroup::CapitalAllocation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FactorGroup::MacroLiquidity => "macro",
            FactorGroup::Constraint => "constraint",
            FactorGroup::Trust => "trust",
            FactorGroup::ControlPoints => "control_points",
            FactorGroup::Adaptation => "adaptation",
            FactorGroup::GeoRegulatory => "georeg",
            FactorGroup::CapitalAllocation => "capital_alloc",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FactorGroup::MacroLiquidity => "Macro & liquidity",
            FactorGroup::Constraint => "Power & compute constraint",
            FactorGroup::Trust => "Trust & legitimacy",
            FactorGroup::ControlPoints => "Control-point concentration",
            FactorGroup::Adaptation => "Adaptation speed",
            FactorGroup::GeoRegulatory => "Geopolitical & regulatory",
            FactorGroup::CapitalAllocation => "Capital allocation",
        }
    }
}

impl fmt::Display for FactorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tail-risk type. Values from different groups on the same channel are
/// combined by maximum, never averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskChannel {
    MacroTail,
    PowerConstraint,
    SecurityIncident,
    Regulatory,
    Geopolitical,
    Execution,
}

impl RiskChannel {
    pub fn name(&self) -> &'static str {
        match self {
            RiskChannel::MacroTail => "macro_tail",
            RiskChannel::PowerConstraint => "power_constraint",
            RiskChannel::SecurityIncident => "security_incident",
            RiskChannel::Regulatory => "regulatory",
            RiskChannel::Geopolitical => "geopolitical",
            RiskChannel::Execution => "execution",
        }
    }
}

impl fmt::Display for RiskChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one factor group for one scoring call.
///
/// The builder methods clamp every value into its documented range, so an
/// output is always in bounds no matter how a group computed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorOutput {
    /// In [-1, 1]
    pub additive: f64,
    /// Each in [0, 1]
    pub gates: BTreeMap<String, f64>,
    /// Each in [0, MAX_MULTIPLIER]
    pub multipliers: BTreeMap<String, f64>,
    /// Each in [0, 1]
    pub risk: BTreeMap<RiskChannel, f64>,
    pub debug: BTreeMap<String, serde_json::Value>,
}

impl FactorOutput {
    pub fn new(additive: f64) -> Self {
        Self {
            additive: clamp(additive, -1.0, 1.0),
            gates: BTreeMap::new(),
            multipliers: BTreeMap::new(),
            risk: BTreeMap::new(),
            debug: BTreeMap::new(),
        }
    }

    pub fn with_gate(mut self, name: &str, value: f64) -> Self {
        self.gates.insert(name.to_string(), clamp(value, 0.0, 1.0));
        self
    }

    pub fn with_multiplier(mut self, name: &str, value: f64) -> Self {
        self.multipliers
            .insert(name.to_string(), clamp(value, 0.0, MAX_MULTIPLIER));
        self
    }

    pub fn with_risk(mut self, channel: RiskChannel, value: f64) -> Self {
        self.risk.insert(channel, clamp(value, 0.0, 1.0));
        self
    }

    /// Metric ids that fell back to their neutral default, with the reason.
    pub fn fallbacks(&self) -> BTreeMap<&str, &str> {
        self.debug
            .get(reader::FALLBACKS_KEY)
            .and_then(|v| v.as_object())
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.as_str(), v.as_str().unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_degraded(&self) -> bool {
        self.debug.contains_key(reader::FALLBACKS_KEY)
    }
}

/// Shared contract of the factor group calculators.
pub trait FactorGroupCalculator {
    fn group(&self) -> FactorGroup;

    fn compute(
        &self,
        request: &ScoreRequest<'_>,
        mixture: &RegimeMixture,
        provider: &dyn DataProvider,
        config: &RubricConfig,
    ) -> FactorOutput;
}

impl FactorGroupCalculator for FactorGroup {
    fn group(&self) -> FactorGroup {
        *self
    }

    fn compute(
        &self,
        request: &ScoreRequest<'_>,
        mixture: &RegimeMixture,
        provider: &dyn DataProvider,
        config: &RubricConfig,
    ) -> FactorOutput {
        let mut reader = SignalReader::new(provider, request, config);
        let params = &config.groups;

        let mut output = match self {
            FactorGroup::MacroLiquidity => macro_liquidity::compute(&mut reader),
            FactorGroup::Constraint => constraint::compute(&mut reader, mixture, &params.constraint),
            FactorGroup::Trust => trust::compute(&mut reader, mixture, &params.trust),
            FactorGroup::ControlPoints => {
                control_points::compute(&mut reader, mixture, &params.control_points)
            }
            FactorGroup::Adaptation => adaptation::compute(&mut reader, mixture, &params.adaptation),
            FactorGroup::GeoRegulatory => georeg::compute(&mut reader, mixture, &params.georeg),
            FactorGroup::CapitalAllocation => {
                capital::compute(&mut reader, mixture, &params.capital_alloc)
            }
        };
        output.debug = reader.finish();

        debug!(
            company = request.company,
            group = self.name(),
            additive = output.additive,
            gates = output.gates.len(),
            multipliers = output.multipliers.len(),
            degraded = output.is_degraded(),
            "factor group computed"
        );
        output
    }
}

/// Weighted sum in signed space. A missing term contributes exactly 0.
pub(crate) fn signed_blend(terms: &[(f64, Option<f64>)]) -> f64 {
    terms
        .iter()
        .filter_map(|(weight, goodness)| goodness.map(|g| weight * to_signed(g)))
        .sum()
}

/// Weighted mean over the terms that are present, `None` if none are.
pub(crate) fn present_mean(terms: &[(f64, Option<f64>)]) -> Option<f64> {
    let (sum, weight) = terms
        .iter()
        .filter_map(|(w, v)| v.map(|v| (w * v, *w)))
        .fold((0.0, 0.0), |(s, tw), (wv, w)| (s + wv, tw + w));
    if weight > 0.0 {
        Some(sum / weight)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_output_builder_clamps() {
        let out = FactorOutput::new(3.0)
            .with_gate("g", 1.7)
            .with_multiplier("m", 9.0)
            .with_risk(RiskChannel::Execution, -0.2);
        assert_eq!(out.additive, 1.0);
        assert_eq!(out.gates["g"], 1.0);
        assert_eq!(out.multipliers["m"], MAX_MULTIPLIER);
        assert_eq!(out.risk[&RiskChannel::Execution], 0.0);
    }

    #[test]
    fn test_signed_blend_skips_missing() {
        let v = signed_blend(&[(0.5, Some(1.0)), (0.5, None)]);
        assert_eq!(v, 0.5);
        assert_eq!(signed_blend(&[(0.5, None), (0.5, None)]), 0.0);
    }

    #[test]
    fn test_present_mean() {
        assert_eq!(present_mean(&[(0.55, Some(0.2)), (0.45, None)]), Some(0.2));
        assert_eq!(present_mean(&[(0.55, None), (0.45, None)]), None);
        let m = present_mean(&[(0.5, Some(0.2)), (0.5, Some(0.6))]).unwrap();
        assert!((m - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_every_group_bounded_with_extreme_inputs() {
        use crate::provider::METRICS;
        let mix = even_mixture();
        for fill in [0.0, 1.0] {
            let metrics: Vec<(&str, f64)> = METRICS.iter().map(|m| (m.id, fill)).collect();
            for group in FactorGroup::ALL {
                let out = run(group, &metrics, &mix);
                assert!((-1.0..=1.0).contains(&out.additive), "{} additive", group);
                assert!(out.gates.values().all(|g| (0.0..=1.0).contains(g)));
                assert!(out.multipliers.values().all(|m| (0.0..=MAX_MULTIPLIER).contains(m)));
                assert!(out.risk.values().all(|r| (0.0..=1.0).contains(r)));
                assert!(!out.is_degraded(), "{} degraded", group);
            }
        }
    }

    #[test]
    fn test_every_group_neutral_when_all_missing() {
        let mix = even_mixture();
        for group in FactorGroup::ALL {
            let out = run(group, &[], &mix);
            assert_eq!(out.additive, 0.0, "{} additive", group);
            assert!(out.gates.values().all(|g| *g == 1.0), "{} gates", group);
            assert!(out.multipliers.values().all(|m| *m == 1.0), "{} multipliers", group);
            assert!(out.risk.values().all(|r| *r == 0.0), "{} risk", group);
            assert!(out.is_degraded());
            assert!(!out.fallbacks().is_empty());
        }
    }

    #[test]
    fn test_group_names_serialize() {
        let json = serde_json::to_string(&FactorGroup::MacroLiquidity).unwrap();
        assert_eq!(json, "\"macro\"");
        let json = serde_json::to_string(&RiskChannel::SecurityIncident).unwrap();
        assert_eq!(json, "\"security_incident\"");
    }
}
