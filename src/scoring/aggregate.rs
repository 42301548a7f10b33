use serde::Serialize;
use std::collections::BTreeMap;

use super::config::{GroupWeights, RubricConfig};
use super::transforms::clamp;
use crate::groups::{FactorGroup, FactorOutput, RiskChannel};

/// The three composite quantities built from the seven group outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub base_additive: f64,
    pub gate_multiplier: f64,
    pub multiplier_product: f64,
}

/// Per-channel risk after taking the maximum across groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRisk {
    pub channels: BTreeMap<RiskChannel, f64>,
    pub risk_index: f64,
}

/// Result of the final score step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalScore {
    pub risk_discount: f64,
    pub score: f64,
}

/// Weighted-sum the additives, multiply the gates, multiply the multipliers.
///
/// Gates and multipliers multiply across groups: one closed gate caps the
/// whole score and independent advantages compound. The multiplier product
/// is left unclamped; only the final score is bounded.
pub fn aggregate(outputs: &BTreeMap<FactorGroup, FactorOutput>, weights: &GroupWeights) -> Aggregate {
    let additive: f64 = outputs
        .iter()
        .map(|(group, out)| weights.get(*group) * out.additive)
        .sum();

    let gates: f64 = outputs.values().flat_map(|o| o.gates.values()).product();
    let multipliers: f64 = outputs.values().flat_map(|o| o.multipliers.values()).product();

    Aggregate {
        base_additive: clamp(additive, -1.0, 1.0),
        gate_multiplier: clamp(gates, 0.0, 1.0),
        multiplier_product: multipliers,
    }
}

/// Probabilistic union over channels: `1 - prod(1 - v)`, with each channel
/// taken as its worst value across groups.
pub fn combine_risk(outputs: &BTreeMap<FactorGroup, FactorOutput>) -> CombinedRisk {
    let mut channels: BTreeMap<RiskChannel, f64> = BTreeMap::new();
    for (channel, value) in outputs.values().flat_map(|o| o.risk.iter()) {
        let worst = channels.entry(*channel).or_insert(0.0);
        *worst = worst.max(*value);
    }

    let survival: f64 = channels.values().map(|v| 1.0 - clamp(*v, 0.0, 1.0)).product();
    CombinedRisk {
        channels,
        risk_index: clamp(1.0 - survival, 0.0, 1.0),
    }
}

pub fn final_score(agg: &Aggregate, risk_index: f64, config: &RubricConfig) -> FinalScore {
    let risk_discount = clamp(
        1.0 - config.risk_weight * risk_index.powf(config.risk_exponent),
        0.0,
        1.0,
    );
    let raw = agg.base_additive * agg.gate_multiplier * agg.multiplier_product * risk_discount;
    let score = clamp(100.0 * raw, -100.0, 100.0);
    FinalScore {
        risk_discount,
        // a closed gate on a negative base gives -0.0
        score: if score == 0.0 { 0.0 } else { score },
    }
}
