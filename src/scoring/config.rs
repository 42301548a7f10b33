use serde::{Deserialize, Serialize};

use crate::groups::FactorGroup;

/// Main rubric configuration.
///
/// Fixed, documented constants: nothing here is learned. Every field has a
/// default, so a YAML file only needs the values it overrides.
///
/// Example YAML:
/// ```yaml
/// rubric:
///   risk_weight: 0.35
///   risk_exponent: 1.2
///   confidence_floor: 0.3
///   weights:
///     constraint: 0.2
///     trust: 0.16
///   groups:
///     constraint:
///       power_threshold: 0.6
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RubricConfig {
    /// Additive weight per factor group; must sum to 1
    pub weights: GroupWeights,

    /// How strongly risk discounts the final score, in [0, 1]
    pub risk_weight: f64,

    /// Convexity of the risk discount (>= 1). Higher values leave low-risk
    /// scores nearly untouched and bite hard only near the top.
    pub risk_exponent: f64,

    /// Signals reported with lower confidence are treated as missing
    pub confidence_floor: f64,

    /// Signals older than this many days are treated as missing
    pub max_freshness_days: Option<u32>,

    /// Compute the factor groups on the rayon thread pool
    pub parallel: bool,

    /// Shape parameters of the individual factor groups
    pub groups: GroupParams,
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            weights: GroupWeights::default(),
            risk_weight: 0.35,
            risk_exponent: 1.2,
            confidence_floor: 0.3,
            max_freshness_days: None,
            parallel: false,
            groups: GroupParams::default(),
        }
    }
}

/// Additive weight of each factor group.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GroupWeights {
    pub macro_liquidity: f64,
    pub constraint: f64,
    pub trust: f64,
    pub control_points: f64,
    pub adaptation: f64,
    pub georeg: f64,
    pub capital_alloc: f64,
}

impl Default for GroupWeights {
    fn default() -> Self {
        Self {
            macro_liquidity: 0.12,
            constraint: 0.18,
            trust: 0.18,
            control_points: 0.18,
            adaptation: 0.14,
            georeg: 0.10,
            capital_alloc: 0.10,
        }
    }
}

impl GroupWeights {
    pub fn get(&self, group: FactorGroup) -> f64 {
        match group {
            FactorGroup::MacroLiquidity => self.macro_liquidity,
            FactorGroup::Constraint => self.constraint,
            FactorGroup::Trust => self.trust,
            FactorGroup::ControlPoints => self.control_points,
            FactorGroup::Adaptation => self.adaptation,
            FactorGroup::GeoRegulatory => self.georeg,
            FactorGroup::CapitalAllocation => self.capital_alloc,
        }
    }

    pub fn total(&self) -> f64 {
        FactorGroup::ALL.iter().map(|g| self.get(*g)).sum()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GroupParams {
    pub constraint: ConstraintParams,
    pub trust: TrustParams,
    pub control_points: ControlPointParams,
    pub adaptation: AdaptationParams,
    pub georeg: GeoRegParams,
    pub capital_alloc: CapitalParams,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintParams {
    pub power_threshold: f64,
    pub power_hardness: f64,
    pub compute_threshold: f64,
    pub compute_hardness: f64,
    pub power_saturation: f64,
    pub compute_saturation: f64,
    /// Extra gate exponent per unit of power-constrained regime weight
    pub power_regime_exponent: f64,
}

impl Default for ConstraintParams {
    fn default() -> Self {
        Self {
            power_threshold: 0.55,
            power_hardness: 37.5,
            compute_threshold: 0.50,
            compute_hardness: 30.0,
            power_saturation: 3.0,
            compute_saturation: 2.0,
            power_regime_exponent: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TrustParams {
    pub incident_rate: f64,
    pub adoption_steepness: f64,
    pub adoption_midpoint: f64,
    pub multiplier_gain: f64,
}

impl Default for TrustParams {
    fn default() -> Self {
        Self {
            incident_rate: 3.5,
            adoption_steepness: 6.0,
            adoption_midpoint: 0.5,
            multiplier_gain: 0.20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ControlPointParams {
    pub lock_saturation: f64,
    pub switching_saturation: f64,
    pub data_saturation: f64,
    pub network_saturation: f64,
    pub flywheel_gain: f64,
}

impl Default for ControlPointParams {
    fn default() -> Self {
        Self {
            lock_saturation: 4.0,
            switching_saturation: 3.0,
            data_saturation: 2.0,
            network_saturation: 3.0,
            flywheel_gain: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptationParams {
    pub multiplier_gain: f64,
}

impl Default for AdaptationParams {
    fn default() -> Self {
        Self { multiplier_gain: 0.20 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeoRegParams {
    pub readiness_threshold: f64,
    pub readiness_hardness: f64,
    /// Extra gate exponent per unit of regulatory-clampdown weight
    pub clampdown_exponent: f64,
    /// How much exposure can erode readiness in the additive score
    pub exposure_damping: f64,
    /// Decay rate of the export-control gate at full bifurcation weight
    pub bifurcation_rate: f64,
}

impl Default for GeoRegParams {
    fn default() -> Self {
        Self {
            readiness_threshold: 0.55,
            readiness_hardness: 30.0,
            clampdown_exponent: 2.0,
            exposure_damping: 0.7,
            bifurcation_rate: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CapitalParams {
    pub moonshot_penalty: f64,
    pub mna_gain: f64,
}

impl Default for CapitalParams {
    fn default() -> Self {
        Self {
            moonshot_penalty: 0.5,
            mna_gain: 0.25,
        }
    }
}
