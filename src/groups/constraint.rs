use super::{signed_blend, FactorOutput, RiskChannel, SignalReader};
use crate::provider::metrics::{CONSTRAINT_COMPUTE_ACCESS, CONSTRAINT_POWER_ACCESS};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::ConstraintParams;
use crate::scoring::transforms::{gate, log_saturation};

const POWER_REGIMES: [Regime; 2] = [
    Regime::PowerConstrainedBoom,
    Regime::PowerConstrainedStagflation,
];

/// Power and compute access are feasibility constraints: below threshold
/// they gate the whole score, above it they add with diminishing returns.
/// The power gate tightens as power-constrained regimes gain weight.
pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &ConstraintParams,
) -> FactorOutput {
    let power = reader.score(CONSTRAINT_POWER_ACCESS);
    let compute = reader.score(CONSTRAINT_COMPUTE_ACCESS);

    let additive = signed_blend(&[
        (0.55, power.map(|p| log_saturation(p, params.power_saturation))),
        (0.45, compute.map(|c| log_saturation(c, params.compute_saturation))),
    ]);

    let power_regime = mixture.combined(&POWER_REGIMES);
    let power_exponent = 1.0 + params.power_regime_exponent * power_regime;
    reader.note("power_gate_exponent", power_exponent);

    let power_gate = power.map_or(1.0, |p| {
        gate(p, params.power_threshold, params.power_hardness).powf(power_exponent)
    });
    let compute_gate = compute.map_or(1.0, |c| {
        gate(c, params.compute_threshold, params.compute_hardness)
    });

    let shortfall = 0.6 * power.map_or(0.0, |p| 1.0 - p) + 0.4 * compute.map_or(0.0, |c| 1.0 - c);

    FactorOutput::new(additive)
        .with_gate("power_gate", power_gate)
        .with_gate("compute_gate", compute_gate)
        .with_risk(RiskChannel::PowerConstraint, shortfall)
}
