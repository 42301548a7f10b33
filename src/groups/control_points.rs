use super::{signed_blend, FactorOutput, SignalReader};
use crate::provider::metrics::{
    PLATFORM_DATA_ADVANTAGE, PLATFORM_DISTRIBUTION_LOCK, PLATFORM_NETWORK_EFFECTS,
    PLATFORM_SWITCHING_COST,
};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::ControlPointParams;
use crate::scoring::transforms::log_saturation;

const CONCENTRATION_REGIMES: [Regime; 2] = [Regime::HyperCompetition, Regime::CapitalConcentration];

/// Ownership of distribution, switching costs, data and network effects.
/// Each saturates; lock-in combined with switching cost compounds when the
/// market is concentrating.
pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &ControlPointParams,
) -> FactorOutput {
    let lock = reader.score(PLATFORM_DISTRIBUTION_LOCK);
    let switching = reader.score(PLATFORM_SWITCHING_COST);
    let data = reader.score(PLATFORM_DATA_ADVANTAGE);
    let network = reader.score(PLATFORM_NETWORK_EFFECTS);

    let additive = signed_blend(&[
        (0.35, lock.map(|v| log_saturation(v, params.lock_saturation))),
        (0.25, switching.map(|v| log_saturation(v, params.switching_saturation))),
        (0.20, data.map(|v| log_saturation(v, params.data_saturation))),
        (0.20, network.map(|v| log_saturation(v, params.network_saturation))),
    ]);

    let flywheel = match (lock, switching) {
        (Some(l), Some(s)) => {
            let regime = mixture.combined(&CONCENTRATION_REGIMES);
            reader.note("flywheel_strength", l * s);
            1.0 + params.flywheel_gain * regime * l * s
        }
        _ => 1.0,
    };

    FactorOutput::new(additive).with_multiplier("control_flywheel", flywheel)
}
