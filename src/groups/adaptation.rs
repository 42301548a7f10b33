use super::{signed_blend, FactorOutput, RiskChannel, SignalReader};
use crate::provider::metrics::{
    ORG_INTERNAL_AGENT_ADOPTION, ORG_RESTRUCTURE_VELOCITY, ORG_SHIP_VELOCITY, ORG_TALENT_DENSITY,
};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::AdaptationParams;

const FAST_REGIMES: [Regime; 2] = [Regime::HyperCompetition, Regime::SecurityArmsRace];

/// How fast the organization ships, absorbs talent and reorganizes itself.
/// Speed pays off most when competition or security pressure is high.
pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &AdaptationParams,
) -> FactorOutput {
    let ship = reader.score(ORG_SHIP_VELOCITY);
    let talent = reader.score(ORG_TALENT_DENSITY);
    let agents = reader.score(ORG_INTERNAL_AGENT_ADOPTION);
    let restructure = reader.score(ORG_RESTRUCTURE_VELOCITY);

    let additive = signed_blend(&[
        (0.30, ship),
        (0.30, talent),
        (0.20, agents),
        (0.20, restructure),
    ]);

    let regime = mixture.combined(&FAST_REGIMES);
    let multiplier = 1.0 + params.multiplier_gain * regime * additive.max(0.0);

    let execution = 0.6 * ship.map_or(0.0, |v| 1.0 - v) + 0.4 * restructure.map_or(0.0, |v| 1.0 - v);

    FactorOutput::new(additive)
        .with_multiplier("adaptation_multiplier", multiplier)
        .with_risk(RiskChannel::Execution, execution)
}
