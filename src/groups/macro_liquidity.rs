use super::{FactorOutput, RiskChannel, SignalReader, NEUTRAL};
use crate::provider::metrics::{MACRO_COMPANY_SENSITIVITY, MACRO_TIGHTNESS_INDEX};
use crate::scoring::transforms::to_signed;

/// Defensive companies earn more when liquidity is tight. Macro fragility
/// under tight conditions is a tail risk, not an additive penalty.
pub(super) fn compute(reader: &mut SignalReader<'_>) -> FactorOutput {
    let sensitivity = reader.score(MACRO_COMPANY_SENSITIVITY);
    let tightness = reader.score(MACRO_TIGHTNESS_INDEX);

    let additive = match sensitivity {
        Some(s) => {
            let defensive = 1.0 - s;
            let tight = tightness.unwrap_or(NEUTRAL);
            to_signed(0.5 * defensive + 0.5 * defensive * tight)
        }
        None => 0.0,
    };

    let tail = match (sensitivity, tightness) {
        (Some(s), Some(t)) => s * t,
        _ => 0.0,
    };

    FactorOutput::new(additive).with_risk(RiskChannel::MacroTail, tail)
}
