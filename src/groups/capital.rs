use super::{signed_blend, FactorOutput, RiskChannel, SignalReader, NEUTRAL};
use crate::provider::metrics::{
    CAPITAL_BALANCE_SHEET, CAPITAL_DISCIPLINE, CAPITAL_FREE_CASH_FLOW, CAPITAL_MNA_SKILL,
    CAPITAL_MOONSHOT,
};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::CapitalParams;

/// Cash generation and allocation discipline. Moonshot propensity is a
/// penalty here and an execution risk when discipline is weak.
pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &CapitalParams,
) -> FactorOutput {
    let fcf = reader.score(CAPITAL_FREE_CASH_FLOW);
    let balance_sheet = reader.score(CAPITAL_BALANCE_SHEET);
    let mna = reader.score(CAPITAL_MNA_SKILL);
    let discipline = reader.score(CAPITAL_DISCIPLINE);
    let moonshot = reader.score(CAPITAL_MOONSHOT);

    let additive = signed_blend(&[
        (0.30, fcf),
        (0.25, balance_sheet),
        (0.20, mna),
        (0.25, discipline),
    ]) - params.moonshot_penalty * moonshot.unwrap_or(0.0);

    let mna_multiplier = match (mna, balance_sheet) {
        (Some(m), Some(b)) => {
            let concentration = mixture.weight(Regime::CapitalConcentration);
            1.0 + params.mna_gain * concentration * m * b
        }
        _ => 1.0,
    };

    let execution = moonshot.map_or(0.0, |m| m * (1.0 - discipline.unwrap_or(NEUTRAL)));

    FactorOutput::new(additive)
        .with_multiplier("mna_multiplier", mna_multiplier)
        .with_risk(RiskChannel::Execution, execution)
}
