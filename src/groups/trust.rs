use super::{FactorOutput, RiskChannel, SignalReader, NEUTRAL};
use crate::provider::metrics::{
    TRUST_AUDITABILITY, TRUST_PROVENANCE_SUPPORT, TRUST_SECURITY_INCIDENT, TRUST_SECURITY_MATURITY,
};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::TrustParams;
use crate::scoring::transforms::{excess, exponential_downside, sigmoid, to_signed};

const TRUST_REGIMES: [Regime; 2] = [Regime::TrustCollapse, Regime::SecurityArmsRace];

/// Trust behaves like an adoption curve: little credit until quality
/// crosses the midpoint, then fast. Incidents throttle everything.
pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &TrustParams,
) -> FactorOutput {
    let maturity = reader.score(TRUST_SECURITY_MATURITY);
    let audit = reader.score(TRUST_AUDITABILITY);
    let provenance = reader.score(TRUST_PROVENANCE_SUPPORT);
    let incident = reader.score(TRUST_SECURITY_INCIDENT);

    let any_quality = maturity.is_some() || audit.is_some() || provenance.is_some();
    let quality = 0.45 * maturity.unwrap_or(NEUTRAL)
        + 0.35 * audit.unwrap_or(NEUTRAL)
        + 0.20 * provenance.unwrap_or(NEUTRAL);
    reader.note("trust_quality", quality);

    let additive = if any_quality {
        to_signed(sigmoid(
            quality,
            params.adoption_steepness,
            params.adoption_midpoint,
        ))
    } else {
        0.0
    };

    let trust_gate = incident.map_or(1.0, |i| exponential_downside(i, params.incident_rate));

    let regime = mixture.combined(&TRUST_REGIMES);
    let multiplier = if any_quality {
        1.0 + params.multiplier_gain * regime * excess(quality) * (1.0 - incident.unwrap_or(0.0))
    } else {
        1.0
    };

    let incident_risk = incident.map_or(0.0, |i| i * (1.0 - maturity.unwrap_or(NEUTRAL)));

    FactorOutput::new(additive)
        .with_gate("trust_gate", trust_gate)
        .with_multiplier("trust_multiplier", multiplier)
        .with_risk(RiskChannel::SecurityIncident, incident_risk)
}
