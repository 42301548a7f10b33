use super::{present_mean, FactorOutput, RiskChannel, SignalReader, NEUTRAL};
use crate::provider::metrics::{
    GEO_EXPORT_CONTROL_EXPOSURE, GEO_SANCTIONS_EXPOSURE, REG_ANTITRUST_RISK,
    REG_COMPLIANCE_READINESS, REG_LIABILITY_READINESS,
};
use crate::regime::{Regime, RegimeMixture};
use crate::scoring::config::GeoRegParams;
use crate::scoring::transforms::{exponential_downside, gate, to_signed};

pub(super) fn compute(
    reader: &mut SignalReader<'_>,
    mixture: &RegimeMixture,
    params: &GeoRegParams,
) -> FactorOutput {
    let compliance = reader.score(REG_COMPLIANCE_READINESS);
    let liability = reader.score(REG_LIABILITY_READINESS);
    let export = reader.score(GEO_EXPORT_CONTROL_EXPOSURE);
    let sanctions = reader.score(GEO_SANCTIONS_EXPOSURE);
    let antitrust = reader.score(REG_ANTITRUST_RISK);

    let readiness = present_mean(&[(0.55, compliance), (0.45, liability)]);
    let exposure = 0.45 * export.unwrap_or(0.0)
        + 0.25 * sanctions.unwrap_or(0.0)
        + 0.30 * antitrust.unwrap_or(0.0);
    reader.note("exposure", exposure);

    let any_input = readiness.is_some() || export.is_some() || sanctions.is_some() || antitrust.is_some();
    let additive = if any_input {
        to_signed(readiness.unwrap_or(NEUTRAL) * (1.0 - params.exposure_damping * exposure))
    } else {
        0.0
    };

    let clampdown = mixture.weight(Regime::RegulatoryClampdown);
    let regulatory_gate = match readiness {
        Some(r) => {
            let exponent = 1.0 + params.clampdown_exponent * clampdown;
            reader.note("readiness", r);
            gate(r, params.readiness_threshold, params.readiness_hardness).powf(exponent)
        }
        None => 1.0,
    };

    let bifurcation = mixture.weight(Regime::GeopoliticalBifurcation);
    let bifurcation_gate = export.map_or(1.0, |e| {
        exponential_downside(e, params.bifurcation_rate * bifurcation)
    });

    let regulatory = readiness.map_or(0.0, |r| 0.6 * (1.0 - r)) + 0.4 * antitrust.unwrap_or(0.0);
    let geopolitical = 0.7 * export.unwrap_or(0.0) + 0.3 * sanctions.unwrap_or(0.0);

    FactorOutput::new(additive)
        .with_gate("regulatory_gate", regulatory_gate)
        .with_gate("bifurcation_gate", bifurcation_gate)
        .with_risk(RiskChannel::Regulatory, regulatory)
        .with_risk(RiskChannel::Geopolitical, geopolitical)
}

#[cfg(test)]
mod tests {
    use crate::groups::test_support::*;
    use crate::groups::{FactorGroup, RiskChannel};
    use crate::provider::metrics::*;
    use crate::regime::Regime;
    use crate::scoring::transforms::to_signed;

    #[test]
    fn test_ready_and_unexposed() {
        let out = run(
            FactorGroup::GeoRegulatory,
            &[
                (REG_COMPLIANCE_READINESS, 1.0),
                (REG_LIABILITY_READINESS, 1.0),
                (GEO_EXPORT_CONTROL_EXPOSURE, 0.0),
                (GEO_SANCTIONS_EXPOSURE, 0.0),
                (REG_ANTITRUST_RISK, 0.0),
            ],
            &mixture(&[(Regime::RegulatoryClampdown, 1.0)]),
        );
        assert_eq!(out.additive, 1.0);
        assert_eq!(out.gates["regulatory_gate"], 1.0);
        assert_eq!(out.gates["bifurcation_gate"], 1.0);
        assert_eq!(out.risk[&RiskChannel::Regulatory], 0.0);
        assert_eq!(out.risk[&RiskChannel::Geopolitical], 0.0);
    }

    #[test]
    fn test_clampdown_tightens_regulatory_gate() {
        let metrics = [(REG_COMPLIANCE_READINESS, 0.6), (REG_LIABILITY_READINESS, 0.6)];
        let calm = run(
            FactorGroup::GeoRegulatory,
            &metrics,
            &mixture(&[(Regime::HyperCompetition, 1.0)]),
        );
        let clampdown = run(
            FactorGroup::GeoRegulatory,
            &metrics,
            &mixture(&[(Regime::RegulatoryClampdown, 1.0)]),
        );
        let g = calm.gates["regulatory_gate"];
        assert!((clampdown.gates["regulatory_gate"] - g.powi(3)).abs() < 1e-12);
        assert_eq!(calm.additive, clampdown.additive);
    }

    #[test]
    fn test_unready_company_gated_out() {
        let out = run(
            FactorGroup::GeoRegulatory,
            &[(REG_COMPLIANCE_READINESS, 0.0), (REG_LIABILITY_READINESS, 0.0)],
            &even_mixture(),
        );
        assert_eq!(out.gates["regulatory_gate"], 0.0);
        assert_eq!(out.additive, -1.0);
        assert!((out.risk[&RiskChannel::Regulatory] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_exposure_hurts_only_under_bifurcation_for_gate() {
        let metrics = [(GEO_EXPORT_CONTROL_EXPOSURE, 1.0), (GEO_SANCTIONS_EXPOSURE, 1.0)];
        let split = run(
            FactorGroup::GeoRegulatory,
            &metrics,
            &mixture(&[(Regime::GeopoliticalBifurcation, 1.0)]),
        );
        let calm = run(
            FactorGroup::GeoRegulatory,
            &metrics,
            &mixture(&[(Regime::TrustCollapse, 1.0)]),
        );
        assert!((split.gates["bifurcation_gate"] - (-2.0f64).exp()).abs() < 1e-12);
        assert_eq!(calm.gates["bifurcation_gate"], 1.0);
        // No readiness data: gate stays open, additive uses neutral readiness
        assert_eq!(split.gates["regulatory_gate"], 1.0);
        assert!((split.additive - to_signed(0.5 * (1.0 - 0.7 * 0.7))).abs() < 1e-12);
        assert!((split.risk[&RiskChannel::Geopolitical] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_liability_uses_compliance_alone() {
        let out = run(
            FactorGroup::GeoRegulatory,
            &[(REG_COMPLIANCE_READINESS, 0.8)],
            &even_mixture(),
        );
        assert!((out.debug["readiness"].as_f64().unwrap() - 0.8).abs() < 1e-12);
        assert!((out.additive - 0.6).abs() < 1e-12);
    }
}
