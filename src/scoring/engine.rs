use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::aggregate::{aggregate, combine_risk, final_score};
use super::config::RubricConfig;
use super::validation::validate_rubric;
use crate::error::{ScoringError, ValidationError};
use crate::groups::{
    FactorGroup, FactorGroupCalculator, FactorOutput, RiskChannel, ScoreRequest, SignalUnavailable,
};
use crate::provider::{DataProvider, ProviderError};
use crate::regime::{resolve_mixture, RegimeMixture, RegimeWeights};
use crate::signal::Horizon;

/// Everything that went into one company's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub company: String,
    pub horizon: Horizon,
    pub as_of: Option<NaiveDate>,
    pub regime_mixture: RegimeMixture,
    pub group_outputs: BTreeMap<FactorGroup, FactorOutput>,
    pub base_additive: f64,
    pub gate_multiplier: f64,
    pub multiplier_product: f64,
    pub risk_channels: BTreeMap<RiskChannel, f64>,
    pub risk_index: f64,
    pub risk_discount: f64,
    pub final_score: f64,
}

impl ScoreBreakdown {
    /// Groups that fell back to a neutral default for at least one metric.
    pub fn degraded_groups(&self) -> Vec<FactorGroup> {
        self.group_outputs
            .iter()
            .filter(|(_, out)| out.is_degraded())
            .map(|(group, _)| *group)
            .collect()
    }

    /// True when the provider did not recognize the company at all, so every
    /// metric fell back with an unknown-company error.
    pub fn company_unknown(&self) -> bool {
        let unknown =
            SignalUnavailable::from(ProviderError::UnknownCompany(self.company.clone())).to_string();
        let mut reasons = self
            .group_outputs
            .values()
            .flat_map(|o| o.fallbacks().into_values().map(|r| r == unknown).collect::<Vec<_>>())
            .peekable();
        reasons.peek().is_some() && reasons.all(|is_unknown| is_unknown)
    }

    /// Smallest gate across all groups, if any group has a gate.
    pub fn tightest_gate(&self) -> Option<(&str, f64)> {
        self.group_outputs
            .values()
            .flat_map(|o| o.gates.iter())
            .map(|(name, v)| (name.as_str(), *v))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Scores companies against a fixed rubric and a data provider.
///
/// Construction validates the rubric once; every later call is infallible
/// except for mixture problems.
pub struct RubricScorer<P> {
    provider: P,
    config: RubricConfig,
}

impl<P: DataProvider> RubricScorer<P> {
    pub fn new(provider: P, config: RubricConfig) -> Result<Self, ValidationError> {
        validate_rubric(&config).map_err(ValidationError::Config)?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &RubricConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn score_company(
        &self,
        company: &str,
        horizon: Horizon,
        as_of: Option<NaiveDate>,
        regime_mixture: Option<RegimeWeights>,
    ) -> Result<ScoreBreakdown, ScoringError> {
        let mixture = resolve_mixture(regime_mixture.as_ref(), &self.provider, horizon, as_of)?;
        let request = ScoreRequest {
            company,
            horizon,
            as_of,
        };

        let group_outputs = self.compute_groups(&request, &mixture);
        let agg = aggregate(&group_outputs, &self.config.weights);
        let risk = combine_risk(&group_outputs);
        let fin = final_score(&agg, risk.risk_index, &self.config);

        debug!(
            company,
            %horizon,
            base_additive = agg.base_additive,
            gate_multiplier = agg.gate_multiplier,
            multiplier_product = agg.multiplier_product,
            risk_index = risk.risk_index,
            final_score = fin.score,
            "scored company"
        );

        Ok(ScoreBreakdown {
            company: company.to_string(),
            horizon,
            as_of,
            regime_mixture: mixture,
            group_outputs,
            base_additive: agg.base_additive,
            gate_multiplier: agg.gate_multiplier,
            multiplier_product: agg.multiplier_product,
            risk_channels: risk.channels,
            risk_index: risk.risk_index,
            risk_discount: fin.risk_discount,
            final_score: fin.score,
        })
    }

    fn compute_groups(
        &self,
        request: &ScoreRequest<'_>,
        mixture: &RegimeMixture,
    ) -> BTreeMap<FactorGroup, FactorOutput> {
        let provider: &dyn DataProvider = &self.provider;
        let run = |group: &FactorGroup| {
            (
                group.group(),
                group.compute(request, mixture, provider, &self.config),
            )
        };

        if self.config.parallel {
            FactorGroup::ALL.par_iter().map(run).collect()
        } else {
            FactorGroup::ALL.iter().map(run).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::metrics::*;
    use crate::provider::{MetricQuery, ProviderError, SnapshotProvider};
    use crate::regime::Regime;
    use crate::signal::{ScoreRange, Signal};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COMPANY: &str = "Acme";

    fn mixture() -> RegimeWeights {
        RegimeWeights::new()
            .with(Regime::PowerConstrainedBoom, 0.35)
            .with(Regime::SecurityArmsRace, 0.35)
            .with(Regime::TrustCollapse, 0.15)
            .with(Regime::HyperCompetition, 0.15)
    }

    fn provider(metrics: &[(&str, f64)]) -> SnapshotProvider {
        metrics
            .iter()
            .fold(SnapshotProvider::new(), |p, (id, v)| p.with_score(COMPANY, id, *v))
    }

    fn strong_company() -> Vec<(&'static str, f64)> {
        vec![
            (MACRO_COMPANY_SENSITIVITY, 0.3),
            (MACRO_TIGHTNESS_INDEX, 0.6),
            (CONSTRAINT_POWER_ACCESS, 0.85),
            (CONSTRAINT_COMPUTE_ACCESS, 0.9),
            (TRUST_SECURITY_MATURITY, 0.8),
            (TRUST_AUDITABILITY, 0.75),
            (TRUST_PROVENANCE_SUPPORT, 0.7),
            (TRUST_SECURITY_INCIDENT, 0.1),
            (PLATFORM_DISTRIBUTION_LOCK, 0.9),
            (PLATFORM_SWITCHING_COST, 0.8),
            (PLATFORM_DATA_ADVANTAGE, 0.8),
            (PLATFORM_NETWORK_EFFECTS, 0.7),
            (ORG_SHIP_VELOCITY, 0.8),
            (ORG_TALENT_DENSITY, 0.85),
            (ORG_INTERNAL_AGENT_ADOPTION, 0.7),
            (ORG_RESTRUCTURE_VELOCITY, 0.6),
            (REG_COMPLIANCE_READINESS, 0.8),
            (REG_LIABILITY_READINESS, 0.7),
            (GEO_EXPORT_CONTROL_EXPOSURE, 0.3),
            (GEO_SANCTIONS_EXPOSURE, 0.1),
            (REG_ANTITRUST_RISK, 0.4),
            (CAPITAL_FREE_CASH_FLOW, 0.9),
            (CAPITAL_BALANCE_SHEET, 0.9),
            (CAPITAL_MNA_SKILL, 0.6),
            (CAPITAL_DISCIPLINE, 0.7),
            (CAPITAL_MOONSHOT, 0.3),
        ]
    }

    fn score(p: SnapshotProvider, config: RubricConfig) -> ScoreBreakdown {
        RubricScorer::new(p, config)
            .unwrap()
            .score_company(COMPANY, Horizon::Mid, None, Some(mixture()))
            .unwrap()
    }

    /// Fails every call and counts how often it was asked.
    #[derive(Default)]
    struct FailingProvider {
        calls: AtomicUsize,
    }

    impl DataProvider for FailingProvider {
        fn get_value(&self, _query: &MetricQuery<'_>) -> Result<Signal, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Backend("timeout".to_string()))
        }

        fn get_score(&self, query: &MetricQuery<'_>, _range: ScoreRange) -> Result<Signal, ProviderError> {
            self.get_value(query)
        }
    }

    #[test]
    fn test_strong_company_scores_positive() {
        let b = score(provider(&strong_company()), RubricConfig::default());
        assert!(b.final_score > 0.0 && b.final_score <= 100.0);
        assert!(b.base_additive > 0.0);
        assert!(b.degraded_groups().is_empty());
        assert_eq!(b.group_outputs.len(), 7);
        assert!((b.regime_mixture.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_gate_dominance() {
        let mut metrics = strong_company();
        for (id, v) in metrics.iter_mut() {
            if *id == CONSTRAINT_POWER_ACCESS {
                *v = 0.0;
            }
            if *id == CONSTRAINT_COMPUTE_ACCESS {
                *v = 1.0;
            }
        }
        let b = score(provider(&metrics), RubricConfig::default());
        assert_eq!(b.gate_multiplier, 0.0);
        assert_eq!(b.final_score, 0.0);
        assert_eq!(b.tightest_gate(), Some(("power_gate", 0.0)));
    }

    #[test]
    fn test_neutral_scenario_scores_zero() {
        // Every group missing: additive 0, gates 1, multipliers 1, no risk
        let b = score(SnapshotProvider::new(), RubricConfig::default());
        assert_eq!(b.base_additive, 0.0);
        assert_eq!(b.gate_multiplier, 1.0);
        assert_eq!(b.multiplier_product, 1.0);
        assert_eq!(b.risk_index, 0.0);
        assert_eq!(b.final_score, 0.0);
    }

    #[test]
    fn test_midpoint_inputs_add_nothing() {
        let midpoint = [
            (ORG_SHIP_VELOCITY, 0.5),
            (ORG_TALENT_DENSITY, 0.5),
            (ORG_INTERNAL_AGENT_ADOPTION, 0.5),
            (ORG_RESTRUCTURE_VELOCITY, 0.5),
            (CAPITAL_FREE_CASH_FLOW, 0.5),
            (CAPITAL_BALANCE_SHEET, 0.5),
            (CAPITAL_MNA_SKILL, 0.5),
            (CAPITAL_DISCIPLINE, 0.5),
        ];
        let b = score(provider(&midpoint), RubricConfig::default());
        assert_eq!(b.group_outputs[&FactorGroup::Adaptation].additive, 0.0);
        assert_eq!(b.group_outputs[&FactorGroup::CapitalAllocation].additive, 0.0);
        assert_eq!(
            b.group_outputs[&FactorGroup::Adaptation].multipliers["adaptation_multiplier"],
            1.0
        );
        assert_eq!(b.base_additive, 0.0);
        assert_eq!(b.final_score, 0.0);
        // Midpoint execution inputs still carry risk
        assert!(b.risk_index > 0.0);
    }

    #[test]
    fn test_unknown_company_detected() {
        let b = score(provider(&strong_company()), RubricConfig::default());
        assert!(!b.company_unknown());

        let scorer = RubricScorer::new(provider(&strong_company()), RubricConfig::default()).unwrap();
        let missing = scorer
            .score_company("Acne", Horizon::Mid, None, Some(mixture()))
            .unwrap();
        assert!(missing.company_unknown());
        assert_eq!(missing.final_score, 0.0);

        // Known company with one metric missing is only degraded
        let partial = provider(&[(CAPITAL_FREE_CASH_FLOW, 0.9)]);
        let b = score(partial, RubricConfig::default());
        assert!(!b.degraded_groups().is_empty());
        assert!(!b.company_unknown());
    }

    #[test]
    fn test_failing_provider_degrades_every_metric() {
        let failing = FailingProvider::default();
        let scorer = RubricScorer::new(failing, RubricConfig::default()).unwrap();
        let b = scorer
            .score_company(COMPANY, Horizon::Short, None, Some(mixture()))
            .unwrap();
        assert_eq!(b.final_score, 0.0);
        assert_eq!(b.degraded_groups().len(), 7);
        assert_eq!(scorer.provider().calls.load(Ordering::SeqCst), METRICS.len());
        let fallbacks = b.group_outputs[&FactorGroup::Trust].fallbacks();
        assert!(fallbacks[TRUST_SECURITY_INCIDENT].contains("timeout"));
    }

    #[test]
    fn test_single_missing_metric_is_recorded() {
        let metrics: Vec<_> = strong_company()
            .into_iter()
            .filter(|(id, _)| *id != TRUST_AUDITABILITY)
            .collect();
        let b = score(provider(&metrics), RubricConfig::default());
        assert_eq!(b.degraded_groups(), vec![FactorGroup::Trust]);
        assert!(b.group_outputs[&FactorGroup::Trust]
            .fallbacks()
            .contains_key(TRUST_AUDITABILITY));
        assert!(b.final_score > 0.0);
    }

    #[test]
    fn test_idempotent() {
        let p = provider(&strong_company());
        let scorer = RubricScorer::new(p, RubricConfig::default()).unwrap();
        let a = scorer.score_company(COMPANY, Horizon::Mid, None, Some(mixture())).unwrap();
        let b = scorer.score_company(COMPANY, Horizon::Mid, None, Some(mixture())).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.final_score.to_bits(), b.final_score.to_bits());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = score(provider(&strong_company()), RubricConfig::default());
        let config = RubricConfig {
            parallel: true,
            ..RubricConfig::default()
        };
        let parallel = score(provider(&strong_company()), config);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_bounds_hold_for_extremes() {
        for fill in [0.0, 1.0] {
            let metrics: Vec<(&str, f64)> = METRICS.iter().map(|m| (m.id, fill)).collect();
            let b = score(provider(&metrics), RubricConfig::default());
            assert!((-100.0..=100.0).contains(&b.final_score));
            assert!((0.0..=1.0).contains(&b.gate_multiplier));
            assert!((0.0..=1.0).contains(&b.risk_index));
            assert!((-1.0..=1.0).contains(&b.base_additive));
        }
    }

    #[test]
    fn test_more_power_never_lowers_score() {
        let with_power = |p: f64| {
            let mut metrics = strong_company();
            for (id, v) in metrics.iter_mut() {
                if *id == CONSTRAINT_POWER_ACCESS {
                    *v = p;
                }
            }
            score(provider(&metrics), RubricConfig::default()).final_score
        };
        assert!(with_power(0.9) >= with_power(0.2));
    }

    #[test]
    fn test_invalid_mixture_rejected() {
        let scorer = RubricScorer::new(provider(&strong_company()), RubricConfig::default()).unwrap();
        let bad = RegimeWeights::new().with(Regime::TrustCollapse, -1.0);
        let err = scorer
            .score_company(COMPANY, Horizon::Mid, None, Some(bad))
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::Validation(ValidationError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_mixture_from_provider_or_error() {
        let scorer = RubricScorer::new(provider(&strong_company()), RubricConfig::default()).unwrap();
        let err = scorer.score_company(COMPANY, Horizon::Mid, None, None).unwrap_err();
        assert!(matches!(err, ScoringError::MixtureUnavailable(_)));

        let p = provider(&strong_company()).with_regime_mixture(mixture());
        let scorer = RubricScorer::new(p, RubricConfig::default()).unwrap();
        let b = scorer.score_company(COMPANY, Horizon::Mid, None, None).unwrap();
        assert!((b.regime_mixture.weight(Regime::PowerConstrainedBoom) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let config = RubricConfig {
            risk_weight: 2.0,
            ..RubricConfig::default()
        };
        let err = RubricScorer::new(SnapshotProvider::new(), config).err().unwrap();
        match err {
            ValidationError::Config(errors) => assert!(errors[0].contains("risk_weight")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_breakdown_serializes() {
        let b = score(provider(&strong_company()), RubricConfig::default());
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["horizon"], "mid");
        assert!(json["group_outputs"]["constraint"]["gates"]["power_gate"].is_number());
        assert!(json["regime_mixture"]["power_constrained_boom"].is_number());
    }
}
