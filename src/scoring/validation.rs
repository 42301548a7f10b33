use super::config::RubricConfig;
use crate::groups::{FactorGroup, MAX_MULTIPLIER};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

fn check_unit(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
        errors.push(format!("{}: must be within [0, 1], got {}", field, value));
    }
}

fn check_positive(errors: &mut Vec<String>, field: &str, value: f64) {
    if value.is_nan() || value <= 0.0 {
        errors.push(format!("{}: must be positive, got {}", field, value));
    }
}

fn check_non_negative(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(format!("{}: must be non-negative, got {}", field, value));
    }
}

/// Multiplier gains are bounded so a single multiplier never exceeds
/// `MAX_MULTIPLIER` or drops below zero.
fn check_gain(errors: &mut Vec<String>, field: &str, value: f64) {
    let max_gain = MAX_MULTIPLIER - 1.0;
    if !(value.is_finite() && (0.0..=max_gain).contains(&value)) {
        errors.push(format!("{}: must be within [0, {}], got {}", field, max_gain, value));
    }
}

/// Validate rubric configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_rubric(config: &RubricConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Group weights
    for group in FactorGroup::ALL {
        let field = format!("rubric.weights.{}", group.name());
        check_non_negative(&mut errors, &field, config.weights.get(group));
    }
    let total = config.weights.total();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!("rubric.weights: must sum to 1, got {}", total));
    }

    // Risk and signal filtering
    check_unit(&mut errors, "rubric.risk_weight", config.risk_weight);
    if !(config.risk_exponent.is_finite() && config.risk_exponent >= 1.0) {
        errors.push(format!(
            "rubric.risk_exponent: must be >= 1, got {}",
            config.risk_exponent
        ));
    }
    check_unit(&mut errors, "rubric.confidence_floor", config.confidence_floor);

    // Constraint group
    let c = &config.groups.constraint;
    check_unit(&mut errors, "rubric.groups.constraint.power_threshold", c.power_threshold);
    check_positive(&mut errors, "rubric.groups.constraint.power_hardness", c.power_hardness);
    check_unit(&mut errors, "rubric.groups.constraint.compute_threshold", c.compute_threshold);
    check_positive(&mut errors, "rubric.groups.constraint.compute_hardness", c.compute_hardness);
    check_positive(&mut errors, "rubric.groups.constraint.power_saturation", c.power_saturation);
    check_positive(&mut errors, "rubric.groups.constraint.compute_saturation", c.compute_saturation);
    check_non_negative(&mut errors, "rubric.groups.constraint.power_regime_exponent", c.power_regime_exponent);

    // Trust group
    let t = &config.groups.trust;
    check_non_negative(&mut errors, "rubric.groups.trust.incident_rate", t.incident_rate);
    check_positive(&mut errors, "rubric.groups.trust.adoption_steepness", t.adoption_steepness);
    check_unit(&mut errors, "rubric.groups.trust.adoption_midpoint", t.adoption_midpoint);
    check_gain(&mut errors, "rubric.groups.trust.multiplier_gain", t.multiplier_gain);

    // Control points group
    let cp = &config.groups.control_points;
    check_positive(&mut errors, "rubric.groups.control_points.lock_saturation", cp.lock_saturation);
    check_positive(&mut errors, "rubric.groups.control_points.switching_saturation", cp.switching_saturation);
    check_positive(&mut errors, "rubric.groups.control_points.data_saturation", cp.data_saturation);
    check_positive(&mut errors, "rubric.groups.control_points.network_saturation", cp.network_saturation);
    check_gain(&mut errors, "rubric.groups.control_points.flywheel_gain", cp.flywheel_gain);

    // Adaptation group
    check_gain(
        &mut errors,
        "rubric.groups.adaptation.multiplier_gain",
        config.groups.adaptation.multiplier_gain,
    );

    // Geo-regulatory group
    let g = &config.groups.georeg;
    check_unit(&mut errors, "rubric.groups.georeg.readiness_threshold", g.readiness_threshold);
    check_positive(&mut errors, "rubric.groups.georeg.readiness_hardness", g.readiness_hardness);
    check_non_negative(&mut errors, "rubric.groups.georeg.clampdown_exponent", g.clampdown_exponent);
    check_unit(&mut errors, "rubric.groups.georeg.exposure_damping", g.exposure_damping);
    check_non_negative(&mut errors, "rubric.groups.georeg.bifurcation_rate", g.bifurcation_rate);

    // Capital allocation group
    let k = &config.groups.capital_alloc;
    check_unit(&mut errors, "rubric.groups.capital_alloc.moonshot_penalty", k.moonshot_penalty);
    check_gain(&mut errors, "rubric.groups.capital_alloc.mna_gain", k.mna_gain);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
