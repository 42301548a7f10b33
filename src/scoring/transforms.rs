//! Pure nonlinear shaping functions shared by all factor groups.
//!
//! Every function is total on its declared domain: finite, in-range input
//! never yields NaN or infinity.

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Logistic S-curve centered at `midpoint`, output in [0, 1].
pub fn sigmoid(x: f64, steepness: f64, midpoint: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (x - midpoint)).exp())
}

/// Saturating log transform: `tanh(ln(1 + scale * x))`.
///
/// 0 at 0, strictly increasing and concave for `x >= 0`, approaching 1 as
/// `x` grows. Negative input is treated as 0.
pub fn log_saturation(x: f64, scale: f64) -> f64 {
    let u = scale.max(0.0) * x.max(0.0);
    u.ln_1p().tanh()
}

/// Threshold gate on a 0..1 feasibility score.
///
/// A logistic step centered on `threshold`, rescaled so the gate is exactly
/// 0 at `x = 0` and exactly 1 at `x = 1`. `hardness` is the logistic
/// steepness; an infinite hardness gives a hard step, a vanishing one
/// degrades to the identity.
pub fn gate(x: f64, threshold: f64, hardness: f64) -> f64 {
    let v = clamp(x, 0.0, 1.0);
    if hardness == f64::INFINITY {
        return if v >= threshold { 1.0 } else { 0.0 };
    }

    let k = hardness.max(0.0);
    let lo = sigmoid(0.0, k, threshold);
    let hi = sigmoid(1.0, k, threshold);
    if hi - lo <= f64::EPSILON {
        return v;
    }
    clamp((sigmoid(v, k, threshold) - lo) / (hi - lo), 0.0, 1.0)
}

/// Turn a 0..1 badness score into a multiplier that decays from 1 toward 0.
pub fn exponential_downside(x: f64, rate: f64) -> f64 {
    (-rate.max(0.0) * clamp(x, 0.0, 1.0)).exp()
}

/// Map a 0..1 goodness score onto [-1, 1]; neutral 0.5 maps to 0.
pub fn to_signed(x01: f64) -> f64 {
    2.0 * clamp(x01, 0.0, 1.0) - 1.0
}

/// How far a 0..1 score sits above neutral, rescaled to 0..1.
pub fn excess(x01: f64) -> f64 {
    clamp(2.0 * x01 - 1.0, 0.0, 1.0)
}
