use crate::provider::ProviderError;
use crate::regime::Regime;

/// Fatal input problems. Surfaced immediately, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("regime weight for {regime} is negative ({weight})")]
    NegativeWeight { regime: Regime, weight: f64 },

    #[error("regime weight for {regime} is not a finite number")]
    NonFiniteWeight { regime: Regime },

    #[error("regime mixture has no positive weight")]
    ZeroTotalWeight,

    #[error("unknown regime '{0}'")]
    UnknownRegime(String),

    #[error("invalid rubric configuration:\n  - {}", .0.join("\n  - "))]
    Config(Vec<String>),
}

/// Errors returned by [`crate::RubricScorer::score_company`].
///
/// Per-metric provider failures never show up here; they degrade the
/// affected metric and are recorded in the group's debug output instead.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no regime mixture supplied and the provider could not recommend one: {0}")]
    MixtureUnavailable(#[source] ProviderError),
}
