//! Regime-weighted company scoring.
//!
//! A [`RubricScorer`] pulls normalized signals from a [`DataProvider`], runs
//! them through seven factor groups and folds the results into a bounded
//! score with a separately tracked risk index. See [`ScoreBreakdown`] for
//! everything a call reports.

pub mod config;
pub mod error;
pub mod groups;
pub mod output;
pub mod provider;
pub mod rank;
pub mod regime;
pub mod scoring;
pub mod signal;

pub use error::{ScoringError, ValidationError};
pub use groups::{FactorGroup, FactorGroupCalculator, FactorOutput, RiskChannel, ScoreRequest};
pub use provider::{DataProvider, MetricQuery, ProviderError, SnapshotProvider};
pub use regime::{Regime, RegimeMixture, RegimeWeights};
pub use scoring::{RubricConfig, RubricScorer, ScoreBreakdown};
pub use signal::{Horizon, Scale, ScoreRange, Signal};
