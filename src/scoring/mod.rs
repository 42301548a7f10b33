pub mod aggregate;
pub mod config;
pub mod engine;
pub mod transforms;
pub mod validation;

pub use config::*;
pub use engine::{RubricScorer, ScoreBreakdown};
pub use validation::validate_rubric;
