use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::regime::RegimeWeights;
use crate::scoring::RubricConfig;

/// Contents of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub rubric: RubricConfig,

    /// Regime weights used when `--regime` is not given. Falls back to the
    /// data file's recommendation when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regime_mixture: Option<RegimeWeights>,

    /// Default snapshot data file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
}
