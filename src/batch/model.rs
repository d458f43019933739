use serde::{Deserialize, Serialize};

use crate::classifier::MetricConfig;
use crate::matcher::MatchConfig;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub metric: MetricConfig,
    pub matching: MatchConfig,
    /// Step limit shared by one whole-set analysis; unlimited when absent
    pub budget: Option<u64>,
    pub seed: u64,
    /// Solve assignments over the whole set instead of taking greedy first picks
    pub exhaustive: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            metric: MetricConfig::default(),
            matching: MatchConfig::default(),
            budget: None,
            seed: 0,
            exhaustive: true,
        }
    }
}
