use super::super::domain::{GrowthError, GrowthObservation};
use super::super::reference::ReferenceTableStore;
use super::{GrowthStatus, GrowthStatusEvaluator, LegacyFixedThresholdEvaluator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which evaluation method a deployment uses by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    PercentileWindow,
    FixedMonthly,
}

impl StrategyKind {
    pub const fn key(self) -> &'static str {
        match self {
            Self::PercentileWindow => "percentile_window",
            Self::FixedMonthly => "fixed_monthly",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "percentile_window" | "percentile" | "who" => Ok(Self::PercentileWindow),
            "fixed_monthly" | "fixed" | "legacy" => Ok(Self::FixedMonthly),
            other => Err(format!(
                "unknown evaluation strategy `{other}` (expected percentile_window or fixed_monthly)"
            )),
        }
    }
}

/// Interchangeable evaluators sharing the [`GrowthStatus`] result contract.
#[derive(Debug, Clone)]
pub enum EvaluationStrategy {
    PercentileWindow(GrowthStatusEvaluator),
    FixedMonthly(LegacyFixedThresholdEvaluator),
}

impl EvaluationStrategy {
    pub fn for_kind(kind: StrategyKind, store: Arc<ReferenceTableStore>) -> Self {
        match kind {
            StrategyKind::PercentileWindow => {
                Self::PercentileWindow(GrowthStatusEvaluator::new(store))
            }
            StrategyKind::FixedMonthly => Self::FixedMonthly(LegacyFixedThresholdEvaluator::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::PercentileWindow(_) => StrategyKind::PercentileWindow,
            Self::FixedMonthly(_) => StrategyKind::FixedMonthly,
        }
    }

    pub fn evaluate(&self, observation: &GrowthObservation) -> Result<GrowthStatus, GrowthError> {
        match self {
            Self::PercentileWindow(evaluator) => evaluator.evaluate(observation),
            Self::FixedMonthly(evaluator) => evaluator.evaluate(observation),
        }
    }
}
