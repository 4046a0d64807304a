use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{GrowthError, GrowthObservation, IntervalBucket, Measurement, MeasurementKind, Sex};
use super::evaluation::{EvaluationStrategy, GrowthStatus, StrategyKind};
use super::reference::{ReferenceTableStore, TableKey};
use super::series::{evaluate_series, ChildProfile, GrowthSeries};

/// Service holding the shared reference store and both evaluation strategies.
#[derive(Debug, Clone)]
pub struct GrowthVelocityService {
    store: Arc<ReferenceTableStore>,
    default_strategy: StrategyKind,
    percentile_window: EvaluationStrategy,
    fixed_monthly: EvaluationStrategy,
}

impl GrowthVelocityService {
    pub fn new(store: Arc<ReferenceTableStore>, default_strategy: StrategyKind) -> Self {
        info!(
            tables = store.len(),
            strategy = default_strategy.key(),
            "growth velocity service ready"
        );

        Self {
            percentile_window: EvaluationStrategy::for_kind(
                StrategyKind::PercentileWindow,
                store.clone(),
            ),
            fixed_monthly: EvaluationStrategy::for_kind(StrategyKind::FixedMonthly, store.clone()),
            store,
            default_strategy,
        }
    }

    pub fn store(&self) -> &ReferenceTableStore {
        &self.store
    }

    pub fn default_strategy(&self) -> StrategyKind {
        self.default_strategy
    }

    /// Strategy for `requested`, falling back to the configured default.
    pub fn strategy(&self, requested: Option<StrategyKind>) -> &EvaluationStrategy {
        match requested.unwrap_or(self.default_strategy) {
            StrategyKind::PercentileWindow => &self.percentile_window,
            StrategyKind::FixedMonthly => &self.fixed_monthly,
        }
    }

    pub fn evaluate(
        &self,
        observation: &GrowthObservation,
        strategy: Option<StrategyKind>,
    ) -> Result<GrowthStatus, GrowthServiceError> {
        Ok(self.strategy(strategy).evaluate(observation)?)
    }

    pub fn evaluate_series(
        &self,
        child: &ChildProfile,
        measurements: &[Measurement],
        strategy: Option<StrategyKind>,
    ) -> Result<GrowthSeries, GrowthServiceError> {
        Ok(evaluate_series(self.strategy(strategy), child, measurements)?)
    }

    /// Percentile rows of one reference table, in age order.
    pub fn reference_table(
        &self,
        kind: MeasurementKind,
        sex: Sex,
        bucket: IntervalBucket,
    ) -> Result<ReferenceTableView, GrowthServiceError> {
        let key = TableKey::new(kind, sex, bucket);
        if !key.is_published() {
            return Err(GrowthServiceError::Unpublished(key));
        }

        let table = self
            .store
            .table(kind, sex, bucket)
            .ok_or(GrowthServiceError::TableNotFound(key))?;

        let rows = table
            .rows()
            .map(|(window, record)| ReferenceRowView {
                window: window.canonical(),
                p5: record.p5,
                p50: record.p50,
                p95: record.p95,
            })
            .collect();

        Ok(ReferenceTableView {
            table: key.to_string(),
            kind,
            sex,
            interval: bucket,
            unit: kind.increment_unit(),
            rows,
        })
    }
}

/// JSON-friendly projection of an [`AgeWindowTable`](super::reference::AgeWindowTable).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTableView {
    pub table: String,
    pub kind: MeasurementKind,
    pub sex: Sex,
    pub interval: IntervalBucket,
    pub unit: &'static str,
    pub rows: Vec<ReferenceRowView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRowView {
    pub window: String,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

/// Error raised by the growth velocity service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrowthServiceError {
    #[error(transparent)]
    InvalidInput(#[from] GrowthError),
    #[error("reference table {0} is not loaded")]
    TableNotFound(TableKey),
    #[error("no WHO standard is published for {0}")]
    Unpublished(TableKey),
}
