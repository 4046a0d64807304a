//! Growth-velocity classification against the WHO 2006 increment standards.
//!
//! An observation (two dated values of one measurement type) is bucketed by elapsed days,
//! matched to an age window, and compared with the 5th and 95th percentile increments for
//! the child's sex. Missing reference data and irregular intervals degrade to `unknown`
//! rather than failing the caller.

pub mod age;
pub mod domain;
pub mod evaluation;
pub mod interval;
pub mod reference;
pub mod resolver;
pub mod router;
pub mod series;
pub mod service;

#[cfg(test)]
mod tests;

pub use age::AgeCalculator;
pub use domain::{
    GrowthError, GrowthObservation, IntervalBucket, Measurement, MeasurementKind, Sex,
};
pub use evaluation::{
    EvaluationStrategy, FixedThresholdResult, FixedThresholdStatus, GrowthStatus,
    GrowthStatusEvaluator, LegacyFixedThresholdEvaluator, StrategyKind, UnknownReason,
    VelocityStatus,
};
pub use interval::{AgeWindowKey, BucketDecision, IntervalClassification, IntervalClassifier};
pub use reference::{
    published_keys, AgeWindow, AgeWindowTable, ReferenceDataError, ReferenceOrigin,
    ReferenceTableStore, TableKey, ThresholdRecord,
};
pub use resolver::{ResolvedThreshold, ThresholdResolver};
pub use router::{growth_router, EvaluateRequest, SeriesRequest};
pub use series::{evaluate_series, ChildGrowthSummary, ChildProfile, GrowthSeries, SeriesEntry};
pub use service::{GrowthServiceError, GrowthVelocityService, ReferenceRowView, ReferenceTableView};
