mod legacy;
mod status;
mod strategy;

pub use legacy::{FixedThresholdResult, FixedThresholdStatus, LegacyFixedThresholdEvaluator};
pub use status::{GrowthStatus, UnknownReason, VelocityStatus};
pub use strategy::{EvaluationStrategy, StrategyKind};

use super::age::AgeCalculator;
use super::domain::{GrowthError, GrowthObservation, IntervalBucket, MeasurementKind, Sex};
use super::interval::{BucketDecision, IntervalClassifier};
use super::reference::ReferenceTableStore;
use super::resolver::{ResolvedThreshold, ThresholdResolver};
use status::IncrementContext;
use std::sync::Arc;
use tracing::{debug, warn};

/// Classifies weight and length increments against the WHO percentile windows.
///
/// Only invalid input is returned as an error. Irregular intervals and missing reference data
/// produce a [`VelocityStatus::Unknown`] status so the recording flow is never blocked.
#[derive(Debug, Clone)]
pub struct GrowthStatusEvaluator {
    store: Arc<ReferenceTableStore>,
}

impl GrowthStatusEvaluator {
    pub fn new(store: Arc<ReferenceTableStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ReferenceTableStore {
        &self.store
    }

    pub fn evaluate(&self, observation: &GrowthObservation) -> Result<GrowthStatus, GrowthError> {
        observation.validate()?;

        let raw = round_to_hundredths(observation.current_value - observation.previous_value);
        let increment = observation.kind.normalize_increment(raw);
        let age_months =
            AgeCalculator::age_in_months(observation.date_of_birth, observation.previous_date)?;
        let interval = IntervalClassifier::classify_for(
            observation.previous_date,
            observation.current_date,
            observation.kind,
        )?;

        let context = IncrementContext {
            kind: observation.kind,
            increment,
            elapsed_days: interval.elapsed_days,
            age_months,
        };

        let bucket = match interval.decision {
            BucketDecision::Standard(bucket) => bucket,
            BucketDecision::Irregular => {
                return Ok(context.unknown(
                    UnknownReason::IntervalOutOfRange,
                    None,
                    Vec::new(),
                    format!(
                        "interval too irregular to evaluate: {interval}; record another {} measurement at a regular interval",
                        observation.kind.key()
                    ),
                ));
            }
            BucketDecision::NotApplicable(bucket) => {
                return Ok(context.unknown(
                    UnknownReason::UnsupportedCombination,
                    Some(bucket),
                    Vec::new(),
                    format!(
                        "no WHO standard exists for {} velocity over a {}-month interval ({} days elapsed)",
                        observation.kind.key(),
                        bucket.months(),
                        interval.elapsed_days
                    ),
                ));
            }
        };

        let resolver = ThresholdResolver::new(&self.store);
        let Some(table) = resolver.select_table(observation.kind, observation.sex, bucket) else {
            warn!(
                kind = observation.kind.key(),
                sex = observation.sex.key(),
                interval = %bucket,
                "reference table missing"
            );
            return Ok(context.unknown(
                UnknownReason::DataNotFound,
                Some(bucket),
                Vec::new(),
                format!(
                    "missing reference data: no {} table for {} at the {} interval ({interval})",
                    observation.kind.key(),
                    observation.sex.key(),
                    bucket
                ),
            ));
        };

        let key = IntervalClassifier::age_window_key(age_months, bucket, interval.elapsed_days);
        let Some(threshold) = ThresholdResolver::resolve(table, &key) else {
            let attempted: Vec<String> = key.candidates().map(str::to_string).collect();
            warn!(
                table = %table.key(),
                age_months,
                attempted = ?attempted,
                "no age window matched"
            );
            let message = format!(
                "missing reference data: table {} has no age window for {} months ({interval}); attempted keys: {}",
                table.key(),
                age_months,
                attempted.join(", ")
            );
            return Ok(context.unknown(
                UnknownReason::DataNotFound,
                Some(bucket),
                attempted,
                message,
            ));
        };

        let status = classify_increment(&context, observation.sex, bucket, &threshold);
        debug!(
            kind = observation.kind.key(),
            window = %threshold.window,
            increment,
            status = status.status.label(),
            "evaluated growth increment"
        );
        Ok(status)
    }
}

fn classify_increment(
    context: &IncrementContext,
    sex: Sex,
    bucket: IntervalBucket,
    threshold: &ResolvedThreshold,
) -> GrowthStatus {
    let record = threshold.record;
    let window = threshold.window.canonical();
    let gained = context.amount(context.increment);
    let band = format!(
        "{} {} {} interval, window {}",
        sex.label(),
        context.kind.key(),
        bucket,
        window
    );

    let (status, message) = if context.increment < record.p5 {
        let indicator = match context.kind {
            MeasurementKind::Weight => "weight faltering",
            MeasurementKind::Length => "length deceleration",
        };
        (
            VelocityStatus::Inadequate,
            format!(
                "{indicator}: gained {gained} over {} days, below the WHO 5th percentile of {} ({band})",
                context.elapsed_days,
                context.amount(record.p5)
            ),
        )
    } else if context.increment > record.p95 {
        match context.kind {
            MeasurementKind::Weight => (
                VelocityStatus::Excess,
                format!(
                    "excess weight gain: gained {gained} over {} days, above the WHO 95th percentile of {} ({band})",
                    context.elapsed_days,
                    context.amount(record.p95)
                ),
            ),
            MeasurementKind::Length => (
                VelocityStatus::Adequate,
                format!(
                    "adequate length gain: gained {gained} over {} days, above the WHO 95th percentile of {}; median {} ({band})",
                    context.elapsed_days,
                    context.amount(record.p95),
                    context.amount(record.p50)
                ),
            ),
        }
    } else {
        (
            VelocityStatus::Adequate,
            format!(
                "adequate {} gain: gained {gained} over {} days, within the WHO band [{}, {}]; median {} ({band})",
                context.kind.key(),
                context.elapsed_days,
                context.amount(record.p5),
                context.amount(record.p95),
                context.amount(record.p50)
            ),
        )
    };

    GrowthStatus {
        status,
        kind: context.kind,
        lower_bound: Some(record.p5),
        median: Some(record.p50),
        upper_bound: Some(record.p95),
        actual_increment: context.increment,
        increment_unit: context.kind.increment_unit(),
        interval_used: Some(bucket),
        elapsed_days: context.elapsed_days,
        age_months: context.age_months,
        age_window: Some(window),
        unknown_reason: None,
        attempted_keys: Vec::new(),
        message,
    }
}

/// Rounds to two decimals so subtraction artifacts such as `0.8999999` become `0.9`.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_removes_subtraction_artifacts() {
        assert_eq!(round_to_hundredths(4.1 - 3.2), 0.9);
        assert_eq!(round_to_hundredths(7.05 - 7.0), 0.05);
        assert_eq!(
            MeasurementKind::Weight.normalize_increment(round_to_hundredths(4.1 - 3.2)),
            900.0
        );
    }
}
