use super::super::age::AgeCalculator;
use super::super::domain::{GrowthError, GrowthObservation, MeasurementKind, Sex};
use super::status::{GrowthStatus, IncrementContext, UnknownReason, VelocityStatus};
use super::round_to_hundredths;
use serde::Serialize;

/// Minimum monthly weight gain in grams, by age bracket in months.
///
/// Brackets use inclusive upper bounds: a child aged exactly 2 months falls in `1-2`.
const MINIMUM_MONTHLY_INCREMENT_G: [(&str, u32); 13] = [
    ("0-1", 800),
    ("1-2", 900),
    ("2-3", 800),
    ("3-4", 600),
    ("4-5", 500),
    ("5-6", 400),
    ("6-7", 400),
    ("7-8", 300),
    ("8-9", 300),
    ("9-10", 300),
    ("10-11", 200),
    ("11-12", 200),
    ("12-24", 200),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedThresholdStatus {
    Adequate,
    Inadequate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixedThresholdResult {
    pub status: FixedThresholdStatus,
    pub min_increment: u32,
    pub bracket: &'static str,
}

/// Flat minimum-gain check that predates the WHO percentile windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFixedThresholdEvaluator;

impl LegacyFixedThresholdEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Bracket label for an age; `<= 1` maps to `0-1`, `<= 2` to `1-2`, and anything past
    /// twelve months to `12-24`.
    pub fn bracket_for_age(age_months: u32) -> (&'static str, u32) {
        let index = match age_months {
            0..=1 => 0,
            2..=12 => (age_months - 1) as usize,
            _ => MINIMUM_MONTHLY_INCREMENT_G.len() - 1,
        };
        MINIMUM_MONTHLY_INCREMENT_G[index]
    }

    /// The same table applies to both sexes.
    pub fn check_growth_status(
        &self,
        _sex: Sex,
        age_months: u32,
        weight_increment_grams: f64,
    ) -> FixedThresholdResult {
        let (bracket, min_increment) = Self::bracket_for_age(age_months);
        let status = if weight_increment_grams >= f64::from(min_increment) {
            FixedThresholdStatus::Adequate
        } else {
            FixedThresholdStatus::Inadequate
        };

        FixedThresholdResult {
            status,
            min_increment,
            bracket,
        }
    }

    /// Adapts [`Self::check_growth_status`] to the shared [`GrowthStatus`] contract.
    ///
    /// The bracket is chosen from the age at the current measurement. Length observations
    /// have no fixed thresholds and degrade to `unknown`.
    pub fn evaluate(&self, observation: &GrowthObservation) -> Result<GrowthStatus, GrowthError> {
        observation.validate()?;

        let raw = round_to_hundredths(observation.current_value - observation.previous_value);
        let increment = observation.kind.normalize_increment(raw);
        let age_months =
            AgeCalculator::age_in_months(observation.date_of_birth, observation.current_date)?;
        let elapsed_days = (observation.current_date - observation.previous_date).num_days();

        let context = IncrementContext {
            kind: observation.kind,
            increment,
            elapsed_days,
            age_months,
        };

        if observation.kind == MeasurementKind::Length {
            return Ok(context.unknown(
                UnknownReason::UnsupportedCombination,
                None,
                Vec::new(),
                "fixed monthly thresholds cover weight only; use the percentile window strategy for length"
                    .to_string(),
            ));
        }

        let result = self.check_growth_status(observation.sex, age_months, increment);
        let minimum = context.amount(f64::from(result.min_increment));
        let gained = context.amount(increment);
        let (status, message) = match result.status {
            FixedThresholdStatus::Adequate => (
                VelocityStatus::Adequate,
                format!(
                    "adequate weight gain: gained {gained}, meeting the minimum of {minimum} for age {} months",
                    result.bracket
                ),
            ),
            FixedThresholdStatus::Inadequate => (
                VelocityStatus::Inadequate,
                format!(
                    "weight faltering: gained {gained}, below the minimum of {minimum} for age {} months",
                    result.bracket
                ),
            ),
        };

        Ok(GrowthStatus {
            status,
            kind: observation.kind,
            lower_bound: Some(f64::from(result.min_increment)),
            median: None,
            upper_bound: None,
            actual_increment: increment,
            increment_unit: observation.kind.increment_unit(),
            interval_used: None,
            elapsed_days,
            age_months,
            age_window: Some(result.bracket.to_string()),
            unknown_reason: None,
            attempted_keys: Vec::new(),
            message,
        })
    }
}
