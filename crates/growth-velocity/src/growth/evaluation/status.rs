use super::super::domain::{IntervalBucket, MeasurementKind};
use serde::{Deserialize, Serialize};

/// Classification of one increment against its reference band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityStatus {
    Adequate,
    Inadequate,
    Excess,
    Unknown,
}

impl VelocityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adequate => "Adequate",
            Self::Inadequate => "Inadequate",
            Self::Excess => "Excess",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the child should be flagged for follow-up.
    pub const fn is_at_risk(self) -> bool {
        matches!(self, Self::Inadequate)
    }
}

/// Why an evaluation degraded to [`VelocityStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// No table, or no age window in the table, matched the observation.
    DataNotFound,
    /// Elapsed days fall between or beyond the defined intervals.
    IntervalOutOfRange,
    /// No standard exists for this measurement type over this interval.
    UnsupportedCombination,
}

impl UnknownReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DataNotFound => "reference data not found",
            Self::IntervalOutOfRange => "interval out of range",
            Self::UnsupportedCombination => "unsupported combination",
        }
    }
}

/// Result of evaluating one increment. Built once per call and handed to the caller
/// for persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthStatus {
    pub status: VelocityStatus,
    pub kind: MeasurementKind,
    pub lower_bound: Option<f64>,
    pub median: Option<f64>,
    pub upper_bound: Option<f64>,
    /// Gain in table units: grams for weight, centimeters for length.
    pub actual_increment: f64,
    pub increment_unit: &'static str,
    pub interval_used: Option<IntervalBucket>,
    pub elapsed_days: i64,
    /// Age in completed months used to pick the reference row.
    pub age_months: u32,
    pub age_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_reason: Option<UnknownReason>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempted_keys: Vec<String>,
    pub message: String,
}

impl GrowthStatus {
    pub fn is_unknown(&self) -> bool {
        self.status == VelocityStatus::Unknown
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.status.label(), self.message)
    }
}

/// Observation facts shared by every status built for one evaluation call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IncrementContext {
    pub(crate) kind: MeasurementKind,
    pub(crate) increment: f64,
    pub(crate) elapsed_days: i64,
    pub(crate) age_months: u32,
}

impl IncrementContext {
    pub(crate) fn amount(&self, value: f64) -> String {
        format_amount(self.kind, value)
    }

    pub(crate) fn unknown(
        &self,
        reason: UnknownReason,
        interval_used: Option<IntervalBucket>,
        attempted_keys: Vec<String>,
        message: String,
    ) -> GrowthStatus {
        GrowthStatus {
            status: VelocityStatus::Unknown,
            kind: self.kind,
            lower_bound: None,
            median: None,
            upper_bound: None,
            actual_increment: self.increment,
            increment_unit: self.kind.increment_unit(),
            interval_used,
            elapsed_days: self.elapsed_days,
            age_months: self.age_months,
            age_window: None,
            unknown_reason: Some(reason),
            attempted_keys,
            message,
        }
    }
}

fn format_amount(kind: MeasurementKind, value: f64) -> String {
    match kind {
        MeasurementKind::Weight => format!("{value:.0} {}", kind.increment_unit()),
        MeasurementKind::Length => format!("{value:.1} {}", kind.increment_unit()),
    }
}
