use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const fn ordered() -> [Self; 2] {
        [Self::Male, Self::Female]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Boys",
            Self::Female => "Girls",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "boy" => Ok(Self::Male),
            "female" | "f" | "girl" => Ok(Self::Female),
            other => Err(format!("unknown sex '{other}' (expected male or female)")),
        }
    }
}

/// Which anthropometric value a measurement carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Weight,
    Length,
}

impl MeasurementKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Weight, Self::Length]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Length => "length",
        }
    }

    /// Unit of the increments compared against the reference tables.
    pub const fn increment_unit(self) -> &'static str {
        match self {
            Self::Weight => "g",
            Self::Length => "cm",
        }
    }

    /// Unit in which raw measurement values are recorded.
    pub const fn value_unit(self) -> &'static str {
        match self {
            Self::Weight => "kg",
            Self::Length => "cm",
        }
    }

    /// Scales a recorded difference into table units (kilograms become grams).
    pub(crate) fn normalize_increment(self, raw: f64) -> f64 {
        match self {
            Self::Weight => (raw * 1000.0).round(),
            Self::Length => raw,
        }
    }
}

impl FromStr for MeasurementKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(Self::Weight),
            "length" | "height" => Ok(Self::Length),
            other => Err(format!(
                "unknown measurement kind '{other}' (expected weight or length)"
            )),
        }
    }
}

/// Canonical elapsed-time classes that select a velocity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntervalBucket {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "2mo")]
    TwoMonths,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "4mo")]
    FourMonths,
    #[serde(rename = "6mo")]
    SixMonths,
}

impl IntervalBucket {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::OneMonth,
            Self::TwoMonths,
            Self::ThreeMonths,
            Self::FourMonths,
            Self::SixMonths,
        ]
    }

    pub const fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::TwoMonths => 2,
            Self::ThreeMonths => 3,
            Self::FourMonths => 4,
            Self::SixMonths => 6,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::TwoMonths => "2mo",
            Self::ThreeMonths => "3mo",
            Self::FourMonths => "4mo",
            Self::SixMonths => "6mo",
        }
    }

    /// Half-open `[start, end)` range of elapsed days assigned to this bucket.
    pub const fn day_range(self) -> (i64, i64) {
        match self {
            Self::OneMonth => (20, 48),
            Self::TwoMonths => (48, 78),
            Self::ThreeMonths => (78, 108),
            Self::FourMonths => (108, 138),
            Self::SixMonths => (150, 210),
        }
    }

    pub const fn nominal_days(self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::TwoMonths => 61,
            Self::ThreeMonths => 91,
            Self::FourMonths => 122,
            Self::SixMonths => 183,
        }
    }
}

impl fmt::Display for IntervalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for IntervalBucket {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown = || {
            format!("unknown interval '{value}' (expected one of 1mo, 2mo, 3mo, 4mo, 6mo)")
        };
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let digits_end = normalized
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(normalized.len());
        let (digits, suffix) = normalized.split_at(digits_end);
        if !matches!(suffix, "" | "m" | "mo" | "month" | "months") {
            return Err(unknown());
        }
        match digits {
            "1" => Ok(Self::OneMonth),
            "2" => Ok(Self::TwoMonths),
            "3" => Ok(Self::ThreeMonths),
            "4" => Ok(Self::FourMonths),
            "6" => Ok(Self::SixMonths),
            _ => Err(unknown()),
        }
    }
}

/// One recorded anthropometric value. Weight is in kilograms, length in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    pub value: f64,
    pub kind: MeasurementKind,
}

impl Measurement {
    pub fn weight(date: NaiveDate, kilograms: f64) -> Self {
        Self {
            date,
            value: kilograms,
            kind: MeasurementKind::Weight,
        }
    }

    pub fn length(date: NaiveDate, centimeters: f64) -> Self {
        Self {
            date,
            value: centimeters,
            kind: MeasurementKind::Length,
        }
    }
}

/// Inputs for classifying a single increment between two visits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthObservation {
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub previous_date: NaiveDate,
    pub current_date: NaiveDate,
    pub previous_value: f64,
    pub current_value: f64,
    pub kind: MeasurementKind,
}

impl GrowthObservation {
    pub fn between(
        sex: Sex,
        date_of_birth: NaiveDate,
        previous: Measurement,
        current: Measurement,
    ) -> Self {
        Self {
            sex,
            date_of_birth,
            previous_date: previous.date,
            current_date: current.date,
            previous_value: previous.value,
            current_value: current.value,
            kind: current.kind,
        }
    }

    /// Rejects inputs that signal an upstream bug rather than a data-quality gap.
    pub fn validate(&self) -> Result<(), GrowthError> {
        ensure_positive("previous value", self.previous_value)?;
        ensure_positive("current value", self.current_value)?;

        if self.previous_date < self.date_of_birth {
            return Err(GrowthError::DateBeforeBirth {
                date: self.previous_date,
                date_of_birth: self.date_of_birth,
            });
        }

        if self.current_date < self.previous_date {
            return Err(GrowthError::NonChronological {
                previous: self.previous_date,
                current: self.current_date,
            });
        }

        Ok(())
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), GrowthError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GrowthError::NonPositiveValue { field, value })
    }
}

/// Invalid input surfaced to callers; every other condition degrades to `unknown`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrowthError {
    #[error("{field} must be a positive finite number (found {value})")]
    NonPositiveValue { field: &'static str, value: f64 },
    #[error("measurement dated {current} precedes the previous measurement dated {previous}")]
    NonChronological {
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("date {date} precedes the date of birth {date_of_birth}")]
    DateBeforeBirth {
        date: NaiveDate,
        date_of_birth: NaiveDate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_accepts_month_spellings() {
        for value in ["6", "6m", "6mo", "6month", "6 Months", " 6MO "] {
            assert_eq!(
                value.parse::<IntervalBucket>(),
                Ok(IntervalBucket::SixMonths),
                "{value:?}"
            );
        }
        assert_eq!("1month".parse::<IntervalBucket>(), Ok(IntervalBucket::OneMonth));
    }

    #[test]
    fn interval_rejects_other_units() {
        for value in ["6w", "1year", "2d", "3mos6", "mo", "5mo", "12mo", ""] {
            assert!(value.parse::<IntervalBucket>().is_err(), "{value:?}");
        }
    }
}
