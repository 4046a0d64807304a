use super::domain::{
    ensure_positive, GrowthError, GrowthObservation, Measurement, MeasurementKind, Sex,
};
use super::evaluation::{EvaluationStrategy, GrowthStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Child attributes the evaluation needs, plus the optional birth record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    /// Kilograms.
    #[serde(default)]
    pub birth_weight: Option<f64>,
    /// Centimeters.
    #[serde(default)]
    pub birth_length: Option<f64>,
}

impl ChildProfile {
    pub fn new(sex: Sex, date_of_birth: NaiveDate) -> Self {
        Self {
            sex,
            date_of_birth,
            birth_weight: None,
            birth_length: None,
        }
    }

    pub fn with_birth_record(mut self, weight: Option<f64>, length: Option<f64>) -> Self {
        self.birth_weight = weight;
        self.birth_length = length;
        self
    }

    /// Birth measurement for `kind`, dated at the date of birth.
    pub fn birth_measurement(&self, kind: MeasurementKind) -> Option<Measurement> {
        let value = match kind {
            MeasurementKind::Weight => self.birth_weight,
            MeasurementKind::Length => self.birth_length,
        }?;
        Some(Measurement {
            date: self.date_of_birth,
            value,
            kind,
        })
    }

    fn validate(&self) -> Result<(), GrowthError> {
        if let Some(weight) = self.birth_weight {
            ensure_positive("birth weight", weight)?;
        }
        if let Some(length) = self.birth_length {
            ensure_positive("birth length", length)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub measurement: Measurement,
    /// Measurement the increment was taken from; `None` when nothing precedes it.
    pub previous: Option<Measurement>,
    pub status: Option<GrowthStatus>,
}

/// Most recent status per measurement type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChildGrowthSummary {
    pub latest_weight: Option<GrowthStatus>,
    pub latest_length: Option<GrowthStatus>,
    pub at_risk: bool,
}

impl ChildGrowthSummary {
    fn record(&mut self, status: &GrowthStatus) {
        match status.kind {
            MeasurementKind::Weight => self.latest_weight = Some(status.clone()),
            MeasurementKind::Length => self.latest_length = Some(status.clone()),
        }
        self.at_risk = [&self.latest_weight, &self.latest_length]
            .into_iter()
            .flatten()
            .any(|latest| latest.status.is_at_risk());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSeries {
    pub entries: Vec<SeriesEntry>,
    pub summary: ChildGrowthSummary,
}

/// Evaluates every measurement against the last earlier one of the same type.
///
/// Weight and length are tracked independently and must each be listed in chronological
/// order. The first measurement of a type is compared with the birth record when the profile
/// carries one.
pub fn evaluate_series(
    strategy: &EvaluationStrategy,
    child: &ChildProfile,
    measurements: &[Measurement],
) -> Result<GrowthSeries, GrowthError> {
    child.validate()?;

    let mut last_weight = child.birth_measurement(MeasurementKind::Weight);
    let mut last_length = child.birth_measurement(MeasurementKind::Length);
    let mut entries = Vec::with_capacity(measurements.len());
    let mut summary = ChildGrowthSummary::default();

    for measurement in measurements {
        ensure_positive("measurement value", measurement.value)?;
        if measurement.date < child.date_of_birth {
            return Err(GrowthError::DateBeforeBirth {
                date: measurement.date,
                date_of_birth: child.date_of_birth,
            });
        }

        let last = match measurement.kind {
            MeasurementKind::Weight => &mut last_weight,
            MeasurementKind::Length => &mut last_length,
        };

        let status = match *last {
            Some(previous) => {
                let observation =
                    GrowthObservation::between(child.sex, child.date_of_birth, previous, *measurement);
                let status = strategy.evaluate(&observation)?;
                summary.record(&status);
                Some(status)
            }
            None => {
                debug!(
                    kind = measurement.kind.key(),
                    date = %measurement.date,
                    "no earlier measurement; skipping evaluation"
                );
                None
            }
        };

        entries.push(SeriesEntry {
            measurement: *measurement,
            previous: *last,
            status,
        });
        *last = Some(*measurement);
    }

    Ok(GrowthSeries { entries, summary })
}
