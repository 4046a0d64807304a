use super::domain::{GrowthError, IntervalBucket, MeasurementKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Outcome of mapping the elapsed time between two visits onto a reference interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "interval", rename_all = "snake_case")]
pub enum BucketDecision {
    Standard(IntervalBucket),
    /// Elapsed days fall outside every bucket, including the 138-149 day gap.
    Irregular,
    /// The bucket exists but WHO publishes no standard for this measurement over it.
    NotApplicable(IntervalBucket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalClassification {
    pub elapsed_days: i64,
    pub decision: BucketDecision,
}

impl IntervalClassification {
    pub fn bucket(&self) -> Option<IntervalBucket> {
        match self.decision {
            BucketDecision::Standard(bucket) => Some(bucket),
            BucketDecision::Irregular | BucketDecision::NotApplicable(_) => None,
        }
    }
}

impl fmt::Display for IntervalClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decision {
            BucketDecision::Standard(bucket) => {
                write!(f, "{} days -> {} interval", self.elapsed_days, bucket)
            }
            BucketDecision::Irregular => write!(
                f,
                "{} days -> irregular (outside {})",
                self.elapsed_days,
                bucket_ranges()
            ),
            BucketDecision::NotApplicable(bucket) => write!(
                f,
                "{} days -> {} interval (no standard for this measurement)",
                self.elapsed_days, bucket
            ),
        }
    }
}

/// Ordered lookup labels for one age window: the primary label first, then the
/// historical spellings older tables were authored with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeWindowKey {
    pub primary: String,
    pub fallbacks: Vec<String>,
}

impl AgeWindowKey {
    fn with_variants(primary: String) -> Self {
        let mut fallbacks: Vec<String> = Vec::new();
        let compact: String = primary.chars().filter(|c| !c.is_whitespace()).collect();
        let short_unit = compact.replace("mo", "m");

        for variant in [compact, short_unit] {
            if variant != primary && !fallbacks.contains(&variant) {
                fallbacks.push(variant);
            }
        }

        Self { primary, fallbacks }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

pub struct IntervalClassifier;

impl IntervalClassifier {
    /// Maps elapsed days onto a bucket using half-open ranges; `None` means irregular.
    pub fn bucket_for_days(elapsed_days: i64) -> Option<IntervalBucket> {
        IntervalBucket::ordered().into_iter().find(|bucket| {
            let (start, end) = bucket.day_range();
            elapsed_days >= start && elapsed_days < end
        })
    }

    /// Buckets the interval between two measurement dates, independent of measurement type.
    pub fn classify(
        previous: NaiveDate,
        current: NaiveDate,
    ) -> Result<IntervalClassification, GrowthError> {
        if current < previous {
            return Err(GrowthError::NonChronological { previous, current });
        }

        let elapsed_days = (current - previous).num_days();
        let decision = match Self::bucket_for_days(elapsed_days) {
            Some(bucket) => BucketDecision::Standard(bucket),
            None => BucketDecision::Irregular,
        };

        Ok(IntervalClassification {
            elapsed_days,
            decision,
        })
    }

    /// Like [`IntervalClassifier::classify`], but marks combinations without a WHO standard
    /// (length over one month) as not applicable.
    pub fn classify_for(
        previous: NaiveDate,
        current: NaiveDate,
        kind: MeasurementKind,
    ) -> Result<IntervalClassification, GrowthError> {
        let mut classification = Self::classify(previous, current)?;

        if let BucketDecision::Standard(IntervalBucket::OneMonth) = classification.decision {
            if kind == MeasurementKind::Length {
                classification.decision = BucketDecision::NotApplicable(IntervalBucket::OneMonth);
            }
        }

        debug!(
            kind = kind.key(),
            elapsed_days = classification.elapsed_days,
            decision = ?classification.decision,
            "classified measurement interval"
        );

        Ok(classification)
    }

    /// Label of the age window anchored at the start of the interval.
    pub fn age_window_key(
        age_months_at_previous: u32,
        bucket: IntervalBucket,
        elapsed_days: i64,
    ) -> AgeWindowKey {
        let primary = match (bucket, age_months_at_previous) {
            (IntervalBucket::OneMonth, 0) => "0-4w".to_string(),
            (IntervalBucket::OneMonth, 1) if elapsed_days < 45 => "4w-2mo".to_string(),
            (bucket, start) => format!("{}-{}mo", start, start + bucket.months()),
        };

        AgeWindowKey::with_variants(primary)
    }
}

fn bucket_ranges() -> String {
    IntervalBucket::ordered()
        .into_iter()
        .map(|bucket| {
            let (start, end) = bucket.day_range();
            format!("{bucket} [{start},{end})")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn buckets_partition_elapsed_days() {
        for days in 0..400 {
            let expected = match days {
                20..=47 => Some(IntervalBucket::OneMonth),
                48..=77 => Some(IntervalBucket::TwoMonths),
                78..=107 => Some(IntervalBucket::ThreeMonths),
                108..=137 => Some(IntervalBucket::FourMonths),
                150..=209 => Some(IntervalBucket::SixMonths),
                _ => None,
            };
            assert_eq!(
                IntervalClassifier::bucket_for_days(days),
                expected,
                "unexpected bucket for {days} days"
            );
        }
    }

    #[test]
    fn buckets_never_overlap() {
        for days in 0..400 {
            let matching = IntervalBucket::ordered()
                .into_iter()
                .filter(|bucket| {
                    let (start, end) = bucket.day_range();
                    days >= start && days < end
                })
                .count();
            assert!(matching <= 1, "{days} days matched {matching} buckets");
        }
    }

    #[test]
    fn nominal_lengths_fall_inside_their_bucket() {
        for bucket in IntervalBucket::ordered() {
            assert_eq!(
                IntervalClassifier::bucket_for_days(bucket.nominal_days()),
                Some(bucket)
            );
        }
    }

    #[test]
    fn gap_between_four_and_six_months_is_irregular() {
        let start = date(2024, 1, 1);
        let classification =
            IntervalClassifier::classify(start, start + chrono::Duration::days(145))
                .expect("classifies");
        assert_eq!(classification.elapsed_days, 145);
        assert_eq!(classification.decision, BucketDecision::Irregular);
        assert!(classification.to_string().contains("irregular"));
    }

    #[test]
    fn length_over_one_month_is_not_applicable() {
        let weight = IntervalClassifier::classify_for(
            date(2024, 1, 1),
            date(2024, 1, 26),
            MeasurementKind::Weight,
        )
        .expect("classifies");
        assert_eq!(weight.decision, BucketDecision::Standard(IntervalBucket::OneMonth));

        let length = IntervalClassifier::classify_for(
            date(2024, 1, 1),
            date(2024, 1, 26),
            MeasurementKind::Length,
        )
        .expect("classifies");
        assert_eq!(
            length.decision,
            BucketDecision::NotApplicable(IntervalBucket::OneMonth)
        );
        assert_eq!(length.bucket(), None);
    }

    #[test]
    fn rejects_reversed_dates() {
        let error = IntervalClassifier::classify(date(2024, 2, 1), date(2024, 1, 1))
            .expect_err("reversed dates");
        assert!(matches!(error, GrowthError::NonChronological { .. }));
    }

    #[test]
    fn first_month_windows_use_week_labels() {
        let newborn = IntervalClassifier::age_window_key(0, IntervalBucket::OneMonth, 31);
        assert_eq!(newborn.primary, "0-4w");
        assert!(newborn.fallbacks.is_empty());

        let second_month = IntervalClassifier::age_window_key(1, IntervalBucket::OneMonth, 30);
        assert_eq!(second_month.primary, "4w-2mo");
        assert_eq!(second_month.fallbacks, vec!["4w-2m".to_string()]);

        let late_second_month = IntervalClassifier::age_window_key(1, IntervalBucket::OneMonth, 46);
        assert_eq!(late_second_month.primary, "1-2mo");
    }

    #[test]
    fn week_label_switches_off_at_forty_five_days() {
        let early = IntervalClassifier::age_window_key(1, IntervalBucket::OneMonth, 44);
        assert_eq!(early.primary, "4w-2mo");

        let late = IntervalClassifier::age_window_key(1, IntervalBucket::OneMonth, 45);
        assert_eq!(late.primary, "1-2mo");
    }

    #[test]
    fn multi_month_windows_start_at_age_of_previous_visit() {
        let key = IntervalClassifier::age_window_key(0, IntervalBucket::TwoMonths, 61);
        assert_eq!(key.primary, "0-2mo");

        let key = IntervalClassifier::age_window_key(6, IntervalBucket::OneMonth, 31);
        assert_eq!(
            key.candidates().collect::<Vec<_>>(),
            vec!["6-7mo", "6-7m"]
        );

        let key = IntervalClassifier::age_window_key(12, IntervalBucket::SixMonths, 183);
        assert_eq!(key.primary, "12-18mo");
    }
}
