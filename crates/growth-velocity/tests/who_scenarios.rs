use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use growth_velocity::growth::{
    EvaluationStrategy, GrowthObservation, GrowthStatusEvaluator, IntervalBucket, Measurement,
    ReferenceTableStore, Sex, StrategyKind, UnknownReason, VelocityStatus,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn evaluator() -> GrowthStatusEvaluator {
    GrowthStatusEvaluator::new(Arc::new(
        ReferenceTableStore::load_bundled().expect("bundled tables load"),
    ))
}

fn weight(sex: Sex, previous: (NaiveDate, f64), current: (NaiveDate, f64)) -> GrowthObservation {
    GrowthObservation::between(
        sex,
        date(2024, 1, 1),
        Measurement::weight(previous.0, previous.1),
        Measurement::weight(current.0, current.1),
    )
}

#[test]
fn newborn_boy_gaining_900_grams_in_first_month() {
    let status = evaluator()
        .evaluate(&weight(
            Sex::Male,
            (date(2024, 1, 1), 3.2),
            (date(2024, 2, 1), 4.1),
        ))
        .expect("valid observation");

    assert_eq!(status.status, VelocityStatus::Adequate);
    assert_eq!(status.interval_used, Some(IntervalBucket::OneMonth));
    assert_eq!(status.age_window.as_deref(), Some("0-4w"));
    assert_eq!(status.actual_increment, 900.0);
    assert_eq!((status.lower_bound, status.upper_bound), (Some(460.0), Some(1509.0)));
}

#[test]
fn fifty_grams_at_six_months_is_adequate() {
    let status = evaluator()
        .evaluate(&weight(
            Sex::Male,
            (date(2024, 7, 1), 7.0),
            (date(2024, 8, 1), 7.05),
        ))
        .expect("valid observation");

    assert_eq!(status.age_window.as_deref(), Some("6-7mo"));
    assert_eq!(status.actual_increment, 50.0);
    assert_eq!(status.status, VelocityStatus::Adequate);
}

#[test]
fn one_month_length_has_no_standard() {
    let observation = GrowthObservation::between(
        Sex::Female,
        date(2024, 1, 1),
        Measurement::length(date(2024, 1, 1), 49.5),
        Measurement::length(date(2024, 1, 26), 52.0),
    );
    let status = evaluator().evaluate(&observation).expect("valid observation");

    assert_eq!(status.status, VelocityStatus::Unknown);
    assert_eq!(
        status.unknown_reason,
        Some(UnknownReason::UnsupportedCombination)
    );
}

#[test]
fn gap_between_four_and_six_month_intervals_is_irregular() {
    for days in [138, 145, 149] {
        let start = date(2024, 1, 1);
        let status = evaluator()
            .evaluate(&weight(Sex::Female, (start, 3.1), (start + Duration::days(days), 6.5)))
            .expect("valid observation");

        assert_eq!(status.status, VelocityStatus::Unknown, "{days} days");
        assert_eq!(status.unknown_reason, Some(UnknownReason::IntervalOutOfRange));
    }
}

#[test]
fn gain_below_fifth_percentile_is_flagged() {
    let status = evaluator()
        .evaluate(&weight(
            Sex::Female,
            (date(2024, 3, 1), 5.6),
            (date(2024, 4, 1), 5.75),
        ))
        .expect("valid observation");

    assert_eq!(status.age_window.as_deref(), Some("2-3mo"));
    assert_eq!(status.status, VelocityStatus::Inadequate);
    assert!(status.message.contains("weight faltering"));
}

#[test]
fn strategies_agree_on_the_result_contract() {
    let store = Arc::new(ReferenceTableStore::load_bundled().expect("bundled tables load"));
    let observation = weight(Sex::Male, (date(2024, 1, 1), 3.2), (date(2024, 2, 1), 4.1));

    for kind in [StrategyKind::PercentileWindow, StrategyKind::FixedMonthly] {
        let strategy = EvaluationStrategy::for_kind(kind, store.clone());
        let status = strategy.evaluate(&observation).expect("valid observation");
        assert_eq!(status.actual_increment, 900.0, "{kind}");
        assert_eq!(status.status, VelocityStatus::Adequate, "{kind}");
        assert!(status.lower_bound.is_some(), "{kind}");
    }
}

#[test]
fn repeated_evaluation_is_identical_across_stores() {
    let observation = weight(Sex::Male, (date(2024, 5, 1), 6.4), (date(2024, 7, 1), 7.6));
    let first = evaluator().evaluate(&observation).expect("valid observation");
    let second = evaluator().evaluate(&observation).expect("valid observation");

    assert_eq!(first, second);
    assert_eq!(first.interval_used, Some(IntervalBucket::TwoMonths));
    assert_eq!(first.age_window.as_deref(), Some("4-6mo"));
}
