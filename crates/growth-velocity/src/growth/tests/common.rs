use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::growth::{
    growth_router, GrowthObservation, GrowthStatusEvaluator, GrowthVelocityService, Measurement,
    ReferenceTableStore, Sex, StrategyKind,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn bundled_store() -> Arc<ReferenceTableStore> {
    static STORE: OnceLock<Arc<ReferenceTableStore>> = OnceLock::new();
    STORE
        .get_or_init(|| Arc::new(ReferenceTableStore::load_bundled().expect("bundled tables load")))
        .clone()
}

/// Store holding only the girls' 2-month length table.
pub(super) fn partial_store() -> Arc<ReferenceTableStore> {
    let store = ReferenceTableStore::from_sources([(
        "length_female_2mo",
        Cursor::new("window,p5,p50,p95\n0-2m,6.2,8.0,10.0\n"),
    )])
    .expect("partial store builds");
    Arc::new(store)
}

pub(super) fn evaluator() -> GrowthStatusEvaluator {
    GrowthStatusEvaluator::new(bundled_store())
}

pub(super) fn service(strategy: StrategyKind) -> GrowthVelocityService {
    GrowthVelocityService::new(bundled_store(), strategy)
}

pub(super) fn router() -> axum::Router {
    growth_router(Arc::new(service(StrategyKind::PercentileWindow)))
}

pub(super) fn birth_date() -> NaiveDate {
    date(2024, 1, 1)
}

pub(super) fn weight_observation(
    sex: Sex,
    previous: (NaiveDate, f64),
    current: (NaiveDate, f64),
) -> GrowthObservation {
    GrowthObservation::between(
        sex,
        birth_date(),
        Measurement::weight(previous.0, previous.1),
        Measurement::weight(current.0, current.1),
    )
}

pub(super) fn length_observation(
    sex: Sex,
    previous: (NaiveDate, f64),
    current: (NaiveDate, f64),
) -> GrowthObservation {
    GrowthObservation::between(
        sex,
        birth_date(),
        Measurement::length(previous.0, previous.1),
        Measurement::length(current.0, current.1),
    )
}

/// Scenario used across the suite: a boy gaining 900 g over his first 31 days.
pub(super) fn first_month_gain() -> GrowthObservation {
    weight_observation(
        Sex::Male,
        (date(2024, 1, 1), 3.2),
        (date(2024, 2, 1), 4.1),
    )
}

pub(super) fn observation_json(observation: &GrowthObservation) -> Value {
    serde_json::to_value(observation).expect("observation serializes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
