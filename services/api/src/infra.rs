use chrono::NaiveDate;
use growth_velocity::config::{AppConfig, ReferenceConfig};
use growth_velocity::error::AppError;
use growth_velocity::growth::{GrowthVelocityService, ReferenceTableStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the configured table directory, or the bundled WHO tables when none is set.
pub(crate) fn load_reference_store(
    config: &ReferenceConfig,
) -> Result<Arc<ReferenceTableStore>, AppError> {
    let store = match &config.data_dir {
        Some(dir) => ReferenceTableStore::from_dir(dir)?,
        None => ReferenceTableStore::load_bundled()?,
    };
    Ok(Arc::new(store))
}

pub(crate) fn growth_service(config: &AppConfig) -> Result<GrowthVelocityService, AppError> {
    let store = load_reference_store(&config.reference)?;
    Ok(GrowthVelocityService::new(store, config.evaluation.strategy))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(
            parse_date(" 2024-02-29 "),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date"))
        );
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn falls_back_to_bundled_tables() {
        let store = load_reference_store(&ReferenceConfig::default()).expect("bundled store");
        assert!(store.missing_tables().is_empty());
    }

    #[test]
    fn missing_directory_is_a_reference_error() {
        let config = ReferenceConfig {
            data_dir: Some("/nonexistent/who2006".into()),
        };
        assert!(matches!(
            load_reference_store(&config),
            Err(AppError::Reference(_))
        ));
    }
}
