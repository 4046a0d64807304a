use crate::infra::{growth_service, load_reference_store, parse_date};
use chrono::NaiveDate;
use clap::Args;
use growth_velocity::config::{AppConfig, ReferenceConfig};
use growth_velocity::error::AppError;
use growth_velocity::growth::{
    GrowthObservation, GrowthStatus, IntervalBucket, MeasurementKind, ReferenceTableStore,
    ReferenceTableView, Sex, StrategyKind, TableKey,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Sex of the child (male or female)
    #[arg(long)]
    pub(crate) sex: Sex,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) dob: NaiveDate,
    /// Date of the earlier measurement (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) previous_date: NaiveDate,
    /// Earlier value in kg (weight) or cm (length)
    #[arg(long)]
    pub(crate) previous_value: f64,
    /// Date of the later measurement (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) current_date: NaiveDate,
    /// Later value in kg (weight) or cm (length)
    #[arg(long)]
    pub(crate) current_value: f64,
    /// Measurement type (weight or length)
    #[arg(long)]
    pub(crate) kind: MeasurementKind,
    /// Evaluation strategy; defaults to GROWTH_STRATEGY
    #[arg(long)]
    pub(crate) strategy: Option<StrategyKind>,
    /// Print the full status as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReferenceShowArgs {
    #[arg(long)]
    pub(crate) kind: MeasurementKind,
    #[arg(long)]
    pub(crate) sex: Sex,
    /// Interval bucket (1mo, 2mo, 3mo, 4mo or 6mo)
    #[arg(long)]
    pub(crate) interval: IntervalBucket,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReferenceValidateArgs {
    /// Directory of `{kind}_{sex}_{interval}.csv` files; defaults to GROWTH_REFERENCE_DIR,
    /// then the bundled tables
    #[arg(long)]
    pub(crate) dir: Option<PathBuf>,
    /// Print the validation report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs, config: &AppConfig) -> Result<(), AppError> {
    let service = growth_service(config)?;

    let observation = GrowthObservation {
        sex: args.sex,
        date_of_birth: args.dob,
        previous_date: args.previous_date,
        current_date: args.current_date,
        previous_value: args.previous_value,
        current_value: args.current_value,
        kind: args.kind,
    };
    let strategy = args.strategy.unwrap_or(service.default_strategy());
    let status = service.strategy(Some(strategy)).evaluate(&observation)?;

    if args.json {
        print_json(&status);
    } else {
        render_status(&observation, strategy, &status);
    }
    Ok(())
}

pub(crate) fn run_reference_show(
    args: ReferenceShowArgs,
    config: &AppConfig,
) -> Result<(), AppError> {
    let service = growth_service(config)?;
    let view = service.reference_table(args.kind, args.sex, args.interval)?;
    render_table(&view);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    source: String,
    provisional: bool,
    tables: Vec<TableSummary>,
    missing: Vec<TableKey>,
}

#[derive(Debug, Serialize)]
struct TableSummary {
    table: TableKey,
    rows: usize,
    first_window: Option<String>,
    last_window: Option<String>,
}

pub(crate) fn run_reference_validate(
    args: ReferenceValidateArgs,
    config: &AppConfig,
) -> Result<(), AppError> {
    let dir = args.dir.or_else(|| config.reference.data_dir.clone());
    let store = load_reference_store(&ReferenceConfig { data_dir: dir })?;
    let report = validation_report(&store);

    if args.json {
        print_json(&report);
    } else {
        render_validation(&report);
    }
    Ok(())
}

fn validation_report(store: &ReferenceTableStore) -> ValidationReport {
    let tables = store
        .tables()
        .into_iter()
        .map(|table| TableSummary {
            table: table.key(),
            rows: table.len(),
            first_window: table.rows().next().map(|(window, _)| window.canonical()),
            last_window: table.rows().last().map(|(window, _)| window.canonical()),
        })
        .collect();

    ValidationReport {
        source: store.origin().to_string(),
        provisional: store.origin().is_provisional(),
        tables,
        missing: store.missing_tables(),
    }
}

fn render_status(observation: &GrowthObservation, strategy: StrategyKind, status: &GrowthStatus) {
    println!("Growth velocity evaluation ({strategy})");
    println!(
        "  Child: {}, born {}, {} months old",
        observation.sex.label(),
        observation.date_of_birth,
        status.age_months
    );
    match status.interval_used {
        Some(bucket) => println!("  Interval: {} days -> {}", status.elapsed_days, bucket),
        None => println!("  Interval: {} days", status.elapsed_days),
    }
    println!(
        "  Increment: {}",
        format_increment(status.actual_increment, status.increment_unit)
    );

    let bounds = [status.lower_bound, status.median, status.upper_bound];
    if bounds.iter().any(Option::is_some) {
        let describe = |value: Option<f64>| {
            value
                .map(|value| format_increment(value, status.increment_unit))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "  Band: low {} | median {} | high {}{}",
            describe(status.lower_bound),
            describe(status.median),
            describe(status.upper_bound),
            status
                .age_window
                .as_deref()
                .map(|window| format!(" (window {window})"))
                .unwrap_or_default()
        );
    }

    println!("  Status: {}", status.status.label());
    if let Some(reason) = status.unknown_reason {
        println!("  Reason: {}", reason.label());
    }
    println!("  {}", status.message);
}

fn render_table(view: &ReferenceTableView) {
    println!(
        "WHO 2006 {} {} increments, {} interval ({})",
        view.sex.label(),
        view.kind.key(),
        view.interval,
        view.unit
    );
    println!("  {:<10} {:>8} {:>8} {:>8}", "window", "p5", "p50", "p95");
    for row in &view.rows {
        println!(
            "  {:<10} {:>8} {:>8} {:>8}",
            row.window, row.p5, row.p50, row.p95
        );
    }
}

fn render_validation(report: &ValidationReport) {
    println!("Reference tables from {}", report.source);
    for summary in &report.tables {
        println!(
            "  {:<20} {:>3} rows  {} .. {}",
            summary.table.to_string(),
            summary.rows,
            summary.first_window.as_deref().unwrap_or("-"),
            summary.last_window.as_deref().unwrap_or("-")
        );
    }
    if report.provisional {
        println!("Bundled values are provisional; supply the published WHO tables with --dir.");
    }
    if report.missing.is_empty() {
        println!("All published tables present.");
    } else {
        println!("Missing tables (evaluations degrade to unknown):");
        for key in &report.missing {
            println!("  - {key}");
        }
    }
}

fn format_increment(value: f64, unit: &str) -> String {
    if unit == "g" {
        format!("{value:.0} {unit}")
    } else {
        format!("{value:.1} {unit}")
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("failed to render JSON output: {err}"),
    }
}
