//! Command-line front end for `retireplan_core`
//!
//! Loads the market history and optional assumption overrides, runs one
//! calculation, and renders the result as pretty JSON.

pub mod cli;
pub mod logging;

use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{WrapErr, eyre};
use serde::Serialize;

use retireplan_core::model::SeriesStatistics;
use retireplan_core::{
    Assumptions, HistoricalSeries, Planner, ReverseRequest, StandardRequest, SweepProgress,
};

pub use cli::{Cli, Command, ReverseArgs, StandardArgs};
pub use logging::init_logging;

/// Read assumption overrides; fields the file leaves out keep their defaults
pub fn load_assumptions(path: &Path) -> color_eyre::Result<Assumptions> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read assumptions from {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let assumptions: Assumptions = if is_json {
        serde_json::from_str(&content).wrap_err("invalid JSON assumptions")?
    } else {
        serde_saphyr::from_str(&content).map_err(|e| eyre!("invalid YAML assumptions: {e}"))?
    };

    assumptions.validate()?;
    tracing::info!(path = %path.display(), "assumptions loaded");
    Ok(assumptions)
}

#[derive(Debug, Serialize)]
struct HistorySummary {
    first_year: i32,
    last_year: i32,
    years: usize,
    equity: SeriesStatistics,
    bonds: SeriesStatistics,
    inflation: SeriesStatistics,
}

fn history_summary(series: &HistoricalSeries) -> HistorySummary {
    let (first_year, last_year) = series.year_range();
    HistorySummary {
        first_year,
        last_year,
        years: series.len(),
        equity: series.equity_statistics(),
        bonds: series.bond_statistics(),
        inflation: series.inflation_statistics(),
    }
}

/// Run `command` against a planner and render the result
pub fn execute(planner: &Planner, command: Command) -> color_eyre::Result<String> {
    let progress = SweepProgress::default();

    let json = match command {
        Command::Calculate(args) => {
            let result = planner.calculate(&StandardRequest::from(args), &progress)?;
            serde_json::to_string_pretty(&result)?
        }
        Command::Allocations(args) => {
            let outcome = planner.analyze_allocations(&StandardRequest::from(args), &progress)?;
            serde_json::to_string_pretty(&outcome)?
        }
        Command::Reverse(args) => {
            let result = planner.reverse(&ReverseRequest::from(args), &progress)?;
            serde_json::to_string_pretty(&result)?
        }
        Command::History => serde_json::to_string_pretty(&history_summary(planner.series()))?,
    };

    tracing::info!(windows = progress.completed(), "command complete");
    Ok(json)
}

/// Load inputs named by `cli` and run its command
pub fn run(cli: Cli) -> color_eyre::Result<String> {
    let series = HistoricalSeries::load(&cli.data)
        .wrap_err_with(|| format!("failed to load market history from {}", cli.data.display()))?;
    let assumptions = match &cli.assumptions {
        Some(path) => load_assumptions(path)?,
        None => Assumptions::default(),
    };

    let planner = Planner::with_assumptions(Arc::new(series), assumptions);
    execute(&planner, cli.command)
}
