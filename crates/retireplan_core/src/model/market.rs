//! Historical annual market data
//!
//! A [`HistoricalSeries`] is loaded once at startup, validated, and then shared
//! read-only (typically behind an `Arc`) by every simulation and sweep.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::DataLoadError;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;
const MIN_RETURN: f64 = -1.0;
const MAX_RETURN: f64 = 2.0;
const MIN_INFLATION: f64 = -0.5;
const MAX_INFLATION: f64 = 0.5;

/// One calendar year of market data, all values as fractions (0.07 = 7%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketYear {
    pub year: i32,
    #[serde(rename = "sp500Return", alias = "equityReturn")]
    pub equity_return: f64,
    pub bond_return: f64,
    pub inflation: f64,
}

impl MarketYear {
    /// Portfolio return for the given stock share; the rest is in bonds
    #[must_use]
    pub fn blended_return(&self, stock_allocation: f64) -> f64 {
        stock_allocation * self.equity_return + (1.0 - stock_allocation) * self.bond_return
    }

    fn violations(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            errors.push(format!("year outside [{MIN_YEAR}, {MAX_YEAR}]"));
        }
        if !(MIN_RETURN..=MAX_RETURN).contains(&self.equity_return) {
            errors.push(format!(
                "equity return {} outside [{MIN_RETURN}, {MAX_RETURN}]",
                self.equity_return
            ));
        }
        if !(MIN_RETURN..=MAX_RETURN).contains(&self.bond_return) {
            errors.push(format!(
                "bond return {} outside [{MIN_RETURN}, {MAX_RETURN}]",
                self.bond_return
            ));
        }
        if !(MIN_INFLATION..=MAX_INFLATION).contains(&self.inflation) {
            errors.push(format!(
                "inflation {} outside [{MIN_INFLATION}, {MAX_INFLATION}]",
                self.inflation
            ));
        }
        errors
    }
}

/// Summary statistics over one column of the series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub arithmetic_mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub years: usize,
}

/// Validated, year-ordered historical series with O(1) year lookup
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    years: Vec<MarketYear>,
    index: FxHashMap<i32, usize>,
    min_year: i32,
    max_year: i32,
}

impl HistoricalSeries {
    /// Sort and validate the given years.
    ///
    /// Every out-of-range field of every year, and every repeated year, is
    /// reported in a single [`DataLoadError::Invalid`].
    pub fn new(mut years: Vec<MarketYear>) -> Result<Self, DataLoadError> {
        if years.is_empty() {
            return Err(DataLoadError::Empty);
        }

        years.sort_by_key(|y| y.year);

        let mut problems: Vec<String> = years
            .iter()
            .filter_map(|y| {
                let errors = y.violations();
                (!errors.is_empty()).then(|| format!("Year {}: {}", y.year, errors.join(", ")))
            })
            .collect();

        let mut duplicates: Vec<i32> = years
            .windows(2)
            .filter(|w| w[0].year == w[1].year)
            .map(|w| w[0].year)
            .collect();
        duplicates.dedup();
        problems.extend(
            duplicates
                .iter()
                .map(|year| format!("Year {year}: appears more than once")),
        );

        if !problems.is_empty() {
            tracing::error!(
                count = problems.len(),
                ?duplicates,
                "historical data failed validation"
            );
            return Err(DataLoadError::Invalid(problems));
        }

        let index = years
            .iter()
            .enumerate()
            .map(|(i, y)| (y.year, i))
            .collect();
        let min_year = years[0].year;
        let max_year = years[years.len() - 1].year;

        Ok(Self {
            years,
            index,
            min_year,
            max_year,
        })
    }

    /// Parse a JSON array of market years
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let years: Vec<MarketYear> = serde_json::from_reader(reader)?;
        Self::new(years)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataLoadError> {
        let years: Vec<MarketYear> = serde_json::from_str(json)?;
        Self::new(years)
    }

    /// Load and validate a JSON data file
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        tracing::info!(path = %path.display(), "loading historical data");
        let file = std::fs::File::open(path)?;
        let series = Self::from_json_reader(std::io::BufReader::new(file))?;
        tracing::info!(
            years = series.len(),
            min_year = series.min_year,
            max_year = series.max_year,
            "historical data loaded"
        );
        Ok(series)
    }

    #[must_use]
    pub fn get_year(&self, year: i32) -> Option<&MarketYear> {
        self.index.get(&year).map(|&i| &self.years[i])
    }

    /// Inclusive (min, max) year range
    #[must_use]
    pub fn year_range(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }

    #[must_use]
    pub fn years(&self) -> &[MarketYear] {
        &self.years
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Number of complete rolling windows of `duration_years` in the series
    #[must_use]
    pub fn scenario_count(&self, duration_years: u32) -> usize {
        let count = i64::from(self.max_year) - i64::from(self.min_year) - i64::from(duration_years)
            + 1;
        usize::try_from(count.max(0)).unwrap_or(0)
    }

    /// Mean and population standard deviation of equity returns
    #[must_use]
    pub fn equity_statistics(&self) -> SeriesStatistics {
        column_statistics(self.years.iter().map(|y| y.equity_return))
    }

    #[must_use]
    pub fn bond_statistics(&self) -> SeriesStatistics {
        column_statistics(self.years.iter().map(|y| y.bond_return))
    }

    #[must_use]
    pub fn inflation_statistics(&self) -> SeriesStatistics {
        column_statistics(self.years.iter().map(|y| y.inflation))
    }
}

fn column_statistics(values: impl Iterator<Item = f64> + Clone) -> SeriesStatistics {
    let n = values.clone().count();
    if n == 0 {
        return SeriesStatistics {
            arithmetic_mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            years: 0,
        };
    }
    let arithmetic_mean = values.clone().sum::<f64>() / n as f64;
    let variance = values
        .clone()
        .map(|v| (v - arithmetic_mean).powi(2))
        .sum::<f64>()
        / n as f64;
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);

    SeriesStatistics {
        arithmetic_mean,
        std_dev: variance.sqrt(),
        min,
        max,
        years: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(year: i32, equity: f64, bond: f64, inflation: f64) -> MarketYear {
        MarketYear {
            year,
            equity_return: equity,
            bond_return: bond,
            inflation,
        }
    }

    #[test]
    fn test_series_sorted_and_indexed() {
        let series = HistoricalSeries::new(vec![
            year(1930, -0.25, 0.04, -0.02),
            year(1928, 0.43, 0.01, 0.0),
            year(1929, -0.08, 0.04, 0.0),
        ])
        .unwrap();

        assert_eq!(series.year_range(), (1928, 1930));
        assert_eq!(series.years()[0].year, 1928);
        assert_eq!(series.get_year(1929).unwrap().equity_return, -0.08);
        assert!(series.get_year(1927).is_none());
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            HistoricalSeries::new(vec![]),
            Err(DataLoadError::Empty)
        ));
    }

    #[test]
    fn test_duplicate_years_rejected() {
        let err = HistoricalSeries::new(vec![
            year(1950, 0.1, 0.02, 0.01),
            year(1950, 0.2, 0.02, 0.01),
            year(1951, 0.1, 0.02, 0.01),
        ])
        .unwrap_err();
        let DataLoadError::Invalid(problems) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(problems, vec!["Year 1950: appears more than once".to_string()]);
    }

    #[test]
    fn test_duplicates_reported_with_range_violations() {
        let err = HistoricalSeries::new(vec![
            year(1950, 0.1, 0.02, 0.01),
            year(1950, 0.2, 0.02, 0.01),
            year(1951, 5.0, 0.02, 0.01),
        ])
        .unwrap_err();
        let DataLoadError::Invalid(problems) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("Year 1951: equity return 5"));
        assert_eq!(problems[1], "Year 1950: appears more than once");
    }

    #[test]
    fn test_all_violations_reported() {
        let err = HistoricalSeries::new(vec![
            year(1899, 0.1, 0.02, 0.01),
            year(1950, 2.5, -1.5, 0.01),
            year(1951, 0.1, 0.02, 0.9),
        ])
        .unwrap_err();
        let DataLoadError::Invalid(problems) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("Year 1899"));
        assert!(problems[1].contains("equity return"));
        assert!(problems[1].contains("bond return"));
        assert!(problems[2].contains("inflation"));
    }

    #[test]
    fn test_json_field_names() {
        let json = r#"[
            {"year": 2000, "sp500Return": -0.091, "bondReturn": 0.166, "inflation": 0.034},
            {"year": 2001, "equityReturn": -0.119, "bondReturn": 0.056, "inflation": 0.028}
        ]"#;
        let series = HistoricalSeries::from_json_str(json).unwrap();
        assert_eq!(series.get_year(2000).unwrap().equity_return, -0.091);
        assert_eq!(series.get_year(2001).unwrap().equity_return, -0.119);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            HistoricalSeries::from_json_str("{not json"),
            Err(DataLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HistoricalSeries::load(Path::new("/nonexistent/market.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    #[test]
    fn test_scenario_count() {
        let years = (1928..=2023).map(|y| year(y, 0.07, 0.03, 0.02)).collect();
        let series = HistoricalSeries::new(years).unwrap();
        assert_eq!(series.scenario_count(30), 66);
        assert_eq!(series.scenario_count(95), 1);
        assert_eq!(series.scenario_count(96), 0);
        assert_eq!(series.scenario_count(200), 0);
    }

    #[test]
    fn test_blended_return() {
        let y = year(1990, 0.10, 0.02, 0.03);
        assert!((y.blended_return(0.6) - 0.068).abs() < 1e-12);
        assert!((y.blended_return(1.0) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_statistics() {
        let series = HistoricalSeries::new(vec![
            year(2000, 0.10, 0.02, 0.01),
            year(2001, -0.10, 0.04, 0.03),
        ])
        .unwrap();
        let stats = series.equity_statistics();
        assert!(stats.arithmetic_mean.abs() < 1e-12);
        assert!((stats.std_dev - 0.10).abs() < 1e-12);
        assert_eq!(stats.min, -0.10);
        assert_eq!(stats.max, 0.10);
        assert_eq!(stats.years, 2);
    }
}
