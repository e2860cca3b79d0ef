use std::fmt;

use serde::Serialize;

/// Errors raised while loading the historical return series
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read historical data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse historical data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("historical data is empty")]
    Empty,

    #[error("historical data failed validation:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// A single rejected request field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in a request, collected before any computation runs
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("invalid request: {}", format_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Errors raised by simulation, solving, and orchestration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    /// Life expectancy minus retirement age leaves no years to simulate
    #[error(
        "retirement age {retirement_age} leaves no years before life expectancy {life_expectancy}"
    )]
    InvalidDuration {
        retirement_age: u32,
        life_expectancy: u32,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A numerical step failed for one sweep point
    #[error("computation failed: {0}")]
    Computation(String),

    /// The sweep was cancelled by request
    #[error("calculation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PlannerError>;
