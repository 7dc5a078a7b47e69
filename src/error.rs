//! Error types for workload loading, simulation setup and report output

use thiserror::Error;

use crate::process::Pid;

/// Fatal problems with the input; a run is never started when one is raised
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Input file could not be read
    #[error("Failed to read input file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// Input had no configuration line
    #[error("Input file is empty")]
    Empty,

    /// A line had fewer fields than its record requires
    #[error("Line {line}: expected at least {expected} fields, got {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A numeric field did not parse
    #[error("Line {line}: invalid {field}: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// Memory policy was neither `local` nor `global`
    #[error("Line {line}: unknown memory policy {value:?} (expected local or global)")]
    UnknownPolicy { line: usize, value: String },

    /// A field that must be strictly positive was zero
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    /// Allocation percentage outside 0..=100
    #[error("allocation_percentage {0} exceeds 100")]
    AllocationOutOfRange(u32),

    /// Fewer device lines than the configuration announced
    #[error("expected {expected} device lines, found {found}")]
    MissingDevices { expected: usize, found: usize },

    /// Two processes share a pid
    #[error("duplicate pid {0}")]
    DuplicatePid(Pid),

    /// JSON workload did not decode
    #[error("Invalid JSON workload: {0}")]
    InvalidJson(String),

    /// Local quotas need more frames than physical memory holds
    #[error("local policy needs {required} frames for all quotas but only {available} exist")]
    OverSubscribed { required: usize, available: usize },
}

/// Problems while writing a rendered report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write output file {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}
