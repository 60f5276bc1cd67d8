//! Typed errors for the three narrow external interfaces (Skim, config, simulation
//! invariants), following the teacher's boundary-module pattern: plain `#[derive(Debug)]`
//! enums with manual `From` impls and a minimal `Display`, not `thiserror`/`anyhow`.

use std::fmt;

use crate::ids::Node;

/// Errors surfaced by [`crate::skim::Skim`] (§4.1, §7).
#[derive(Debug)]
pub enum SkimError {
    /// A node referenced by a request/vehicle or sequence is absent from the skim.
    UnknownNode(Node),
    /// `path()` was requested from a skim with no backing road graph.
    UnsupportedSkim,
}

impl fmt::Display for SkimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkimError::UnknownNode(node) => write!(f, "unknown node {node:?} in skim"),
            SkimError::UnsupportedSkim => {
                write!(f, "path() requested from a non-graph-backed skim")
            }
        }
    }
}

impl std::error::Error for SkimError {}

/// Fatal errors while loading `simulation_config`/`city_config`/`behavioural_config`/
/// `fares_config` or the requests/vehicles tables (§6, §7 `ConfigInvalid`).
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    MissingKey(&'static str),
    InvalidNode(Node),
    InvalidTimestamp(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "io error: {e}"),
            ConfigError::Json(e) => write!(f, "invalid json: {e}"),
            ConfigError::Csv(e) => write!(f, "invalid csv: {e}"),
            ConfigError::MissingKey(key) => write!(f, "missing config key: {key}"),
            ConfigError::InvalidNode(node) => write!(f, "node {node:?} not present in skim"),
            ConfigError::InvalidTimestamp(raw) => write!(f, "invalid timestamp: {raw}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<csv::Error> for ConfigError {
    fn from(e: csv::Error) -> Self {
        ConfigError::Csv(e)
    }
}

/// Errors writing the persisted text-table reports (§6.3, C8).
#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "io error writing report: {e}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

/// A broken internal invariant (§7 `InvariantViolation`). Always a programming error;
/// the simulation aborts rather than trying to continue in an inconsistent state.
#[derive(Debug)]
pub struct InvariantViolation(pub String);

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantViolation {}
