//! Error types
//!
//! Configuration problems are reported once, at construction time. Per-frame
//! anomalies (bad dt, bad samples) never become errors; the simulation
//! absorbs them and counts them in [`crate::sim::StepStats`].

use std::fmt;

/// Invalid board, body or settings configuration
#[derive(Debug)]
pub enum ConfigError {
    /// A shape with a zero, negative or non-finite dimension
    InvalidShape { what: String },
    /// Negative or non-finite density, friction or restitution
    InvalidMaterial { what: String },
    /// Two bodies registered under the same name
    DuplicateName(String),
    /// Layout data that is structurally wrong (non-finite positions etc.)
    MalformedLayout(String),
    /// Solver or control settings out of range
    InvalidSettings(String),
    /// JSON could not be parsed
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidShape { what } => write!(f, "invalid shape: {what}"),
            ConfigError::InvalidMaterial { what } => write!(f, "invalid material: {what}"),
            ConfigError::DuplicateName(name) => write!(f, "duplicate body name '{name}'"),
            ConfigError::MalformedLayout(msg) => write!(f, "malformed board layout: {msg}"),
            ConfigError::InvalidSettings(msg) => write!(f, "invalid settings: {msg}"),
            ConfigError::Parse(err) => write!(f, "failed to parse configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Internal consistency fault: a programmer error, not bad input
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// A static body picked up velocity
    StaticBodyMoving { id: u32 },
    /// A body's state contains NaN or infinity
    NonFiniteState { id: u32 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::StaticBodyMoving { id } => {
                write!(f, "static body {id} has non-zero velocity")
            }
            InvariantViolation::NonFiniteState { id } => {
                write!(f, "body {id} has non-finite position or velocity")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
