//! Error taxonomy for footprint analysis
//!
//! Precondition violations are reported, never replaced by a silent zero, since
//! a defaulted mean would corrupt every downstream delta and band.

use thiserror::Error;

/// Errors raised by the analysis core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Cannot aggregate {what}: input contains no events")]
    EmptyInput { what: String },

    #[error("Contract '{0}' has footprints but no KPI record")]
    UnknownContract(String),

    #[error("Cannot compute: insufficient data ({0})")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
