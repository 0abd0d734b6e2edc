//! Huella - footprint KPI analysis for manufacturing event logs
//!
//! This library mines directly-follows footprints (operation A immediately
//! followed by operation B within one contract) from production execution
//! data, attributes each contract's KPI means to the footprints it exhibits
//! and classifies every footprint against the population baseline.

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod dot_output;
pub mod error;
pub mod event;
pub mod footprint;
pub mod html_output;
pub mod ingest;
pub mod json_output;
pub mod kpi;
pub mod report;
pub mod stats;
pub mod text_output;

pub use analysis::{AnalysisReport, FootprintAnalyzer};
pub use classify::{classify, Band, Direction, Severity};
pub use error::{AnalysisError, Result};
pub use event::EventRecord;
pub use footprint::Footprint;
pub use kpi::{Kpi, KpiValues};
