//! CLI argument parsing for huella

use crate::kpi::Kpi;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for footprint reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text tables (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
    /// HTML report with colored tables
    Html,
}

#[derive(Parser, Debug)]
#[command(name = "huella")]
#[command(version)]
#[command(about = "Footprint KPI analysis for manufacturing event logs", long_about = None)]
pub struct Cli {
    /// Event log CSV export
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// TOML analysis configuration
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Restrict the population to one material number
    #[arg(short = 'm', long = "material", value_name = "NUMBER")]
    pub material: Option<String>,

    /// Only attribute contracts whose id matches this regex
    #[arg(long = "contracts", value_name = "REGEX")]
    pub contracts: Option<String>,

    /// KPI to report (repeatable; default: all)
    #[arg(short = 'k', long = "kpi", value_enum)]
    pub kpis: Vec<Kpi>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the directly-follows graph with outlier edges (first KPI) as DOT
    #[arg(long = "dot", value_name = "FILE")]
    pub dot: Option<PathBuf>,

    /// Only show footprints outside the neutral band
    #[arg(long = "outliers-only")]
    pub outliers_only: bool,

    /// Keep unplanned rework records
    #[arg(long = "keep-rework")]
    pub keep_rework: bool,

    /// Order operations by actual start instead of actual end
    #[arg(long = "by-start-time")]
    pub by_start_time: bool,

    /// Minimum number of contracts in scope
    #[arg(long = "min-contracts", value_name = "N")]
    pub min_contracts: Option<usize>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_input() {
        let cli = Cli::parse_from(["huella", "log.csv"]);
        assert_eq!(cli.input, PathBuf::from("log.csv"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.kpis.is_empty());
        assert!(!cli.outliers_only);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["huella"]).is_err());
    }

    #[test]
    fn test_cli_repeatable_kpi() {
        let cli = Cli::parse_from(["huella", "log.csv", "--kpi", "lead-time", "--kpi", "rejected"]);
        assert_eq!(cli.kpis, vec![Kpi::LeadTime, Kpi::RejectedQuantity]);
    }

    #[test]
    fn test_cli_kpi_values() {
        for (arg, kpi) in [
            ("oee", Kpi::Oee),
            ("malfunction-duration", Kpi::MalfunctionDuration),
        ] {
            let cli = Cli::parse_from(["huella", "log.csv", "-k", arg]);
            assert_eq!(cli.kpis, vec![kpi]);
        }
        assert!(Cli::try_parse_from(["huella", "log.csv", "--kpi", "speed"]).is_err());
    }

    #[test]
    fn test_cli_format_flag() {
        let cli = Cli::parse_from(["huella", "log.csv", "--format", "html"]);
        assert_eq!(cli.format, OutputFormat::Html);
        assert!(Cli::try_parse_from(["huella", "log.csv", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::parse_from([
            "huella",
            "log.csv",
            "--config",
            "huella.toml",
            "--material",
            "M-100",
            "--contracts",
            "^47",
            "--dot",
            "graph.dot",
            "--outliers-only",
            "--keep-rework",
            "--by-start-time",
            "--min-contracts",
            "3",
            "--debug",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("huella.toml")));
        assert_eq!(cli.material.as_deref(), Some("M-100"));
        assert_eq!(cli.contracts.as_deref(), Some("^47"));
        assert_eq!(cli.dot, Some(PathBuf::from("graph.dot")));
        assert!(cli.outliers_only);
        assert!(cli.keep_rework);
        assert!(cli.by_start_time);
        assert_eq!(cli.min_contracts, Some(3));
        assert!(cli.debug);
    }
}
