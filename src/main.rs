use anyhow::{Context, Result};
use clap::Parser;
use huella::analysis::{AnalysisReport, FootprintAnalyzer};
use huella::cli::{Cli, OutputFormat};
use huella::config::AnalysisConfig;
use huella::csv_output::CsvReport;
use huella::dot_output::render_dot;
use huella::event::{filter_by_material, EventRecord};
use huella::footprint::{extract_dfg_for_contracts, FieldMapping};
use huella::html_output::HtmlReport;
use huella::ingest::import_event_log;
use huella::json_output::JsonReport;
use huella::report::{calculate_outlier_footprints, extract_edge_markings};
use huella::text_output::TextReport;
use regex::Regex;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Configuration file (or defaults) with command-line overrides applied
fn load_config(args: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };

    if args.outliers_only {
        config.outliers_only = true;
    }
    if args.keep_rework {
        config.exclude_rework = false;
    }
    if let Some(n) = args.min_contracts {
        config.min_contracts = n;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid analysis configuration: {}", e))?;
    Ok(config)
}

fn render(report: &AnalysisReport, format: OutputFormat, outliers_only: bool) -> Result<String> {
    let output = match format {
        OutputFormat::Text => TextReport::new(report, outliers_only).to_text(),
        OutputFormat::Json => JsonReport::from_analysis(report, outliers_only).to_json()?,
        OutputFormat::Csv => {
            let mut csv = CsvReport::new(outliers_only);
            for series in &report.series {
                csv.add_series(series);
            }
            csv.to_csv()
        }
        OutputFormat::Html => HtmlReport::new(report, outliers_only).to_html(),
    };
    Ok(output)
}

/// Write the scoped directly-follows graph with outliers of the first KPI marked
fn write_dot(
    path: &Path,
    events: &[EventRecord],
    report: &AnalysisReport,
    mapping: FieldMapping,
) -> Result<()> {
    let markings = report
        .series
        .first()
        .map(|series| extract_edge_markings(&calculate_outlier_footprints(series)))
        .unwrap_or_default();

    let scoped: Vec<&str> = report.contracts.keys().map(String::as_str).collect();
    let dfg = extract_dfg_for_contracts(events, &scoped, &mapping);

    std::fs::write(path, render_dot(&dfg, &markings))
        .with_context(|| format!("Failed to write DOT graph: {}", path.display()))?;
    tracing::info!(
        "Wrote DOT graph with {} marked edges to {}",
        markings.len(),
        path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;

    let mut events = import_event_log(&args.input, &config)?;
    if let Some(material) = &args.material {
        events = filter_by_material(events, material);
        tracing::info!("{} events for material {}", events.len(), material);
    }

    let mapping = if args.by_start_time {
        FieldMapping::by_start_time()
    } else {
        FieldMapping::production()
    };

    let outliers_only = config.outliers_only;
    let mut analyzer = FootprintAnalyzer::new(config)
        .with_kpis(&args.kpis)
        .with_mapping(mapping);
    if let Some(pattern) = &args.contracts {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid --contracts regex: {}", pattern))?;
        analyzer = analyzer.with_contract_scope(regex);
    }

    let report = analyzer
        .analyze(&events)
        .with_context(|| format!("Analysis of {} failed", args.input.display()))?;

    print!("{}", render(&report, args.format, outliers_only)?);

    if let Some(path) = &args.dot {
        write_dot(path, &events, &report, mapping)?;
    }

    Ok(())
}
