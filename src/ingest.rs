//! Event-log import from MES CSV exports
//!
//! Reads a delimited export with a header row, derives the per-row KPIs and
//! optionally removes unplanned rework records.
//!
//! Derived KPIs:
//! - OEE = Availability × Performance × Quality
//! - Lead time = setup + processing + teardown (actual)
//! - Malfunction duration = downtime (actual)
//! - Rejected quantity = scrap quantity (actual)

use crate::config::AnalysisConfig;
use crate::event::{exclude_rework, EventRecord};
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDateTime};
use std::fs;
use std::path::Path;

pub const COL_CONTRACT: &str = "Contract";
pub const COL_OPERATION: &str = "Operation RelNr";
pub const COL_MATERIAL: &str = "Material Number";
pub const COL_SETUP: &str = "Setup Duration Actual";
pub const COL_PROCESSING: &str = "Processing Duration Actual";
pub const COL_TEARDOWN: &str = "Teardown Duration Actual";
pub const COL_DOWNTIME: &str = "Downtime Actual";
pub const COL_SCRAP: &str = "Scrap Quantity Actual (Recording Unit)";
pub const COL_START: &str = "Start Date Actual";
pub const COL_END: &str = "End Date Actual";
pub const COL_AVAILABILITY: &str = "Availability";
pub const COL_PERFORMANCE: &str = "Performance";
pub const COL_QUALITY: &str = "Quality";

/// Longest accepted duration cell (one year)
pub const MAX_DURATION_SECS: i64 = 366 * 24 * 3600;

/// Columns read from the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Contract,
    Operation,
    Material,
    Setup,
    Processing,
    Teardown,
    Downtime,
    Scrap,
    Start,
    End,
    Availability,
    Performance,
    Quality,
}

impl Column {
    const ALL: [Column; 13] = [
        Column::Contract,
        Column::Operation,
        Column::Material,
        Column::Setup,
        Column::Processing,
        Column::Teardown,
        Column::Downtime,
        Column::Scrap,
        Column::Start,
        Column::End,
        Column::Availability,
        Column::Performance,
        Column::Quality,
    ];

    fn name(self) -> &'static str {
        match self {
            Column::Contract => COL_CONTRACT,
            Column::Operation => COL_OPERATION,
            Column::Material => COL_MATERIAL,
            Column::Setup => COL_SETUP,
            Column::Processing => COL_PROCESSING,
            Column::Teardown => COL_TEARDOWN,
            Column::Downtime => COL_DOWNTIME,
            Column::Scrap => COL_SCRAP,
            Column::Start => COL_START,
            Column::End => COL_END,
            Column::Availability => COL_AVAILABILITY,
            Column::Performance => COL_PERFORMANCE,
            Column::Quality => COL_QUALITY,
        }
    }
}

/// Column positions resolved from the header row, indexed by `Column`
#[derive(Debug)]
struct ColumnIndex {
    positions: [usize; Column::ALL.len()],
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self> {
        let mut positions = [0usize; Column::ALL.len()];
        let mut missing = Vec::new();

        for column in Column::ALL {
            match header.iter().position(|h| h.trim() == column.name()) {
                Some(pos) => positions[column as usize] = pos,
                None => missing.push(column.name()),
            }
        }

        if !missing.is_empty() {
            bail!("Missing required columns: {}", missing.join(", "));
        }

        Ok(Self { positions })
    }

    fn get<'r>(&self, row: &'r [String], column: Column) -> &'r str {
        row.get(self.positions[column as usize])
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Read and parse an event-log file
///
/// Rework rows are removed when `config.exclude_rework` is set.
pub fn import_event_log<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<Vec<EventRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read event log: {}", path.as_ref().display()))?;

    let events = parse_event_log(&content, config)
        .with_context(|| format!("Failed to parse event log: {}", path.as_ref().display()))?;

    tracing::info!(
        "Imported {} events from {}",
        events.len(),
        path.as_ref().display()
    );

    if config.exclude_rework {
        Ok(exclude_rework(events, &config.rework_prefix))
    } else {
        Ok(events)
    }
}

/// Parse event-log text (header row plus one row per operation)
///
/// A quoted field may span several lines; the record then reports the line it
/// starts on.
pub fn parse_event_log(content: &str, config: &AnalysisConfig) -> Result<Vec<EventRecord>> {
    let mut records = read_records(content, config.delimiter)?.into_iter();

    let Some((_, header)) = records.next() else {
        bail!("Event log is empty");
    };
    let columns = ColumnIndex::from_header(&header)?;

    let mut events = Vec::new();
    for (line_no, row) in records {
        let event = parse_row(&row, &columns, config)
            .with_context(|| format!("Line {}: invalid event", line_no))?;
        events.push(event);
    }

    Ok(events)
}

/// Split `content` into records with their 1-based starting line
///
/// Blank lines between records are skipped; a leading BOM is dropped.
fn read_records(content: &str, delimiter: char) -> Result<Vec<(usize, Vec<String>)>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut records = Vec::new();
    let mut pending: Option<(usize, RecordScanner)> = None;

    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        let (line_no, mut scanner) = match pending.take() {
            Some((start, mut scanner)) => {
                scanner.feed("\n", delimiter);
                (start, scanner)
            }
            None if line.trim().is_empty() => continue,
            None => (i + 1, RecordScanner::default()),
        };

        scanner.feed(line, delimiter);
        if scanner.in_quotes {
            pending = Some((line_no, scanner));
        } else {
            records.push((line_no, scanner.finish()));
        }
    }

    if let Some((line_no, _)) = pending {
        bail!("Line {}: malformed record: unterminated quoted field", line_no);
    }
    Ok(records)
}

fn parse_row(row: &[String], columns: &ColumnIndex, config: &AnalysisConfig) -> Result<EventRecord> {
    let contract_id = columns.get(row, Column::Contract);
    if contract_id.is_empty() {
        bail!("empty {}", COL_CONTRACT);
    }
    let operation_id = columns.get(row, Column::Operation);
    if operation_id.is_empty() {
        bail!("empty {}", COL_OPERATION);
    }

    let field_duration = |column: Column| -> Result<Duration> {
        parse_duration(columns.get(row, column)).with_context(|| format!("column '{}'", column.name()))
    };
    let field_number = |column: Column| -> Result<f64> {
        parse_number(columns.get(row, column)).with_context(|| format!("column '{}'", column.name()))
    };
    let field_date = |column: Column| -> Result<Option<NaiveDateTime>> {
        parse_date(columns.get(row, column), &config.date_format)
            .with_context(|| format!("column '{}'", column.name()))
    };

    let lead_time =
        field_duration(Column::Setup)? + field_duration(Column::Processing)? + field_duration(Column::Teardown)?;
    let oee = field_number(Column::Availability)?
        * field_number(Column::Performance)?
        * field_number(Column::Quality)?;

    Ok(EventRecord {
        contract_id: contract_id.to_string(),
        operation_id: operation_id.to_string(),
        material_number: columns.get(row, Column::Material).to_string(),
        start_timestamp: field_date(Column::Start)?,
        end_timestamp: field_date(Column::End)?,
        oee,
        lead_time,
        malfunction_duration: field_duration(Column::Downtime)?,
        rejected_quantity: field_number(Column::Scrap)?,
    })
}

/// Incremental splitter for one delimited record
#[derive(Debug, Default)]
struct RecordScanner {
    fields: Vec<String>,
    current: String,
    in_quotes: bool,
}

impl RecordScanner {
    fn feed(&mut self, text: &str, delimiter: char) {
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if self.in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        self.current.push('"');
                        chars.next();
                    } else {
                        self.in_quotes = false;
                    }
                } else {
                    self.current.push(c);
                }
            } else if c == '"' && self.current.is_empty() {
                self.in_quotes = true;
            } else if c == delimiter {
                self.fields.push(std::mem::take(&mut self.current));
            } else {
                self.current.push(c);
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.fields.push(self.current);
        self.fields
    }
}

/// Split one delimited line, honoring double-quoted fields
pub fn split_record(line: &str, delimiter: char) -> Result<Vec<String>> {
    let mut scanner = RecordScanner::default();
    scanner.feed(line, delimiter);
    if scanner.in_quotes {
        bail!("unterminated quoted field");
    }
    Ok(scanner.finish())
}

/// Parse a decimal number; accepts `,` or `.` as decimal separator and a `%` suffix
///
/// With both separators present the last one is the decimal separator, so
/// `1.234,5` and `1,234.5` both read as 1234.5. Empty cells read as zero.
pub fn parse_number(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0.0);
    }

    let (digits, scale) = match cell.strip_suffix('%') {
        Some(rest) => (rest.trim(), 0.01),
        None => (cell, 1.0),
    };

    // The separator that comes last is the decimal one; the other groups thousands
    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) => digits.replace(',', "."),
        (None, _) => digits.to_string(),
    };

    let value: f64 = normalized
        .parse()
        .with_context(|| format!("'{}' is not a number", cell))?;
    if !value.is_finite() {
        bail!("'{}' is not a finite number", cell);
    }
    Ok(value * scale)
}

/// Parse `H:MM:SS`, `H:MM` or decimal minutes
///
/// Empty cells read as zero. Negative values and values above
/// [`MAX_DURATION_SECS`] are rejected.
pub fn parse_duration(cell: &str) -> Result<Duration> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(Duration::zero());
    }

    let millis = if cell.contains(':') {
        let nums = cell
            .split(':')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<u32>, _>>()
            .with_context(|| format!("'{}' is not a duration", cell))?;

        let secs = match nums.as_slice() {
            [h, m] => i64::from(*h) * 3600 + i64::from(*m) * 60,
            [h, m, s] => i64::from(*h) * 3600 + i64::from(*m) * 60 + i64::from(*s),
            _ => bail!("'{}' is not a duration (expected H:MM or H:MM:SS)", cell),
        };
        secs * 1000
    } else {
        let minutes = parse_number(cell)?;
        let millis = (minutes * 60_000.0).round();
        if !(0.0..=(MAX_DURATION_SECS * 1000) as f64).contains(&millis) {
            bail!("'{}' is out of range", cell);
        }
        millis as i64
    };

    if !(0..=MAX_DURATION_SECS * 1000).contains(&millis) {
        bail!("'{}' is out of range", cell);
    }
    Duration::try_milliseconds(millis).with_context(|| format!("'{}' is out of range", cell))
}

/// Parse a date cell with `format`; empty cells are `None`
pub fn parse_date(cell: &str, format: &str) -> Result<Option<NaiveDateTime>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(cell, format)
        .map(Some)
        .with_context(|| format!("'{}' does not match date format '{}'", cell, format))
}
