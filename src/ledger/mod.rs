//! Append-only result ledger
//!
//! One CSV row per measured configuration, with a fixed column header
//! written exactly once. Every later invocation appends rows without
//! rewriting prior ones, so a partially completed sweep can be resumed
//! by re-running the remaining configurations without corrupting
//! existing data.
//!
//! # File Format
//!
//! ```csv
//! # wave_propagation sweep results
//! # Generated: 2026-08-06T15:30:00+00:00
//! #
//! label,network,N,Lx,Ly,steps,schedule,chunk,threads,time_sec,...
//! 2d_dynamic_best,2d,,256,256,1000,dynamic,512,1,10.000000,...
//! ```
//!
//! Size columns not applicable to the row's topology are left blank.
//! Consumers read columns by header name, not position, so the schema
//! can grow without breaking older readers; `load` accepts the minimal
//! schema (`network,...,time_sec`) and fills defaults for the richer
//! columns.
//!
//! # Ordering
//!
//! Row order reflects write order. Later rows may repeat a
//! configuration key (a resumed sweep re-measuring a cell); the
//! analysis engine resolves duplicates by keeping the most recent row.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::HarnessError;
use crate::experiment::{Chunk, GridSize, Schedule, Topology};

// =================================================================================================
// Measurement
// =================================================================================================

/// One ledger row: a single measured configuration.
///
/// Produced by the sweep driver, appended to the ledger, never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Scenario label this row belongs to
    pub label: String,

    /// Network topology
    pub topology: Topology,

    /// Problem size
    pub size: GridSize,

    /// Simulation steps per run
    pub steps: u32,

    /// OpenMP schedule
    pub schedule: Schedule,

    /// Chunk candidate (stored as text so `auto` survives)
    pub chunk: Chunk,

    /// Thread count
    pub threads: u32,

    /// Aggregated elapsed time in seconds (median or minimum)
    pub time_sec: f64,

    /// Mean of the repetition timings
    pub time_mean: f64,

    /// Population standard deviation of the repetition timings
    pub time_std: f64,

    /// First energy reading of the run's trace
    pub energy_first: Option<f64>,

    /// Last energy reading of the run's trace
    pub energy_last: Option<f64>,

    /// Number of valid trace lines
    pub energy_lines: usize,

    /// Final non-empty stdout line
    pub stdout_last: String,

    /// Final non-empty stderr line
    pub stderr_last: String,
}

impl Measurement {
    /// Duplicate-resolution key: rows sharing this key describe the
    /// same configuration cell.
    pub fn key(&self) -> (String, Schedule, Chunk, u32) {
        (
            self.label.clone(),
            self.schedule,
            self.chunk,
            self.threads,
        )
    }
}

// =================================================================================================
// Ledger
// =================================================================================================

/// Fixed column order of the full schema.
const COLUMNS: [&str; 17] = [
    "label",
    "network",
    "N",
    "Lx",
    "Ly",
    "steps",
    "schedule",
    "chunk",
    "threads",
    "time_sec",
    "time_mean",
    "time_std",
    "E0",
    "Eend",
    "energy_lines",
    "stdout_last",
    "stderr_last",
];

/// Append-only tabular store of measurements.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the metadata block and header first when
    /// the file is fresh.
    ///
    /// The file is opened in append mode per call; prior rows are never
    /// rewritten.
    pub fn append(&self, measurement: &Measurement) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let fresh = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if fresh {
            write_metadata_header(&mut file)?;
            writeln!(file, "{}", COLUMNS.join(","))?;
        }

        writeln!(file, "{}", format_row(measurement))?;
        Ok(())
    }

    /// Read every row back, in write order.
    ///
    /// Fails with [`HarnessError::LedgerMissing`] when the file does not
    /// exist. Rows that fail to parse (e.g. a line torn by a crash
    /// mid-append) are skipped with a warning rather than aborting the
    /// load.
    pub fn load(&self) -> Result<Vec<Measurement>, HarnessError> {
        if !self.path.exists() {
            return Err(HarnessError::LedgerMissing {
                path: self.path.clone(),
            });
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let mut lines = contents
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'));

        let Some(header) = lines.next() else {
            return Ok(Vec::new());
        };
        let names: Vec<&str> = split_csv_line(header);

        let mut rows = Vec::new();
        for (number, line) in lines.enumerate() {
            let fields = split_csv_line(line);
            match parse_row(&names, &fields) {
                Ok(measurement) => rows.push(measurement),
                Err(reason) => warn!(
                    "skipping unparseable ledger row {} in {}: {}",
                    number + 1,
                    self.path.display(),
                    reason
                ),
            }
        }
        Ok(rows)
    }
}

// =================================================================================================
// Row Formatting
// =================================================================================================

/// Metadata comment block for a fresh ledger file.
fn write_metadata_header(file: &mut File) -> std::io::Result<()> {
    writeln!(file, "# wave_propagation sweep results")?;
    writeln!(file, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(file, "#")
}

fn format_row(m: &Measurement) -> String {
    let (n, lx, ly) = match m.size {
        GridSize::Line { n } => (n.to_string(), String::new(), String::new()),
        GridSize::Plane { lx, ly } => (String::new(), lx.to_string(), ly.to_string()),
    };

    let fields = [
        csv_escape(&m.label),
        m.topology.to_string(),
        n,
        lx,
        ly,
        m.steps.to_string(),
        m.schedule.to_string(),
        m.chunk.to_string(),
        m.threads.to_string(),
        format!("{:.6}", m.time_sec),
        format!("{:.6}", m.time_mean),
        format!("{:.6}", m.time_std),
        m.energy_first.map(|e| e.to_string()).unwrap_or_default(),
        m.energy_last.map(|e| e.to_string()).unwrap_or_default(),
        m.energy_lines.to_string(),
        csv_escape(&m.stdout_last),
        csv_escape(&m.stderr_last),
    ];
    fields.join(",")
}

/// Quote a field when it contains the delimiter, a quote, or a newline;
/// embedded quotes are doubled.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line, honouring quoted fields with doubled quotes.
fn split_csv_line(line: &str) -> Vec<&str> {
    // Fast path: no quoting anywhere on the line.
    if !line.contains('"') {
        return line.split(',').collect();
    }
    split_csv_line_quoted(line)
}

fn split_csv_line_quoted(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let bytes = line.as_bytes();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Undo `csv_escape` on a single field.
fn csv_unescape(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

// =================================================================================================
// Row Parsing
// =================================================================================================

fn parse_row(names: &[&str], fields: &[&str]) -> Result<Measurement, String> {
    let get = |name: &str| -> Option<String> {
        names
            .iter()
            .position(|&n| n == name)
            .and_then(|idx| fields.get(idx))
            .map(|raw| csv_unescape(raw))
            .filter(|value| !value.is_empty())
    };
    let require = |name: &str| -> Result<String, String> {
        get(name).ok_or_else(|| format!("missing required column '{}'", name))
    };

    let topology: Topology = require("network")?.parse()?;
    let schedule: Schedule = require("schedule")?.parse()?;
    let chunk: Chunk = require("chunk")?.parse()?;
    let threads = parse_number::<u32>(&require("threads")?, "threads")?;
    let steps = parse_number::<u32>(&require("steps")?, "steps")?;
    let time_sec = parse_number::<f64>(&require("time_sec")?, "time_sec")?;

    let size = match topology {
        Topology::OneD => GridSize::Line {
            n: parse_number::<u32>(&require("N")?, "N")?,
        },
        Topology::TwoD => GridSize::Plane {
            lx: parse_number::<u32>(&require("Lx")?, "Lx")?,
            ly: parse_number::<u32>(&require("Ly")?, "Ly")?,
        },
    };

    let time_mean = match get("time_mean") {
        Some(value) => parse_number::<f64>(&value, "time_mean")?,
        None => time_sec,
    };
    let time_std = match get("time_std") {
        Some(value) => parse_number::<f64>(&value, "time_std")?,
        None => 0.0,
    };
    let energy_first = get("E0")
        .map(|value| parse_number::<f64>(&value, "E0"))
        .transpose()?;
    let energy_last = get("Eend")
        .map(|value| parse_number::<f64>(&value, "Eend"))
        .transpose()?;
    let energy_lines = match get("energy_lines") {
        Some(value) => parse_number::<usize>(&value, "energy_lines")?,
        None => 0,
    };

    Ok(Measurement {
        label: get("label").unwrap_or_default(),
        topology,
        size,
        steps,
        schedule,
        chunk,
        threads,
        time_sec,
        time_mean,
        time_std,
        energy_first,
        energy_last,
        energy_lines,
        stdout_last: get("stdout_last").unwrap_or_default(),
        stderr_last: get("stderr_last").unwrap_or_default(),
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("invalid {} value '{}'", name, value))
}

// =================================================================================================
// Tests
// =================================================================================================
