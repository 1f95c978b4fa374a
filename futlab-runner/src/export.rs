//! CSV and JSON-lines artifacts.
//!
//! - **Curve CSV**: `timestamp,cumulative_return`, readable back with
//!   [`curve_from_csv`] so saved curves can be blended later
//! - **Simulation CSV**: every per-bar column of the simulator, for debugging
//! - **Records JSONL**: one [`RunRecord`] per line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use futlab_core::{CurvePoint, ReturnCurve, Simulation};

use crate::repository::parse_timestamp;
use crate::tester::RunRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Curves ─────────────────────────────────────────────────────────

/// Serialize a return curve as `timestamp,cumulative_return` CSV.
pub fn curve_to_csv(curve: &ReturnCurve) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "cumulative_return"])?;
    for p in curve.points() {
        wtr.write_record([
            p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            p.value.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse a `timestamp,cumulative_return` CSV. Rows must be strictly
/// increasing in time.
pub fn curve_from_csv(text: &str) -> Result<ReturnCurve> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = rdr.headers().context("curve CSV has no header")?.clone();
    if headers.len() < 2 {
        bail!("curve CSV needs timestamp and cumulative_return columns");
    }

    let mut points = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("malformed curve CSV row {}", i + 1))?;
        let ts_text = record.get(0).unwrap_or_default();
        let timestamp = parse_timestamp(ts_text)
            .with_context(|| format!("row {}: unparseable timestamp '{ts_text}'", i + 1))?;
        let value: f64 = record
            .get(1)
            .unwrap_or_default()
            .parse()
            .with_context(|| format!("row {}: cumulative_return is not a number", i + 1))?;
        points.push(CurvePoint { timestamp, value });
    }
    ReturnCurve::new(points).context("curve CSV rows are not in time order")
}

pub fn write_curve(path: &Path, curve: &ReturnCurve) -> Result<()> {
    let csv = curve_to_csv(curve)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_curve(path: &Path) -> Result<ReturnCurve> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    curve_from_csv(&text).with_context(|| format!("in {}", path.display()))
}

// ─── Simulation debug output ────────────────────────────────────────

/// Every simulator column, one row per bar.
pub fn simulation_to_csv(simulation: &Simulation) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in &simulation.rows {
        wtr.serialize(row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Run records ────────────────────────────────────────────────────

/// One JSON object per line.
pub fn records_to_jsonl(records: &[RunRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .with_context(|| format!("failed to serialize run {}", record.run_id))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parse JSON lines written by [`records_to_jsonl`]. Blank lines are skipped.
pub fn records_from_jsonl(text: &str) -> Result<Vec<RunRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid record on line {}", i + 1))
        })
        .collect()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save a sweep's artifacts under `output_dir`:
/// - `records.jsonl`: every run record
/// - `combined.csv`: the blended curve of all completed runs
///
/// Returns the paths written.
pub fn save_sweep_artifacts(
    records: &[RunRecord],
    combined: &ReturnCurve,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let records_path = output_dir.join("records.jsonl");
    std::fs::write(&records_path, records_to_jsonl(records)?)
        .with_context(|| format!("failed to write {}", records_path.display()))?;

    let curve_path = output_dir.join("combined.csv");
    write_curve(&curve_path, combined)?;

    Ok(vec![records_path, curve_path])
}
