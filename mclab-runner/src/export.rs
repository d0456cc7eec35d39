//! Export: JSON and CSV artifacts for runs, sweeps and convergence studies.
//!
//! Every writer comes in two forms: `*_to` takes any `io::Write`, and the
//! path-based `write_*` creates parent directories before writing.
//!
//! - **JSON**: full `SimulationRun` (without paths) and the five-key summary
//! - **CSV**: path matrix, terminal values, sweep table, convergence table

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use mclab_core::{PathEnsemble, SummaryStatistics};

use crate::config::OutputSection;
use crate::convergence::ConvergencePoint;
use crate::runner::SimulationRun;
use crate::sweep::SweepResults;

/// Errors from writing artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    File::create(path).map(BufWriter::new).map_err(io_err)
}

fn finish(mut writer: BufWriter<File>, path: &Path) -> Result<(), ExportError> {
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a run (everything but the path matrix) as pretty JSON.
pub fn write_run_json_to<W: Write>(run: &SimulationRun, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, run)?;
    Ok(())
}

pub fn write_run_json(run: &SimulationRun, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_run_json_to(run, &mut writer)?;
    finish(writer, path)
}

/// Serialize the summary as a JSON object keyed by `SUMMARY_KEYS`.
pub fn write_summary_json_to<W: Write>(
    summary: &SummaryStatistics,
    writer: W,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, &summary.to_map())?;
    Ok(())
}

pub fn write_summary_json(summary: &SummaryStatistics, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_summary_json_to(summary, &mut writer)?;
    finish(writer, path)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per path. Columns: path, t0, t1, ..., tN.
pub fn write_paths_csv_to<W: Write>(ensemble: &PathEnsemble, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(ensemble.num_columns() + 1);
    header.push("path".to_string());
    header.extend((0..ensemble.num_columns()).map(|t| format!("t{t}")));
    wtr.write_record(&header)?;

    let mut record = Vec::with_capacity(ensemble.num_columns() + 1);
    for (p, path) in ensemble.paths().enumerate() {
        record.clear();
        record.push(p.to_string());
        record.extend(path.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_paths_csv(ensemble: &PathEnsemble, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_paths_csv_to(ensemble, &mut writer)?;
    finish(writer, path)
}

/// Columns: path, terminal_value.
pub fn write_terminal_csv_to<W: Write>(
    ensemble: &PathEnsemble,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["path", "terminal_value"])?;
    for (p, v) in ensemble.terminal_values().into_iter().enumerate() {
        wtr.write_record([p.to_string(), v.to_string()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_terminal_csv(ensemble: &PathEnsemble, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_terminal_csv_to(ensemble, &mut writer)?;
    finish(writer, path)
}

/// One row per grid point, in grid order.
///
/// Columns: run_id, drift, volatility, seed, mean, median, std_dev, min, max
pub fn write_sweep_csv_to<W: Write>(results: &SweepResults, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "run_id",
        "drift",
        "volatility",
        "seed",
        "mean",
        "median",
        "std_dev",
        "min",
        "max",
    ])?;
    for run in results.all() {
        let s = &run.summary;
        wtr.write_record([
            run.run_id.clone(),
            run.params.drift().to_string(),
            run.params.volatility().to_string(),
            run.seed().map(|seed| seed.to_string()).unwrap_or_default(),
            s.mean.to_string(),
            s.median.to_string(),
            s.std_dev.to_string(),
            s.min.to_string(),
            s.max.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_sweep_csv(results: &SweepResults, path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_sweep_csv_to(results, &mut writer)?;
    finish(writer, path)
}

/// Columns: num_paths, sample_mean, analytic_mean, abs_error, standard_error
pub fn write_convergence_csv_to<W: Write>(
    points: &[ConvergencePoint],
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_convergence_csv(points: &[ConvergencePoint], path: &Path) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    write_convergence_csv_to(points, &mut writer)?;
    finish(writer, path)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run.
///
/// Creates `{run_id prefix}_{timestamp}/` under the output directory with:
/// - `run.json`: the full `SimulationRun`
/// - `summary.json`: terminal summary keyed by statistic
/// - `terminal.csv`: terminal value of every path
/// - `paths.csv`: full path matrix, only when `write_paths` is set
///
/// Returns the path to the created directory.
pub fn save_artifacts(run: &SimulationRun, output: &OutputSection) -> Result<PathBuf, ExportError> {
    let prefix = run.run_id.get(..12).unwrap_or(&run.run_id);
    let dirname = format!("{}_{}", prefix, run.started_at.format("%Y%m%d_%H%M%S"));
    let run_dir = output.directory.join(dirname);

    write_run_json(run, &run_dir.join("run.json"))?;
    write_summary_json(&run.summary, &run_dir.join("summary.json"))?;
    write_terminal_csv(&run.ensemble, &run_dir.join("terminal.csv"))?;
    if output.write_paths {
        write_paths_csv(&run.ensemble, &run_dir.join("paths.csv"))?;
    }

    info!(run_id = %run.run_id, dir = %run_dir.display(), "saved run artifacts");
    Ok(run_dir)
}
