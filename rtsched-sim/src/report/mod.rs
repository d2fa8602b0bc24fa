/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Reporting adapters over completed runs and benchmark batches.
//!
//! Adapters only read results; nothing here feeds back into the engine.
//!
//! | Adapter | Input | Output |
//! |---|---|---|
//! | [`csv::write_run_csv`] | `SimulationRun` | event log + metric block + per-task table |
//! | [`csv::write_metrics_csv`] | `SimulationRun` | metric block + per-task table |
//! | [`csv::write_benchmark_csv`] | `[BenchmarkRecord]` | one row per configuration id |
//! | [`text::comparison_table`] | `[BenchmarkRecord]` | aligned plain-text table |
//! | [`text::summary_markdown`] | `[BenchmarkRecord]` | markdown report, optional HDL appendix |
//! | [`text::timeline`] | `SimulationRun` | one `#` row per label |
//!
//! The `write_*` functions take any [`Write`] sink; the `export_*` wrappers
//! create the file and attach its path to any I/O failure.

pub mod csv;
pub mod text;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::benchmark::BenchmarkRecord;
use crate::scheduler::SimulationRun;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `path`, hand a buffered writer to `write`, and flush.
fn export_with<F>(path: &Path, write: F) -> Result<(), ReportError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    write(&mut w).map_err(io_err)?;
    w.flush().map_err(io_err)?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Write the full run CSV to `path`.
pub fn export_run_csv(path: &Path, run: &SimulationRun) -> Result<(), ReportError> {
    export_with(path, |w| csv::write_run_csv(w, run))
}

/// Write the metric block (with average ready-set depth) and per-task table
/// of `run` to `path`.
pub fn export_metrics_csv(path: &Path, run: &SimulationRun) -> Result<(), ReportError> {
    export_with(path, |w| csv::write_metrics_csv(w, run))
}

/// Write the benchmark comparison CSV to `path`.
pub fn export_benchmark_csv(path: &Path, records: &[BenchmarkRecord]) -> Result<(), ReportError> {
    export_with(path, |w| csv::write_benchmark_csv(w, records))
}

/// Write the markdown summary to `path`.
pub fn export_summary_markdown(
    path: &Path,
    records: &[BenchmarkRecord],
    include_appendix: bool,
) -> Result<(), ReportError> {
    export_with(path, |w| {
        w.write_all(text::summary_markdown(records, include_appendix).as_bytes())
    })
}

/// `0.3612` → `"36.12%"`.
pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
