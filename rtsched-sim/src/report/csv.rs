/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CSV writers.
//!
//! Run CSV layout (ticks are reported as milliseconds, 1 tick = 1 ms):
//! ```text
//! Task,Start,End
//! ADC,0,1
//! ...
//!
//! Metric,Value
//! CPU Load,36.00%
//! Idle Time,16 ms
//! Busy Time,9 ms
//! Missed Deadlines,0
//!
//! Task,Deadlines Missed,Avg Jitter (ms)
//! ADC,0,10.00
//! ```
//!
//! The standalone metrics CSV drops the event log and adds a
//! `Buffer State (avg)` row (mean ready-set depth) to the metric block.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::benchmark::{BenchmarkRecord, RecordOutcome};
use crate::scheduler::{Metrics, SimulationRun};

use super::percent;

/// Quote `value` if it contains a separator, a quote or a line break.
pub fn field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn row<W: Write, S: AsRef<str>>(w: &mut W, cells: &[S]) -> io::Result<()> {
    let line = cells
        .iter()
        .map(|c| field(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(w, "{line}")
}

/// `Metric,Value` block without the trailing blank row.
fn metric_block<W: Write>(w: &mut W, m: &Metrics, with_buffer: bool) -> io::Result<()> {
    row(w, &["Metric", "Value"])?;
    row(w, &["CPU Load".to_string(), percent(m.cpu_load())])?;
    row(w, &["Idle Time".to_string(), format!("{} ms", m.idle_ticks)])?;
    row(w, &["Busy Time".to_string(), format!("{} ms", m.busy_ticks)])?;
    row(w, &["Missed Deadlines".to_string(), m.total_missed.to_string()])?;
    if with_buffer {
        let avg = if m.buffer_state.is_empty() {
            0.0
        } else {
            m.buffer_state.iter().sum::<usize>() as f64 / m.buffer_state.len() as f64
        };
        row(w, &["Buffer State (avg)".to_string(), format!("{avg:.2}")])?;
    }
    Ok(())
}

fn task_table<W: Write>(w: &mut W, m: &Metrics) -> io::Result<()> {
    row(w, &["Task", "Deadlines Missed", "Avg Jitter (ms)"])?;
    for t in &m.tasks {
        row(
            w,
            &[
                t.name.clone(),
                t.missed.to_string(),
                format!("{:.2}", t.average_jitter()),
            ],
        )?;
    }
    Ok(())
}

/// Event log, blank row, metric block, blank row, per-task table.
pub fn write_run_csv<W: Write>(w: &mut W, run: &SimulationRun) -> io::Result<()> {
    row(w, &["Task", "Start", "End"])?;
    for ev in &run.events {
        row(
            w,
            &[ev.label.clone(), ev.start.to_string(), ev.end.to_string()],
        )?;
    }
    writeln!(w)?;
    metric_block(w, &run.metrics, false)?;
    writeln!(w)?;
    task_table(w, &run.metrics)
}

/// Metric block with the average ready-set depth, blank row, per-task table.
pub fn write_metrics_csv<W: Write>(w: &mut W, run: &SimulationRun) -> io::Result<()> {
    metric_block(w, &run.metrics, true)?;
    writeln!(w)?;
    task_table(w, &run.metrics)
}

/// Task names across all completed records, in first-seen order.
pub(crate) fn task_columns(records: &[BenchmarkRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for t in records.iter().filter_map(|r| r.metrics()).flat_map(|m| &m.tasks) {
        if !names.contains(&t.name.as_str()) {
            names.push(&t.name);
        }
    }
    names
}

/// One row per configuration id.  Failed rows keep their id, discipline and
/// mode but leave every metric cell empty.
pub fn write_benchmark_csv<W: Write>(w: &mut W, records: &[BenchmarkRecord]) -> io::Result<()> {
    let tasks = task_columns(records);

    let mut header: Vec<String> = [
        "config_id",
        "scheduler",
        "mode",
        "cpu_load",
        "idle_time",
        "busy_time",
        "missed_deadlines",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for name in &tasks {
        header.push(format!("{name}_jitter"));
        header.push(format!("{name}_missed"));
    }
    header.push("status".to_string());
    row(w, &header[..])?;

    for r in records {
        let mut cells = vec![
            r.config_id.to_string(),
            r.discipline.display_name().to_string(),
            r.mode.display_name().to_string(),
        ];
        match &r.outcome {
            RecordOutcome::Completed(m) => {
                cells.push(format!("{:.4}", m.cpu_load));
                cells.push(m.idle_ticks.to_string());
                cells.push(m.busy_ticks.to_string());
                cells.push(m.total_missed.to_string());
                for name in &tasks {
                    match m.tasks.iter().find(|t| t.name == *name) {
                        Some(t) => {
                            cells.push(format!("{:.2}", t.average_jitter));
                            cells.push(t.missed.to_string());
                        }
                        None => cells.extend([String::new(), String::new()]),
                    }
                }
                cells.push("ok".to_string());
            }
            RecordOutcome::Failed(e) => {
                cells.extend(std::iter::repeat(String::new()).take(4 + 2 * tasks.len()));
                cells.push(format!("failed: {e}"));
            }
        }
        row(w, &cells[..])?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{BenchmarkHarness, TaskOverride, Variation};
    use crate::scheduler::simulate;
    use crate::task::{Discipline, Mode, TaskSpec};

    fn to_string<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn field_quotes_only_when_needed() {
        assert_eq!(field("ADC"), "ADC");
        assert_eq!(field("a,b"), "\"a,b\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn run_csv_has_documented_layout() {
        let run = simulate(
            &[TaskSpec::new("T", 10, 3, 1)],
            25,
            Discipline::Priority,
            Mode::Preemptive,
        )
        .unwrap();
        let out = to_string(|w| write_run_csv(w, &run));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Task,Start,End");
        assert_eq!(lines[1], "T,0,1");
        assert_eq!(lines[4], "IDLE,3,4");
        // 25 event rows follow the header
        assert_eq!(lines[26], "");
        assert_eq!(
            &lines[27..],
            [
                "Metric,Value",
                "CPU Load,36.00%",
                "Idle Time,16 ms",
                "Busy Time,9 ms",
                "Missed Deadlines,0",
                "",
                "Task,Deadlines Missed,Avg Jitter (ms)",
                "T,0,10.00",
            ]
        );
    }

    #[test]
    fn metrics_csv_has_buffer_row_and_no_event_log() {
        let run = simulate(
            &[TaskSpec::new("A", 5, 4, 1), TaskSpec::new("B", 5, 4, 2)],
            10,
            Discipline::Priority,
            Mode::Preemptive,
        )
        .unwrap();
        let out = to_string(|w| write_metrics_csv(w, &run));
        let lines: Vec<&str> = out.lines().collect();

        // Ready-set depth per tick is [2,1,1,1,1,2,1,1,1,1] → 1.20.
        assert_eq!(
            lines,
            [
                "Metric,Value",
                "CPU Load,100.00%",
                "Idle Time,0 ms",
                "Busy Time,10 ms",
                "Missed Deadlines,1",
                "Buffer State (avg),1.20",
                "",
                "Task,Deadlines Missed,Avg Jitter (ms)",
                "A,0,5.00",
                "B,1,5.00",
            ]
        );
    }

    #[test]
    fn task_names_with_commas_are_quoted() {
        let run = simulate(
            &[TaskSpec::new("a,b", 2, 1, 1)],
            2,
            Discipline::RoundRobin,
            Mode::Preemptive,
        )
        .unwrap();
        let out = to_string(|w| write_run_csv(w, &run));
        assert!(out.contains("\"a,b\",0,1\n"));
    }

    #[test]
    fn benchmark_csv_marks_failed_rows() {
        let base = vec![TaskSpec::new("A", 5, 1, 1), TaskSpec::new("B", 10, 2, 2)];
        let variations = vec![
            Variation::selectors("PRIORITY", "PREEMPTIVE"),
            Variation::default().with_override(
                "B",
                TaskOverride {
                    period: Some(0),
                    ..Default::default()
                },
            ),
        ];
        let records = BenchmarkHarness::new()
            .run_batch(&base, &variations, 10)
            .unwrap();
        let out = to_string(|w| write_benchmark_csv(w, &records));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "config_id,scheduler,mode,cpu_load,idle_time,busy_time,missed_deadlines,\
             A_jitter,A_missed,B_jitter,B_missed,status"
        );
        assert_eq!(lines[1], "0,Priority,Preemptive,0.4000,6,4,0,5.00,0,0.00,0,ok");
        assert!(lines[2].starts_with("1,Priority,Preemptive,,,,,,,,,failed: "));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn benchmark_csv_of_no_records_is_header_only() {
        let out = to_string(|w| write_benchmark_csv(w, &[]));
        assert_eq!(
            out,
            "config_id,scheduler,mode,cpu_load,idle_time,busy_time,missed_deadlines,status\n"
        );
    }
}
