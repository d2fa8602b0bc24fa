/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Per-run state and the immutable results a run produces.
//!
//! ```text
//! TaskSpec (input, borrowed)      TaskRuntimeState (engine arena, reset per run)
//!                       \            /
//!                     SchedulingEngine::run
//!                              │
//!                              ▼
//!            SimulationRun { events: Vec<ScheduleEvent>, metrics: Metrics }
//! ```

use serde::Serialize;

use crate::task::{Discipline, Mode, TaskSpec, Tick, IDLE_LABEL};

// ── ScheduleEvent ─────────────────────────────────────────────────────────────

/// One tick of the schedule: `[start, end)` with `end == start + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEvent {
    /// Task name, or [`IDLE_LABEL`] when the processor was idle.
    pub label: String,
    pub start: Tick,
    pub end: Tick,
}

impl ScheduleEvent {
    pub(crate) fn busy(name: &str, t: Tick) -> Self {
        Self {
            label: name.to_string(),
            start: t,
            end: t + 1,
        }
    }

    pub(crate) fn idle(t: Tick) -> Self {
        Self {
            label: IDLE_LABEL.to_string(),
            start: t,
            end: t + 1,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.label == IDLE_LABEL
    }
}

// ── TaskRuntimeState ──────────────────────────────────────────────────────────

/// Engine-owned mutable state of one task for the lifetime of a run.
///
/// Invariant: `0 ≤ remaining_execution ≤ execution budget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRuntimeState {
    pub name: String,

    /// Tick at which the next instance is spawned.
    pub next_release: Tick,

    /// Ticks left in the current instance.  `0` before the first release.
    pub remaining_execution: Tick,

    /// Releases that found the previous instance unfinished.
    pub missed_count: u64,

    /// Ordered `(start, end)` pairs of every tick this task executed.
    pub execution_intervals: Vec<(Tick, Tick)>,

    /// Tick of the most recent release; `None` until the first one.
    pub last_release: Option<Tick>,
}

impl TaskRuntimeState {
    pub(crate) fn fresh(spec: &TaskSpec) -> Self {
        Self {
            name: spec.name.clone(),
            next_release: 0,
            remaining_execution: 0,
            missed_count: 0,
            execution_intervals: Vec::new(),
            last_release: None,
        }
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

/// Per-task slice of [`Metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMetrics {
    pub name: String,

    /// Deadline misses of this task.
    pub missed: u64,

    /// One sample per non-initial release: `|(t - next_release) - period|`,
    /// taken before `next_release` advances.
    ///
    /// Releases fire exactly on their nominal tick, so every sample equals
    /// the task's period.
    pub jitter: Vec<Tick>,

    /// Ticks this task spent on the processor.
    pub busy_ticks: u64,
}

impl TaskMetrics {
    /// Mean jitter, `0.0` when there are no samples.
    pub fn average_jitter(&self) -> f64 {
        if self.jitter.is_empty() {
            0.0
        } else {
            self.jitter.iter().sum::<Tick>() as f64 / self.jitter.len() as f64
        }
    }
}

/// Aggregate counters of one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub idle_ticks: u64,
    pub busy_ticks: u64,
    pub total_missed: u64,

    /// Same order as the input task slice.
    pub tasks: Vec<TaskMetrics>,

    /// Ready-set depth recorded each tick right after releases.
    pub buffer_state: Vec<usize>,
}

impl Metrics {
    /// `busy / (busy + idle)`, `0.0` when no tick was simulated.
    pub fn cpu_load(&self) -> f64 {
        let total = self.busy_ticks + self.idle_ticks;
        if total == 0 {
            0.0
        } else {
            self.busy_ticks as f64 / total as f64
        }
    }

    pub fn task(&self, name: &str) -> Option<&TaskMetrics> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

// ── SimulationRun ─────────────────────────────────────────────────────────────

/// Completed, immutable output of [`SchedulingEngine::run`](super::SchedulingEngine::run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub discipline: Discipline,
    pub mode: Mode,
    pub duration: Tick,

    /// Tiles `[0, duration)` exactly, in time order.
    pub events: Vec<ScheduleEvent>,

    pub metrics: Metrics,
}

impl SimulationRun {
    /// Coalesce consecutive ticks of the same label into `(label, start, end)`
    /// spans.  Handy for timelines; the raw log stays one event per tick.
    pub fn spans(&self) -> Vec<(&str, Tick, Tick)> {
        let mut spans: Vec<(&str, Tick, Tick)> = Vec::new();
        for ev in &self.events {
            match spans.last_mut() {
                Some((label, _, end)) if *label == ev.label && *end == ev.start => *end = ev.end,
                _ => spans.push((ev.label.as_str(), ev.start, ev.end)),
            }
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_load_of_empty_metrics_is_zero() {
        assert_eq!(Metrics::default().cpu_load(), 0.0);
    }

    #[test]
    fn average_jitter_without_samples_is_zero() {
        let m = TaskMetrics {
            name: "a".into(),
            missed: 0,
            jitter: vec![],
            busy_ticks: 0,
        };
        assert_eq!(m.average_jitter(), 0.0);
    }

    #[test]
    fn average_jitter_is_arithmetic_mean() {
        let m = TaskMetrics {
            name: "a".into(),
            missed: 0,
            jitter: vec![0, 1, 2],
            busy_ticks: 0,
        };
        assert!((m.average_jitter() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spans_coalesce_adjacent_ticks() {
        let run = SimulationRun {
            discipline: Discipline::Priority,
            mode: Mode::Preemptive,
            duration: 4,
            events: vec![
                ScheduleEvent::busy("A", 0),
                ScheduleEvent::busy("A", 1),
                ScheduleEvent::idle(2),
                ScheduleEvent::busy("A", 3),
            ],
            metrics: Metrics::default(),
        };
        assert_eq!(
            run.spans(),
            vec![("A", 0, 2), ("IDLE", 2, 3), ("A", 3, 4)]
        );
    }
}
