/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Parameter-sweep harness over the scheduling engine.
//!
//! Each [`Variation`] describes one configuration: per-task field overrides
//! merged onto a copy of the base task set, plus optional discipline / mode
//! selector strings.  [`BenchmarkHarness::run_batch`] simulates every
//! variation on its own fresh engine and returns one [`BenchmarkRecord`] per
//! variation, in input order.  The record index is the configuration id.
//!
//! # Selector resolution
//! Selectors are matched case-insensitively on the variant name.  Anything
//! unrecognised resolves to the default (`Priority`, `Preemptive`) and is
//! reported as a [`VariationNote`]; it never fails the batch.
//!
//! # Failure policy
//! | Failure | Effect |
//! |---|---|
//! | `duration ≤ 0` | whole batch rejected before any run |
//! | invalid task set in one variation | that record's outcome is [`RecordOutcome::Failed`]; the rest still run |
//!
//! Records are never dropped, so `records[i].config_id == i` always holds.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scheduler::{SchedulingEngine, SimulationError, SimulationRun};
use crate::task::{Discipline, Mode, TaskSpec, Tick};

// ── Variation input ───────────────────────────────────────────────────────────

/// Optional replacement values for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOverride {
    #[serde(default, alias = "period_ms")]
    pub period: Option<Tick>,
    #[serde(default, alias = "exec_ms")]
    pub execution: Option<Tick>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl TaskOverride {
    fn apply(&self, spec: &mut TaskSpec) {
        if let Some(p) = self.period {
            spec.period = p;
        }
        if let Some(e) = self.execution {
            spec.execution = e;
        }
        if let Some(p) = self.priority {
            spec.priority = p;
        }
    }
}

/// One benchmark configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Task name → overrides.  Sorted so notes come out deterministically.
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskOverride>,

    /// Discipline selector, e.g. `"ROUND_ROBIN"`.
    #[serde(default, alias = "sched_type")]
    pub discipline: Option<String>,

    /// Mode selector, e.g. `"COOPERATIVE"`.
    #[serde(default)]
    pub mode: Option<String>,
}

impl Variation {
    /// Variation that only picks a discipline and a mode.
    pub fn selectors(discipline: &str, mode: &str) -> Self {
        Self {
            discipline: Some(discipline.to_string()),
            mode: Some(mode.to_string()),
            ..Default::default()
        }
    }

    /// Add an override for `task`.
    pub fn with_override(mut self, task: &str, ov: TaskOverride) -> Self {
        self.tasks.insert(task.to_string(), ov);
        self
    }
}

/// The three configurations compared when no variations are supplied.
pub fn default_variations() -> Vec<Variation> {
    vec![
        Variation::selectors("PRIORITY", "PREEMPTIVE"),
        Variation::selectors("PRIORITY", "COOPERATIVE"),
        Variation::selectors("ROUND_ROBIN", "PREEMPTIVE"),
    ]
}

// ── Output records ────────────────────────────────────────────────────────────

/// Informational remark attached to a record.  Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariationNote {
    UnknownDiscipline { selector: String },
    UnknownMode { selector: String },
    /// An override named a task that is not in the base set; it was ignored.
    UnknownTask { task: String },
}

impl fmt::Display for VariationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariationNote::UnknownDiscipline { selector } => write!(
                f,
                "unknown discipline '{}', using {}",
                selector,
                Discipline::default()
            ),
            VariationNote::UnknownMode { selector } => {
                write!(f, "unknown mode '{}', using {}", selector, Mode::default())
            }
            VariationNote::UnknownTask { task } => {
                write!(f, "override for unknown task '{}' ignored", task)
            }
        }
    }
}

/// Per-task figures of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub average_jitter: f64,
    pub missed: u64,
}

/// Aggregate figures of one completed configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMetrics {
    pub cpu_load: f64,
    pub idle_ticks: u64,
    pub busy_ticks: u64,
    pub total_missed: u64,
    pub tasks: Vec<TaskSummary>,
}

impl RecordMetrics {
    fn from_run(run: &SimulationRun) -> Self {
        let m = &run.metrics;
        Self {
            cpu_load: m.cpu_load(),
            idle_ticks: m.idle_ticks,
            busy_ticks: m.busy_ticks,
            total_missed: m.total_missed,
            tasks: m
                .tasks
                .iter()
                .map(|t| TaskSummary {
                    name: t.name.clone(),
                    average_jitter: t.average_jitter(),
                    missed: t.missed,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Completed(RecordMetrics),
    /// The variation's task set failed validation; nothing was simulated.
    Failed(SimulationError),
}

/// Result of one variation.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    /// Index of the variation in the input list.
    pub config_id: usize,
    pub discipline: Discipline,
    pub mode: Mode,
    pub notes: Vec<VariationNote>,
    pub outcome: RecordOutcome,
}

impl BenchmarkRecord {
    /// Metrics of a completed run, `None` for a failed one.
    pub fn metrics(&self) -> Option<&RecordMetrics> {
        match &self.outcome {
            RecordOutcome::Completed(m) => Some(m),
            RecordOutcome::Failed(_) => None,
        }
    }
}

// ── Resolution helpers ────────────────────────────────────────────────────────

/// Resolve the two selectors of `variation`, noting any fallback.
pub fn resolve_selectors(
    variation: &Variation,
    notes: &mut Vec<VariationNote>,
) -> (Discipline, Mode) {
    let discipline = match variation.discipline.as_deref() {
        None => Discipline::default(),
        Some(s) => Discipline::from_selector(s).unwrap_or_else(|| {
            notes.push(VariationNote::UnknownDiscipline {
                selector: s.to_string(),
            });
            Discipline::default()
        }),
    };
    let mode = match variation.mode.as_deref() {
        None => Mode::default(),
        Some(s) => Mode::from_selector(s).unwrap_or_else(|| {
            notes.push(VariationNote::UnknownMode {
                selector: s.to_string(),
            });
            Mode::default()
        }),
    };
    (discipline, mode)
}

/// Copy `base` and merge the variation's overrides onto it.
pub fn apply_overrides(
    base: &[TaskSpec],
    variation: &Variation,
    notes: &mut Vec<VariationNote>,
) -> Vec<TaskSpec> {
    let mut tasks = base.to_vec();
    for (name, ov) in &variation.tasks {
        match tasks.iter_mut().find(|t| &t.name == name) {
            Some(spec) => ov.apply(spec),
            None => notes.push(VariationNote::UnknownTask { task: name.clone() }),
        }
    }
    tasks
}

// ── BenchmarkHarness ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct BenchmarkHarness {
    parallel: bool,
    /// Worker cap for parallel batches; `None` uses the available parallelism.
    max_threads: Option<NonZeroUsize>,
}

impl BenchmarkHarness {
    /// Sequential harness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run variations on scoped threads.  Output order is unaffected.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Cap the number of variations simulated at once in parallel mode.
    pub fn with_max_threads(mut self, max_threads: NonZeroUsize) -> Self {
        self.max_threads = Some(max_threads);
        self
    }

    fn worker_count(&self) -> usize {
        self.max_threads
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    /// Simulate every variation for `duration` ticks.
    ///
    /// # Errors
    /// Only [`SimulationError::InvalidDuration`]; per-variation failures are
    /// carried in the records.
    pub fn run_batch(
        &self,
        base: &[TaskSpec],
        variations: &[Variation],
        duration: Tick,
    ) -> Result<Vec<BenchmarkRecord>, SimulationError> {
        if duration <= 0 {
            return Err(SimulationError::InvalidDuration(duration));
        }

        info!(
            variations = variations.len(),
            base_tasks = base.len(),
            duration,
            parallel = self.parallel,
            "=== BenchmarkHarness::run_batch() ==="
        );

        let records: Vec<BenchmarkRecord> = if self.parallel {
            let workers = self.worker_count();
            debug!(workers, "Running variations in parallel chunks");
            let mut records = Vec::with_capacity(variations.len());
            for (chunk_idx, chunk) in variations.chunks(workers).enumerate() {
                let offset = chunk_idx * workers;
                thread::scope(|scope| {
                    let handles: Vec<_> = chunk
                        .iter()
                        .enumerate()
                        .map(|(i, v)| {
                            scope.spawn(move || run_variation(offset + i, base, v, duration))
                        })
                        .collect();
                    records.extend(
                        handles
                            .into_iter()
                            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e))),
                    );
                });
            }
            records
        } else {
            variations
                .iter()
                .enumerate()
                .map(|(id, v)| run_variation(id, base, v, duration))
                .collect()
        };

        info!(
            completed = records.iter().filter(|r| r.metrics().is_some()).count(),
            failed = records.iter().filter(|r| r.metrics().is_none()).count(),
            "=== Benchmark complete ==="
        );
        Ok(records)
    }
}

/// Build, simulate and summarise one variation on a fresh engine.
fn run_variation(
    config_id: usize,
    base: &[TaskSpec],
    variation: &Variation,
    duration: Tick,
) -> BenchmarkRecord {
    let mut notes = Vec::new();
    let (discipline, mode) = resolve_selectors(variation, &mut notes);
    let tasks = apply_overrides(base, variation, &mut notes);

    for note in &notes {
        warn!(config_id, "{}", note);
    }

    let outcome = match SchedulingEngine::new().run(&tasks, duration, discipline, mode) {
        Ok(run) => {
            let metrics = RecordMetrics::from_run(&run);
            info!(
                config_id,
                discipline = %discipline,
                mode = %mode,
                cpu_load = metrics.cpu_load,
                missed = metrics.total_missed,
                "variation done"
            );
            RecordOutcome::Completed(metrics)
        }
        Err(e) => {
            warn!(config_id, error = %e, "variation failed validation");
            RecordOutcome::Failed(e)
        }
    };

    BenchmarkRecord {
        config_id,
        discipline,
        mode,
        notes,
        outcome,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
