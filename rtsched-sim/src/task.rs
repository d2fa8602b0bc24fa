/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures shared by the registry, the engine and the
//! benchmark harness.
//!
//! ```text
//! TaskRegistry ──(snapshot: Vec<TaskSpec>)──►  SchedulingEngine  ──►  SimulationRun
//!                                                   ▲
//!                                   Discipline × Mode (two tagged unions)
//! ```
//!
//! A [`TaskSpec`] is plain data.  All per-run mutable state lives in the
//! engine's own arena (see [`crate::scheduler::TaskRuntimeState`]), so the
//! same specs can be fed into any number of runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One simulated time unit.  Signed so that malformed input (negative periods
/// or durations) can be represented and rejected with a precise error.
pub type Tick = i64;

/// Label used in the event log for ticks where no task ran.
pub const IDLE_LABEL: &str = "IDLE";

// ── Discipline ────────────────────────────────────────────────────────────────

/// Policy that picks which ready task is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// FIFO ready queue; multi-tick tasks rotate one tick at a time.
    #[serde(alias = "ROUND_ROBIN")]
    RoundRobin,
    /// Numerically smallest priority wins; ties go to queue order.
    #[default]
    #[serde(alias = "PRIORITY")]
    Priority,
}

impl Discipline {
    /// Parse a selector string as used in benchmark variations.
    ///
    /// Matching is case-insensitive on the variant name (`PRIORITY`,
    /// `ROUND_ROBIN`).  Returns `None` for anything else so the caller can
    /// decide whether to fall back to the default.
    pub fn from_selector(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ROUND_ROBIN" => Some(Discipline::RoundRobin),
            "PRIORITY" => Some(Discipline::Priority),
            _ => None,
        }
    }

    /// Human-readable name used in reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Discipline::RoundRobin => "Round Robin",
            Discipline::Priority => "Priority",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── Mode ──────────────────────────────────────────────────────────────────────

/// Whether dispatch may evict a running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A scheduling decision is taken on every tick.
    #[default]
    #[serde(alias = "PREEMPTIVE")]
    Preemptive,
    /// The running task keeps the processor until its instance completes.
    #[serde(alias = "COOPERATIVE")]
    Cooperative,
}

impl Mode {
    /// Parse a selector string (`PREEMPTIVE`, `COOPERATIVE`), case-insensitive.
    pub fn from_selector(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PREEMPTIVE" => Some(Mode::Preemptive),
            "COOPERATIVE" => Some(Mode::Cooperative),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Preemptive => "Preemptive",
            Mode::Cooperative => "Cooperative",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── TaskSpec ──────────────────────────────────────────────────────────────────

/// Static description of one periodic task.
///
/// Identity is the `name`.  Values are not validated here; the engine rejects
/// non-positive `period` / `execution` at run entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique task name within a task set.
    pub name: String,

    /// Ticks between successive releases.
    pub period: Tick,

    /// Ticks of processor time one instance needs.
    pub execution: Tick,

    /// Lower value = higher priority.
    pub priority: i32,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, period: Tick, execution: Tick, priority: i32) -> Self {
        Self {
            name: name.into(),
            period,
            execution,
            priority,
        }
    }

    /// Processor utilisation fraction: `execution / period`.
    ///
    /// Returns `0.0` for a non-positive period.
    pub fn utilization(&self) -> f64 {
        if self.period <= 0 {
            0.0
        } else {
            self.execution as f64 / self.period as f64
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
