/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the scheduling engine.
//!
//! Two layers, as with every validation path in this crate:
//!
//! * [`TaskDefect`]: what exactly is wrong with one [`TaskSpec`]
//!   (carries the offending value).
//! * [`SimulationError`]: top-level failure returned from
//!   [`SchedulingEngine::run()`](super::SchedulingEngine::run).
//!
//! All variants are produced before the first tick executes; a run either
//! completes or fails without any partial event log.
//!
//! [`TaskSpec`]: crate::task::TaskSpec

use thiserror::Error;

use crate::task::{Tick, IDLE_LABEL};

// ── Task validation ───────────────────────────────────────────────────────────

/// Reason a single task specification was rejected at run entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDefect {
    /// `period` must be a positive number of ticks.
    NonPositivePeriod { period: Tick },

    /// `execution` must be a positive number of ticks.
    NonPositiveExecution { execution: Tick },

    /// The name is empty (or whitespace only).
    EmptyName,

    /// The name collides with the idle label of the event log.
    ReservedName,
}

impl std::fmt::Display for TaskDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskDefect::NonPositivePeriod { period } => {
                write!(f, "period must be > 0 ticks (got {})", period)
            }
            TaskDefect::NonPositiveExecution { execution } => {
                write!(f, "execution budget must be > 0 ticks (got {})", execution)
            }
            TaskDefect::EmptyName => write!(f, "task name is empty"),
            TaskDefect::ReservedName => {
                write!(f, "'{}' is reserved for idle ticks", IDLE_LABEL)
            }
        }
    }
}

// ── Top-level engine errors ───────────────────────────────────────────────────

/// Error returned by [`SchedulingEngine::run()`](super::SchedulingEngine::run).
///
/// | Variant | Meaning |
/// |---|---|
/// | `InvalidDuration` | `duration_ticks ≤ 0` |
/// | `InvalidTask` | a spec has a non-positive period/budget or a bad name |
/// | `DuplicateTask` | two specs share a name |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("simulation duration must be > 0 ticks (got {0})")]
    InvalidDuration(Tick),

    #[error("invalid task '{task}': {defect}")]
    InvalidTask { task: String, defect: TaskDefect },

    #[error("task name '{task}' appears more than once in the task set")]
    DuplicateTask { task: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_task_message_carries_name_and_value() {
        let e = SimulationError::InvalidTask {
            task: "adc".into(),
            defect: TaskDefect::NonPositivePeriod { period: -3 },
        };
        assert_eq!(
            e.to_string(),
            "invalid task 'adc': period must be > 0 ticks (got -3)"
        );
    }

    #[test]
    fn reserved_name_mentions_idle_label() {
        assert!(TaskDefect::ReservedName.to_string().contains("IDLE"));
    }
}
