//! Hyperperiod of a task set.
//!
//! The hyperperiod is the LCM of all task periods: after that many ticks the
//! release pattern of the whole set repeats, which makes it the natural
//! default simulation length when the user does not pick one.
//!
//! | Failure | Variant |
//! |---------|---------|
//! | no task with a positive period | `NoValidPeriods` |
//! | LCM exceeds `i64` | `Overflow` |
//! | LCM above the caller's cap | `TooLarge` |

pub mod math;

use tracing::{debug, info, warn};

use crate::task::{TaskSpec, Tick};
use math::lcm_of_slice;

/// Default cap used by the CLI when deriving a duration from the hyperperiod.
pub const DEFAULT_HYPERPERIOD_LIMIT: Tick = 100_000;

// ── Error type ────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum HyperperiodError {
    /// The task slice was empty or every period was non-positive.
    NoValidPeriods,

    /// LCM computation overflowed.
    Overflow { a: Tick, b: Tick },

    /// The hyperperiod exceeds the configured cap.
    TooLarge { value: Tick, limit: Tick },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::NoValidPeriods => {
                write!(f, "no tasks with a valid (positive) period")
            }
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyperperiod {value} ticks exceeds limit {limit} ticks")
            }
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    /// LCM of all unique positive periods.
    pub hyperperiod: Tick,

    /// Unique periods present in the set (sorted, deduplicated).
    pub unique_periods: Vec<Tick>,

    /// Number of tasks that contributed a period.
    pub task_count: usize,
}

/// Compute the hyperperiod of `tasks`, rejecting anything above `limit`.
///
/// Tasks with a non-positive period are skipped; the engine will reject them
/// later with a precise error, so they are not this function's concern.
pub fn calculate(tasks: &[TaskSpec], limit: Tick) -> Result<HyperperiodInfo, HyperperiodError> {
    let mut unique_periods: Vec<Tick> = tasks
        .iter()
        .filter(|t| t.period > 0)
        .map(|t| t.period)
        .collect();
    let task_count = unique_periods.len();

    if unique_periods.is_empty() {
        warn!("No tasks with valid periods; cannot derive a hyperperiod");
        return Err(HyperperiodError::NoValidPeriods);
    }

    unique_periods.sort_unstable();
    unique_periods.dedup();

    let hyperperiod = lcm_of_slice(&unique_periods)?;
    if hyperperiod > limit {
        warn!(hyperperiod, limit, "Hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit,
        });
    }

    info!(
        hyperperiod,
        task_count,
        unique_count = unique_periods.len(),
        "Calculated hyperperiod"
    );
    for p in &unique_periods {
        debug!(period = p, "  unique period");
    }

    Ok(HyperperiodInfo {
        hyperperiod,
        unique_periods,
        task_count,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
