/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Named task store feeding the engine.
//!
//! [`TaskRegistry`] is an upsert-by-name CRUD store over [`TaskSpec`].  Raw
//! user input (CLI flags, config strings) is coerced at this boundary; the
//! registry does **not** judge whether the numbers make a sensible task;
//! the engine rejects those at run entry.
//!
//! Insertion order is preserved and becomes the engine's release order, so
//! two runs of the same registry are always identical.

use thiserror::Error;
use tracing::{debug, info};

use crate::task::{TaskSpec, Tick};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Rejected registry input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A numeric field could not be parsed as a base-10 integer.
    #[error("task '{task}': {field} must be an integer (got '{value}')")]
    NotNumeric {
        task: String,
        field: &'static str,
        value: String,
    },

    /// A new task was inserted without one of its three numeric fields.
    #[error("task '{task}': {field} is required for a new task")]
    MissingField { task: String, field: &'static str },

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Representative preload: a sampling task, a filter and a transmitter.
fn default_tasks() -> Vec<TaskSpec> {
    vec![
        TaskSpec::new("ADC", 10, 2, 2),
        TaskSpec::new("Filter", 30, 6, 1),
        TaskSpec::new("DataTX", 20, 4, 3),
    ]
}

/// Trim and parse one numeric field.
fn coerce<T: std::str::FromStr>(
    task: &str,
    field: &'static str,
    raw: &str,
) -> Result<T, RegistryError> {
    raw.trim().parse::<T>().map_err(|_| RegistryError::NotNumeric {
        task: task.to_string(),
        field,
        value: raw.to_string(),
    })
}

// ── TaskRegistry ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<TaskSpec>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    /// Registry preloaded with the default 3-task set.
    pub fn new() -> Self {
        Self {
            tasks: default_tasks(),
        }
    }

    /// Registry with no tasks at all.
    pub fn empty() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Drop every change and restore the default preload.
    pub fn reset(&mut self) {
        self.tasks = default_tasks();
        info!("Task registry reset to defaults");
    }

    /// Insert or update a task from raw text fields.
    ///
    /// * Existing task: every `Some` field is replaced, `None` fields keep
    ///   their value.
    /// * New task: all three fields are required.
    ///
    /// All provided fields are coerced before anything is written, so a
    /// rejected call never leaves a half-updated task behind.
    ///
    /// # Errors
    /// [`RegistryError::NotNumeric`] for non-integer text,
    /// [`RegistryError::MissingField`] for an incomplete new task,
    /// [`RegistryError::EmptyName`] for a blank name.
    pub fn upsert(
        &mut self,
        name: &str,
        period: Option<&str>,
        execution: Option<&str>,
        priority: Option<&str>,
    ) -> Result<(), RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let period: Option<Tick> = period.map(|v| coerce(name, "period", v)).transpose()?;
        let execution: Option<Tick> = execution
            .map(|v| coerce(name, "execution", v))
            .transpose()?;
        let priority: Option<i32> = priority.map(|v| coerce(name, "priority", v)).transpose()?;

        match self.tasks.iter_mut().find(|t| t.name == name) {
            Some(task) => {
                if let Some(p) = period {
                    task.period = p;
                }
                if let Some(e) = execution {
                    task.execution = e;
                }
                if let Some(p) = priority {
                    task.priority = p;
                }
                debug!(task = %name, period = task.period, execution = task.execution, priority = task.priority, "task updated");
            }
            None => {
                let missing = |field| RegistryError::MissingField {
                    task: name.to_string(),
                    field,
                };
                let spec = TaskSpec::new(
                    name,
                    period.ok_or_else(|| missing("period"))?,
                    execution.ok_or_else(|| missing("execution"))?,
                    priority.ok_or_else(|| missing("priority"))?,
                );
                debug!(task = %name, period = spec.period, execution = spec.execution, priority = spec.priority, "task added");
                self.tasks.push(spec);
            }
        }

        Ok(())
    }

    /// Insert or replace a fully typed spec, keeping the position of an
    /// existing entry with the same name.
    pub fn upsert_spec(&mut self, spec: TaskSpec) {
        match self.tasks.iter_mut().find(|t| t.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.tasks.push(spec),
        }
    }

    /// Remove `name`.  Returns the removed spec; absent names are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<TaskSpec> {
        let pos = self.tasks.iter().position(|t| t.name == name)?;
        debug!(task = %name, "task removed");
        Some(self.tasks.remove(pos))
    }

    /// Remove every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Owned copy of the current task set, in insertion order.
    pub fn snapshot(&self) -> Vec<TaskSpec> {
        self.tasks.clone()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
