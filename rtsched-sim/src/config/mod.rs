/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Simulation configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! duration: 100
//! discipline: priority        # priority | round_robin
//! mode: preemptive            # preemptive | cooperative
//! quantum: 5                  # accepted, has no effect
//! tasks:
//!   - { name: ADC, period: 10, execution: 2, priority: 2 }
//!   - { name: Filter, period: "30", execution: "6", priority: "1" }
//! variations:
//!   - { discipline: PRIORITY, mode: PREEMPTIVE }
//!   - discipline: ROUND_ROBIN
//!     tasks:
//!       ADC: { period: 5 }
//! ```
//!
//! Every key is optional.  When `tasks` is present it replaces the registry
//! preload entirely; numeric task fields may be integers or strings, and
//! strings go through the same coercion as CLI input.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::benchmark::Variation;
use crate::registry::{RegistryError, TaskRegistry};
use crate::task::{Discipline, Mode, Tick};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot open configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid task entry: {0}")]
    Registry(#[from] RegistryError),
}

// ── Private YAML deserialization types ────────────────────────────────────────

/// A numeric field that may be written as `10` or `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Text(String),
}

impl Numeric {
    fn as_text(&self) -> String {
        match self {
            Numeric::Int(v) => v.to_string(),
            Numeric::Text(s) => s.clone(),
        }
    }
}

/// One entry of the `tasks:` list as it appears in the file.
#[derive(Debug, Clone, Deserialize)]
struct TaskEntry {
    name: String,
    #[serde(default, alias = "period_ms")]
    period: Option<Numeric>,
    #[serde(default, alias = "exec_ms")]
    execution: Option<Numeric>,
    #[serde(default)]
    priority: Option<Numeric>,
}

// ── SimulationConfig ──────────────────────────────────────────────────────────

/// Parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub duration: Option<Tick>,

    #[serde(default)]
    pub discipline: Option<Discipline>,

    #[serde(default)]
    pub mode: Option<Mode>,

    #[serde(default)]
    pub quantum: Option<Tick>,

    #[serde(default)]
    tasks: Option<Vec<TaskEntry>>,

    /// Benchmark configurations, in configuration-id order.
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl SimulationConfig {
    /// Parse `path`.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Parse`]
    /// when the YAML is structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading simulation configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let cfg = Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            duration = ?cfg.duration,
            discipline = ?cfg.discipline,
            mode = ?cfg.mode,
            tasks = cfg.tasks.as_ref().map_or(0, Vec::len),
            variations = cfg.variations.len(),
            "Configuration loaded"
        );
        Ok(cfg)
    }

    /// Parse a YAML document.  An empty document is an empty configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Whether the file supplies its own task list.
    pub fn has_tasks(&self) -> bool {
        self.tasks.is_some()
    }

    /// Write the configured tasks into `registry`.
    ///
    /// With a `tasks:` key the registry is cleared first; without one it is
    /// left untouched.  Entries are applied in file order, so a failing entry
    /// leaves the earlier ones in place.
    ///
    /// # Errors
    /// [`ConfigError::Registry`] for a non-numeric or incomplete entry.
    pub fn apply_tasks(&self, registry: &mut TaskRegistry) -> Result<(), ConfigError> {
        let Some(entries) = &self.tasks else {
            debug!("No tasks in configuration, keeping registry as is");
            return Ok(());
        };

        if entries.is_empty() {
            warn!("Configuration declares an empty task list");
        }

        registry.clear();
        for entry in entries {
            let period = entry.period.as_ref().map(Numeric::as_text);
            let execution = entry.execution.as_ref().map(Numeric::as_text);
            let priority = entry.priority.as_ref().map(Numeric::as_text);
            registry.upsert(
                &entry.name,
                period.as_deref(),
                execution.as_deref(),
                priority.as_deref(),
            )?;
        }

        info!("Registry now holds {} task(s) from configuration", registry.len());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
