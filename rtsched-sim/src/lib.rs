/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! rtsched-sim – tick-driven periodic real-time scheduling simulator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – TaskSpec, Discipline, Mode, Tick
//! ├── registry/     – named task store, input coercion
//! ├── scheduler/    – SchedulingEngine, run state, metrics, feasibility
//! ├── hyperperiod/  – LCM / GCD helpers, default run length
//! ├── benchmark/    – parameter-sweep harness
//! ├── config/       – YAML simulation / benchmark configuration
//! └── report/       – CSV, markdown and text renderings
//! ```

pub mod benchmark;
pub mod config;
pub mod hyperperiod;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod task;
