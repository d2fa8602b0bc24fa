/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use rtsched_sim::benchmark::{default_variations, BenchmarkHarness};
use rtsched_sim::config::SimulationConfig;
use rtsched_sim::hyperperiod::{self, HyperperiodError, DEFAULT_HYPERPERIOD_LIMIT};
use rtsched_sim::registry::TaskRegistry;
use rtsched_sim::report::{self, text};
use rtsched_sim::scheduler::{simulate, SimulationRun};
use rtsched_sim::task::{Discipline, Mode, TaskSpec, Tick};

/// Benchmark duration used when neither the CLI nor the config sets one.
const DEFAULT_BENCHMARK_DURATION: Tick = 200;

/// Run length when nothing sets one and the task set has no hyperperiod.
const DEFAULT_SIMULATION_DURATION: Tick = 100;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Periodic real-time scheduling simulator.
///
/// Example:
///   rtsched-sim simulate --discipline round-robin --mode cooperative \
///               --task Motor=15,3,0 --duration 60 --timeline
#[derive(Debug, Parser)]
#[command(
    name = "rtsched-sim",
    about = "Tick-driven periodic real-time scheduling simulator",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one simulation and print its metrics.
    Simulate(SimulateArgs),
    /// FreeRTOS-style preset: priority, preemptive, 1 tick = 1/tick-rate s.
    Rtos(RtosArgs),
    /// Run a batch of configurations and compare them.
    Benchmark(BenchmarkArgs),
    /// Print the task set after applying config and edits.
    Tasks(TaskSetArgs),
}

/// Options that shape the task set; shared by every subcommand.
#[derive(Debug, Clone, Args)]
struct TaskSetArgs {
    /// YAML simulation configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Add or update a task. Empty fields keep the current value, e.g. `ADC=,5,`.
    #[arg(short = 't', long = "task", value_name = "NAME=PERIOD,EXEC,PRIO")]
    tasks: Vec<String>,

    /// Remove a task by name.
    #[arg(short = 'r', long = "remove", value_name = "NAME")]
    remove: Vec<String>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    task_set: TaskSetArgs,

    #[arg(long, value_enum)]
    discipline: Option<DisciplineArg>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Ticks to simulate. Defaults to the hyperperiod.
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    duration: Option<Tick>,

    /// Time quantum. Accepted for compatibility; the engine always uses 1 tick.
    #[arg(short = 'q', long)]
    quantum: Option<Tick>,

    /// Write the run CSV here.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the metric block and per-task table (no event log) here.
    #[arg(long)]
    metrics_csv: Option<PathBuf>,

    /// Print a text timeline of the schedule.
    #[arg(long, default_value_t = false)]
    timeline: bool,
}

#[derive(Debug, Args)]
struct RtosArgs {
    #[command(flatten)]
    task_set: TaskSetArgs,

    /// Ticks to simulate. Defaults to the hyperperiod.
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    duration: Option<Tick>,

    /// Kernel tick rate used to convert ticks to wall time.
    #[arg(long, default_value_t = 1000)]
    tick_rate_hz: u32,

    /// Write the run CSV here.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the metric block and per-task table (no event log) here.
    #[arg(long)]
    metrics_csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BenchmarkArgs {
    #[command(flatten)]
    task_set: TaskSetArgs,

    /// Ticks per configuration.
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    duration: Option<Tick>,

    /// Write the comparison CSV here.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the markdown summary here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Leave the SystemVerilog appendix out of the markdown summary.
    #[arg(long, default_value_t = false)]
    no_appendix: bool,

    /// Run configurations on parallel threads.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DisciplineArg {
    #[value(alias = "round_robin")]
    RoundRobin,
    Priority,
}

impl From<DisciplineArg> for Discipline {
    fn from(arg: DisciplineArg) -> Self {
        match arg {
            DisciplineArg::RoundRobin => Discipline::RoundRobin,
            DisciplineArg::Priority => Discipline::Priority,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Preemptive,
    Cooperative,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Preemptive => Mode::Preemptive,
            ModeArg::Cooperative => Mode::Cooperative,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Simulate(args) => run_simulate(args),
        Command::Rtos(args) => run_rtos(args),
        Command::Benchmark(args) => run_benchmark(args),
        Command::Tasks(args) => run_tasks(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

// ── Task set assembly ─────────────────────────────────────────────────────────

/// Load the optional config, seed the registry and apply CLI edits.
fn load_task_set(args: &TaskSetArgs) -> Result<(TaskRegistry, SimulationConfig)> {
    let config = match &args.config {
        Some(path) => SimulationConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => {
            info!("No configuration file provided, using default task set");
            SimulationConfig::default()
        }
    };

    let mut registry = TaskRegistry::new();
    config.apply_tasks(&mut registry)?;

    for raw in &args.tasks {
        let (name, period, execution, priority) = parse_task_arg(raw)?;
        registry
            .upsert(name, period, execution, priority)
            .with_context(|| format!("Invalid --task '{raw}'"))?;
    }
    for name in &args.remove {
        if registry.remove(name).is_none() {
            warn!(task = %name, "--remove: no such task");
        }
    }

    Ok((registry, config))
}

type TaskFields<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Option<&'a str>);

/// Split `NAME=PERIOD,EXEC,PRIO`; empty fields become `None`.
fn parse_task_arg(raw: &str) -> Result<TaskFields<'_>> {
    let Some((name, fields)) = raw.split_once('=') else {
        bail!("--task '{raw}': expected NAME=PERIOD,EXEC,PRIO");
    };
    let parts: Vec<&str> = fields.split(',').collect();
    if parts.len() != 3 {
        bail!(
            "--task '{raw}': expected 3 comma-separated fields, got {}",
            parts.len()
        );
    }
    Ok((
        name,
        non_empty(parts[0]),
        non_empty(parts[1]),
        non_empty(parts[2]),
    ))
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}

/// CLI value, then config value, then the task-set hyperperiod.
///
/// A hyperperiod over the limit is capped at the limit; an empty or
/// unusable task set runs for [`DEFAULT_SIMULATION_DURATION`].
fn resolve_duration(cli: Option<Tick>, config: Option<Tick>, tasks: &[TaskSpec]) -> Tick {
    if let Some(d) = cli.or(config) {
        return d;
    }
    match hyperperiod::calculate(tasks, DEFAULT_HYPERPERIOD_LIMIT) {
        Ok(info) => {
            info!(
                hyperperiod = info.hyperperiod,
                "Using hyperperiod as simulation duration"
            );
            info.hyperperiod
        }
        Err(HyperperiodError::NoValidPeriods) => {
            warn!(
                duration = DEFAULT_SIMULATION_DURATION,
                "No task periods to derive a hyperperiod from, using default duration"
            );
            DEFAULT_SIMULATION_DURATION
        }
        Err(e) => {
            warn!("{e}; capping duration at {DEFAULT_HYPERPERIOD_LIMIT}");
            DEFAULT_HYPERPERIOD_LIMIT
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_simulate(args: SimulateArgs) -> Result<()> {
    let (registry, config) = load_task_set(&args.task_set)?;
    let tasks = registry.snapshot();

    let discipline = args
        .discipline
        .map(Discipline::from)
        .or(config.discipline)
        .unwrap_or_default();
    let mode = args.mode.map(Mode::from).or(config.mode).unwrap_or_default();
    if let Some(q) = args.quantum.or(config.quantum) {
        warn!(
            quantum = q,
            "Time quantum is ignored; the engine always uses a 1-tick quantum"
        );
    }
    let duration = resolve_duration(args.duration, config.duration, &tasks);

    let run = simulate(&tasks, duration, discipline, mode).context("Simulation failed")?;
    print_run(&run, None);

    if args.timeline {
        println!();
        print!("{}", text::timeline(&run));
    }
    if let Some(path) = &args.csv {
        report::export_run_csv(path, &run)?;
    }
    if let Some(path) = &args.metrics_csv {
        report::export_metrics_csv(path, &run)?;
    }
    Ok(())
}

fn run_rtos(args: RtosArgs) -> Result<()> {
    if args.tick_rate_hz == 0 {
        bail!("--tick-rate-hz must be positive");
    }
    let (registry, config) = load_task_set(&args.task_set)?;
    let tasks = registry.snapshot();
    let duration = resolve_duration(args.duration, config.duration, &tasks);

    info!(
        tick_rate_hz = args.tick_rate_hz,
        tick_ms = 1000.0 / f64::from(args.tick_rate_hz),
        "FreeRTOS preset: priority, preemptive"
    );
    let run = simulate(&tasks, duration, Discipline::Priority, Mode::Preemptive)
        .context("RTOS simulation failed")?;
    print_run(&run, Some(args.tick_rate_hz));

    if let Some(path) = &args.csv {
        report::export_run_csv(path, &run)?;
    }
    if let Some(path) = &args.metrics_csv {
        report::export_metrics_csv(path, &run)?;
    }
    Ok(())
}

fn run_benchmark(args: BenchmarkArgs) -> Result<()> {
    let (registry, config) = load_task_set(&args.task_set)?;
    let tasks = registry.snapshot();
    let duration = args
        .duration
        .or(config.duration)
        .unwrap_or(DEFAULT_BENCHMARK_DURATION);

    let variations = if config.variations.is_empty() {
        info!("No variations configured, comparing the default three");
        default_variations()
    } else {
        config.variations
    };

    let records = BenchmarkHarness::new()
        .with_parallel(args.parallel)
        .run_batch(&tasks, &variations, duration)
        .context("Benchmark failed")?;

    print!("{}", text::comparison_table(&records));

    if let Some(path) = &args.csv {
        report::export_benchmark_csv(path, &records)?;
    }
    if let Some(path) = &args.report {
        report::export_summary_markdown(path, &records, !args.no_appendix)?;
    }
    Ok(())
}

fn run_tasks(args: TaskSetArgs) -> Result<()> {
    let (registry, _) = load_task_set(&args)?;
    println!(
        "{:<12} {:>8} {:>10} {:>9} {:>12}",
        "Task", "Period", "Execution", "Priority", "Utilization"
    );
    for t in registry.iter() {
        println!(
            "{:<12} {:>8} {:>10} {:>9} {:>11.1}%",
            t.name,
            t.period,
            t.execution,
            t.priority,
            t.utilization() * 100.0
        );
    }
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Print aggregate and per-task metrics. With a tick rate, ticks are also
/// shown as milliseconds.
fn print_run(run: &SimulationRun, tick_rate_hz: Option<u32>) {
    let m = &run.metrics;
    let as_time = |ticks: u64| match tick_rate_hz {
        Some(hz) => format!(
            "{} ticks ({:.1} ms)",
            ticks,
            ticks as f64 * 1000.0 / f64::from(hz)
        ),
        None => format!("{ticks} ticks"),
    };

    println!("Scheduler:         {} / {}", run.discipline, run.mode);
    println!("Duration:          {}", as_time(run.duration.max(0) as u64));
    println!("CPU load:          {:.2}%", m.cpu_load() * 100.0);
    println!("Busy time:         {}", as_time(m.busy_ticks));
    println!("Idle time:         {}", as_time(m.idle_ticks));
    println!("Missed deadlines:  {}", m.total_missed);
    println!();
    println!("{:<12} {:>8} {:>8} {:>12}", "Task", "Busy", "Missed", "Avg jitter");
    for t in &m.tasks {
        println!(
            "{:<12} {:>8} {:>8} {:>12.2}",
            t.name,
            t.busy_ticks,
            t.missed,
            t.average_jitter()
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
