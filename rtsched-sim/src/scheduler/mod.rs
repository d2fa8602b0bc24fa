//! Tick-driven scheduling engine.
//!
//! [`SchedulingEngine`] advances a simulated clock one tick at a time over a
//! set of periodic [`TaskSpec`]s, releasing instances, dispatching them
//! according to a [`Discipline`] and [`Mode`], and recording every tick in an
//! event log plus aggregate [`Metrics`].
//!
//! # Per-tick algorithm
//!
//! | Step | What happens |
//! |---|---|
//! | 1. Release | Every task with `next_release ≤ t` spawns a new instance.  An unfinished previous instance counts as a miss and its work is discarded. |
//! | 2. Buffer | Ready-set depth is recorded. |
//! | 3. Completion | A running task with no remaining work is unassigned. |
//! | 4. Dispatch | Only when idle or preemptive: round-robin pops the queue head, priority picks the smallest priority value (stable). |
//! | 5. Execute | The assigned task runs one tick, or the tick is idle. |
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Per-run state | Arena of [`TaskRuntimeState`] indexed like the input slice, rebuilt at the start of every `run()` |
//! | Ready set | One `VecDeque<usize>`: FIFO for round-robin, stable sort-then-pop for priority |
//! | Quantum | Always 1 tick |
//! | Unfinished work at a release | Discarded; only the miss is counted |
//!
//! # Example
//! ```rust
//! use rtsched_sim::scheduler::simulate;
//! use rtsched_sim::task::{Discipline, Mode, TaskSpec};
//!
//! let tasks = vec![TaskSpec::new("ctrl", 10, 3, 1)];
//! let run = simulate(&tasks, 25, Discipline::Priority, Mode::Preemptive).unwrap();
//! assert_eq!(run.metrics.busy_ticks, 9);
//! assert_eq!(run.metrics.idle_ticks, 16);
//! ```

pub mod error;
pub mod feasibility;
pub mod state;

pub use error::{SimulationError, TaskDefect};
pub use state::{Metrics, ScheduleEvent, SimulationRun, TaskMetrics, TaskRuntimeState};

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, trace, warn};

use crate::task::{Discipline, Mode, TaskSpec, Tick, IDLE_LABEL};

use feasibility::{check_liu_layland, liu_layland_bound, total_utilization};

// ── Entry validation ──────────────────────────────────────────────────────────

/// Reject malformed input before any tick executes.
pub fn validate(tasks: &[TaskSpec], duration: Tick) -> Result<(), SimulationError> {
    if duration <= 0 {
        return Err(SimulationError::InvalidDuration(duration));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for spec in tasks {
        let defect = if spec.name.trim().is_empty() {
            Some(TaskDefect::EmptyName)
        } else if spec.name == IDLE_LABEL {
            Some(TaskDefect::ReservedName)
        } else if spec.period <= 0 {
            Some(TaskDefect::NonPositivePeriod {
                period: spec.period,
            })
        } else if spec.execution <= 0 {
            Some(TaskDefect::NonPositiveExecution {
                execution: spec.execution,
            })
        } else {
            None
        };

        if let Some(defect) = defect {
            return Err(SimulationError::InvalidTask {
                task: spec.name.clone(),
                defect,
            });
        }

        if !seen.insert(spec.name.as_str()) {
            return Err(SimulationError::DuplicateTask {
                task: spec.name.clone(),
            });
        }
    }

    Ok(())
}

/// Run one simulation on a fresh engine.
pub fn simulate(
    tasks: &[TaskSpec],
    duration: Tick,
    discipline: Discipline,
    mode: Mode,
) -> Result<SimulationRun, SimulationError> {
    SchedulingEngine::new().run(tasks, duration, discipline, mode)
}

// ── SchedulingEngine ──────────────────────────────────────────────────────────

/// Discrete-time uniprocessor scheduler.
///
/// All fields are per-run scratch state.  [`run`](Self::run) resets them
/// before the first tick, so a reused engine behaves exactly like a fresh one;
/// `&mut self` rules out overlapping runs on the same instance.
#[derive(Debug, Default)]
pub struct SchedulingEngine {
    states: Vec<TaskRuntimeState>,
    ready: VecDeque<usize>,
    current: Option<usize>,
    events: Vec<ScheduleEvent>,
    jitter: Vec<Vec<Tick>>,
    buffer_state: Vec<usize>,
    idle_ticks: u64,
    busy_ticks: u64,
    total_missed: u64,
}

impl SchedulingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate `tasks` for `duration` ticks.
    ///
    /// # Errors
    /// [`SimulationError`] if the duration is not positive or any spec is
    /// malformed.  Nothing is simulated in that case.
    pub fn run(
        &mut self,
        tasks: &[TaskSpec],
        duration: Tick,
        discipline: Discipline,
        mode: Mode,
    ) -> Result<SimulationRun, SimulationError> {
        validate(tasks, duration)?;
        self.reset(tasks);

        info!(
            discipline = %discipline,
            mode = %mode,
            duration,
            task_count = tasks.len(),
            utilization = total_utilization(tasks),
            "=== SchedulingEngine::run() ==="
        );
        if let Some(u) = check_liu_layland(tasks) {
            warn!(
                utilization = u,
                bound = liu_layland_bound(tasks.len()),
                task_count = tasks.len(),
                "task set exceeds the Liu & Layland bound; deadline misses are likely"
            );
        }

        for t in 0..duration {
            self.release(tasks, t);
            self.buffer_state.push(self.ready.len());
            self.complete();
            if self.current.is_none() || mode == Mode::Preemptive {
                self.dispatch(tasks, discipline);
            }
            self.execute(t);
        }

        let run = self.finish(discipline, mode, duration);

        info!(
            busy = run.metrics.busy_ticks,
            idle = run.metrics.idle_ticks,
            missed = run.metrics.total_missed,
            cpu_load = run.metrics.cpu_load(),
            "=== Simulation complete ==="
        );

        Ok(run)
    }

    /// Runtime state of every task after the last run, in input order.
    pub fn task_states(&self) -> &[TaskRuntimeState] {
        &self.states
    }

    // ── Per-run lifecycle ─────────────────────────────────────────────────────

    /// Arena reset: discard everything from a previous run.
    fn reset(&mut self, tasks: &[TaskSpec]) {
        self.states = tasks.iter().map(TaskRuntimeState::fresh).collect();
        self.ready.clear();
        self.current = None;
        self.events.clear();
        self.jitter = vec![Vec::new(); tasks.len()];
        self.buffer_state.clear();
        self.idle_ticks = 0;
        self.busy_ticks = 0;
        self.total_missed = 0;
    }

    fn finish(&mut self, discipline: Discipline, mode: Mode, duration: Tick) -> SimulationRun {
        let jitter = std::mem::take(&mut self.jitter);
        let tasks = self
            .states
            .iter()
            .zip(jitter)
            .map(|(state, jitter)| TaskMetrics {
                name: state.name.clone(),
                missed: state.missed_count,
                jitter,
                busy_ticks: state.execution_intervals.len() as u64,
            })
            .collect();

        SimulationRun {
            discipline,
            mode,
            duration,
            events: std::mem::take(&mut self.events),
            metrics: Metrics {
                idle_ticks: self.idle_ticks,
                busy_ticks: self.busy_ticks,
                total_missed: self.total_missed,
                tasks,
                buffer_state: std::mem::take(&mut self.buffer_state),
            },
        }
    }

    // ── Tick steps ────────────────────────────────────────────────────────────

    fn release(&mut self, tasks: &[TaskSpec], t: Tick) {
        for (idx, spec) in tasks.iter().enumerate() {
            let state = &mut self.states[idx];
            if state.next_release > t {
                continue;
            }

            if state.last_release.is_some() {
                if state.remaining_execution > 0 {
                    state.missed_count += 1;
                    self.total_missed += 1;
                    debug!(
                        task = %spec.name,
                        tick = t,
                        remaining = state.remaining_execution,
                        "deadline miss: previous instance unfinished, work discarded"
                    );
                }
                // Sampled against the pending release, before it advances.
                self.jitter[idx].push(((t - state.next_release) - spec.period).abs());
            }

            state.last_release = Some(t);
            state.remaining_execution = spec.execution;
            state.next_release += spec.period;

            if !self.ready.contains(&idx) {
                self.ready.push_back(idx);
            }
            debug!(task = %spec.name, tick = t, next = state.next_release, "released");
        }
    }

    fn complete(&mut self) {
        if let Some(idx) = self.current {
            if self.states[idx].remaining_execution == 0 {
                self.current = None;
                self.ready.retain(|&i| i != idx);
            }
        }
    }

    fn dispatch(&mut self, tasks: &[TaskSpec], discipline: Discipline) {
        match discipline {
            Discipline::RoundRobin => {
                if let Some(idx) = self.ready.pop_front() {
                    // Pre-tick remaining > 1: still unfinished after this tick
                    if self.states[idx].remaining_execution > 1 {
                        self.ready.push_back(idx);
                    }
                    self.current = Some(idx);
                }
            }
            Discipline::Priority => {
                // A preemptible running task competes with the ready set and
                // wins ties against it.
                if let Some(cur) = self.current {
                    if !self.ready.contains(&cur) {
                        self.ready.push_front(cur);
                    }
                }
                self.ready
                    .make_contiguous()
                    .sort_by_key(|&i| tasks[i].priority);
                if let Some(idx) = self.ready.pop_front() {
                    self.current = Some(idx);
                }
            }
        }
    }

    fn execute(&mut self, t: Tick) {
        match self.current {
            None => {
                self.events.push(ScheduleEvent::idle(t));
                self.idle_ticks += 1;
                trace!(tick = t, "idle");
            }
            Some(idx) => {
                let state = &mut self.states[idx];
                debug_assert!(
                    state.remaining_execution > 0,
                    "task '{}' dispatched with no remaining work",
                    state.name
                );
                state.execution_intervals.push((t, t + 1));
                state.remaining_execution -= 1;
                self.events.push(ScheduleEvent::busy(&state.name, t));
                self.busy_ticks += 1;
                trace!(tick = t, task = %state.name, remaining = state.remaining_execution, "executed");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn spec(name: &str, period: Tick, execution: Tick, priority: i32) -> TaskSpec {
        TaskSpec::new(name, period, execution, priority)
    }

    fn labels(run: &SimulationRun) -> Vec<&str> {
        run.events.iter().map(|e| e.label.as_str()).collect()
    }

    fn intervals<'a>(engine: &'a SchedulingEngine, name: &str) -> &'a [(Tick, Tick)] {
        &engine
            .task_states()
            .iter()
            .find(|s| s.name == name)
            .unwrap()
            .execution_intervals
    }

    /// Deterministic pseudo-random task sets for property checks.
    fn generated_sets() -> Vec<(Vec<TaskSpec>, Tick)> {
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move |bound: u64| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed % bound
        };
        (0..40)
            .map(|_| {
                let n = 1 + next(4) as usize;
                let set: Vec<TaskSpec> = (0..n)
                    .map(|i| {
                        let period = 2 + next(12) as Tick;
                        let execution = 1 + next(period as u64) as Tick;
                        spec(&format!("T{i}"), period, execution, next(4) as i32)
                    })
                    .collect();
                (set, 1 + next(80) as Tick)
            })
            .collect()
    }

    const ALL_POLICIES: [(Discipline, Mode); 4] = [
        (Discipline::RoundRobin, Mode::Preemptive),
        (Discipline::RoundRobin, Mode::Cooperative),
        (Discipline::Priority, Mode::Preemptive),
        (Discipline::Priority, Mode::Cooperative),
    ];

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn zero_or_negative_duration_is_rejected() {
        let tasks = [spec("A", 10, 3, 1)];
        for d in [0, -5] {
            assert_eq!(
                simulate(&tasks, d, Discipline::Priority, Mode::Preemptive).unwrap_err(),
                SimulationError::InvalidDuration(d)
            );
        }
    }

    #[test]
    fn non_positive_period_is_invalid_task() {
        let err = simulate(&[spec("A", 0, 3, 1)], 10, Discipline::Priority, Mode::Preemptive)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidTask {
                defect: TaskDefect::NonPositivePeriod { period: 0 },
                ..
            }
        ));
    }

    #[test]
    fn non_positive_execution_is_invalid_task() {
        let err = simulate(&[spec("A", 5, -1, 1)], 10, Discipline::RoundRobin, Mode::Cooperative)
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidTask {
                defect: TaskDefect::NonPositiveExecution { execution: -1 },
                ..
            }
        ));
    }

    #[test]
    fn reserved_and_empty_names_are_rejected() {
        let idle = simulate(&[spec("IDLE", 5, 1, 1)], 5, Discipline::Priority, Mode::Preemptive);
        assert!(matches!(
            idle,
            Err(SimulationError::InvalidTask {
                defect: TaskDefect::ReservedName,
                ..
            })
        ));
        let blank = simulate(&[spec("  ", 5, 1, 1)], 5, Discipline::Priority, Mode::Preemptive);
        assert!(matches!(
            blank,
            Err(SimulationError::InvalidTask {
                defect: TaskDefect::EmptyName,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tasks = [spec("A", 5, 1, 1), spec("A", 7, 2, 2)];
        assert_eq!(
            simulate(&tasks, 10, Discipline::Priority, Mode::Preemptive).unwrap_err(),
            SimulationError::DuplicateTask { task: "A".into() }
        );
    }

    #[test]
    fn failed_validation_leaves_previous_results_untouched() {
        let mut engine = SchedulingEngine::new();
        engine
            .run(&[spec("A", 4, 1, 1)], 8, Discipline::Priority, Mode::Preemptive)
            .unwrap();
        assert!(engine
            .run(&[spec("A", 4, 1, 1)], 0, Discipline::Priority, Mode::Preemptive)
            .is_err());
        assert_eq!(intervals(&engine, "A"), &[(0, 1), (4, 5)]);
    }

    #[test]
    fn empty_task_set_runs_all_idle() {
        let run = simulate(&[], 5, Discipline::RoundRobin, Mode::Preemptive).unwrap();
        assert_eq!(run.metrics.idle_ticks, 5);
        assert_eq!(run.metrics.busy_ticks, 0);
        assert_eq!(run.metrics.cpu_load(), 0.0);
        assert!(run.events.iter().all(ScheduleEvent::is_idle));
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn single_task_priority_preemptive_scenario() {
        let mut engine = SchedulingEngine::new();
        let run = engine
            .run(&[spec("A", 10, 3, 1)], 25, Discipline::Priority, Mode::Preemptive)
            .unwrap();

        assert_eq!(
            intervals(&engine, "A"),
            &[(0, 1), (1, 2), (2, 3), (10, 11), (11, 12), (12, 13), (20, 21), (21, 22), (22, 23)]
        );
        assert_eq!(run.metrics.busy_ticks, 9);
        assert_eq!(run.metrics.idle_ticks, 16);
        assert!((run.metrics.cpu_load() - 0.36).abs() < 1e-12);
        assert_eq!(run.metrics.total_missed, 0);
        assert_eq!(
            run.spans(),
            vec![
                ("A", 0, 3),
                ("IDLE", 3, 10),
                ("A", 10, 13),
                ("IDLE", 13, 20),
                ("A", 20, 23),
                ("IDLE", 23, 25),
            ]
        );
    }

    #[test]
    fn overloaded_pair_gives_low_priority_only_leftover_ticks() {
        let tasks = [spec("A", 5, 4, 1), spec("B", 5, 4, 2)];

        // One period: A takes 4 ticks, B gets the last one, no boundary yet.
        let short = simulate(&tasks, 5, Discipline::Priority, Mode::Preemptive).unwrap();
        assert_eq!(labels(&short), ["A", "A", "A", "A", "B"]);
        assert_eq!(short.metrics.total_missed, 0);

        // The t=5 boundary finds B unfinished (3 ticks left) → one miss for B.
        let mut engine = SchedulingEngine::new();
        let run = engine
            .run(&tasks, 10, Discipline::Priority, Mode::Preemptive)
            .unwrap();
        assert_eq!(
            labels(&run),
            ["A", "A", "A", "A", "B", "A", "A", "A", "A", "B"]
        );
        assert_eq!(run.metrics.task("A").unwrap().missed, 0);
        assert_eq!(run.metrics.task("B").unwrap().missed, 1);
        assert_eq!(run.metrics.total_missed, 1);
        assert_eq!(engine.task_states()[1].missed_count, 1);
        assert_eq!(run.metrics.buffer_state, vec![2, 1, 1, 1, 1, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn round_robin_interleaves_equal_tasks_one_tick_each() {
        let tasks = [spec("A", 10, 3, 1), spec("B", 10, 3, 1), spec("C", 10, 3, 1)];
        let run = simulate(&tasks, 10, Discipline::RoundRobin, Mode::Preemptive).unwrap();
        assert_eq!(
            labels(&run),
            ["A", "B", "C", "A", "B", "C", "A", "B", "C", "IDLE"]
        );
    }

    #[test]
    fn round_robin_cooperative_runs_each_instance_to_completion() {
        let tasks = [spec("A", 10, 3, 1), spec("B", 10, 2, 1)];
        let run = simulate(&tasks, 10, Discipline::RoundRobin, Mode::Cooperative).unwrap();
        assert_eq!(
            labels(&run),
            ["A", "A", "A", "B", "B", "IDLE", "IDLE", "IDLE", "IDLE", "IDLE"]
        );
    }

    #[test]
    fn priority_preemptive_new_release_preempts_within_one_tick() {
        // L starts at t=1 after H's first instance; H re-releases at t=4.
        let tasks = [spec("L", 20, 6, 2), spec("H", 4, 1, 1)];
        let run = simulate(&tasks, 10, Discipline::Priority, Mode::Preemptive).unwrap();
        assert_eq!(
            labels(&run),
            ["H", "L", "L", "L", "H", "L", "L", "L", "H", "IDLE"]
        );
    }

    #[test]
    fn priority_cooperative_never_evicts_running_task() {
        let tasks = [spec("L", 20, 6, 2), spec("H", 4, 1, 1)];
        let run = simulate(&tasks, 10, Discipline::Priority, Mode::Cooperative).unwrap();
        // H released at t=4 and t=8 must wait for L (t=1..7) to finish.
        assert_eq!(
            labels(&run),
            ["H", "L", "L", "L", "L", "L", "L", "H", "H", "IDLE"]
        );
        assert_eq!(run.metrics.total_missed, 0);
    }

    #[test]
    fn priority_ties_follow_arrival_order() {
        let tasks = [spec("first", 10, 2, 1), spec("second", 10, 2, 1)];
        let run = simulate(&tasks, 5, Discipline::Priority, Mode::Preemptive).unwrap();
        assert_eq!(labels(&run), ["first", "first", "second", "second", "IDLE"]);
    }

    #[test]
    fn already_ready_task_is_not_queued_twice() {
        // B never runs while A hogs the CPU; its re-release must not duplicate it.
        let tasks = [spec("A", 2, 2, 1), spec("B", 2, 1, 2)];
        let run = simulate(&tasks, 6, Discipline::Priority, Mode::Preemptive).unwrap();
        assert!(run.metrics.buffer_state.iter().all(|&depth| depth <= 2));
        assert_eq!(run.metrics.task("B").unwrap().missed, 2);
        assert_eq!(run.metrics.task("B").unwrap().busy_ticks, 0);
    }

    #[test]
    fn jitter_is_sampled_per_non_initial_release_against_pending_release() {
        let run = simulate(&[spec("A", 4, 1, 1)], 13, Discipline::Priority, Mode::Preemptive)
            .unwrap();
        // Releases at 0, 4, 8, 12 → three non-initial samples, each |0 - 4|.
        assert_eq!(run.metrics.task("A").unwrap().jitter, vec![4, 4, 4]);
        assert_eq!(run.metrics.task("A").unwrap().average_jitter(), 4.0);
    }

    #[test]
    fn jitter_equals_period_for_every_task_and_policy() {
        let tasks = [spec("fast", 3, 1, 1), spec("slow", 7, 2, 2)];
        for (discipline, mode) in ALL_POLICIES {
            let run = simulate(&tasks, 22, discipline, mode).unwrap();
            // fast: releases 0,3,..,21 → 7 samples; slow: 0,7,14,21 → 3 samples.
            assert_eq!(run.metrics.task("fast").unwrap().jitter, vec![3; 7]);
            assert_eq!(run.metrics.task("slow").unwrap().jitter, vec![7; 3]);
        }
    }

    #[test]
    fn rerun_on_same_engine_is_identical() {
        let tasks = [spec("ADC", 10, 2, 2), spec("Filter", 30, 6, 1), spec("DataTX", 20, 4, 3)];
        let mut engine = SchedulingEngine::new();
        for (discipline, mode) in ALL_POLICIES {
            let first = engine.run(&tasks, 100, discipline, mode).unwrap();
            let first_states = engine.task_states().to_vec();
            let second = engine.run(&tasks, 100, discipline, mode).unwrap();
            assert_eq!(first, second);
            assert_eq!(first_states, engine.task_states());
            assert_eq!(first, simulate(&tasks, 100, discipline, mode).unwrap());
        }
    }

    // ── Properties over generated task sets ───────────────────────────────────

    #[test]
    fn events_tile_the_whole_duration() {
        for (tasks, duration) in generated_sets() {
            for (discipline, mode) in ALL_POLICIES {
                let run = simulate(&tasks, duration, discipline, mode).unwrap();
                assert_eq!(run.events.len() as Tick, duration);
                for (i, ev) in run.events.iter().enumerate() {
                    assert_eq!(ev.start, i as Tick);
                    assert_eq!(ev.end, ev.start + 1);
                }
                let m = &run.metrics;
                assert_eq!(m.busy_ticks + m.idle_ticks, duration as u64);
                assert!((0.0..=1.0).contains(&m.cpu_load()));
                assert_eq!(m.buffer_state.len() as Tick, duration);
                assert_eq!(
                    m.tasks.iter().map(|t| t.missed).sum::<u64>(),
                    m.total_missed
                );
            }
        }
    }

    #[test]
    fn per_period_execution_never_exceeds_budget_and_misses_match_shortfalls() {
        for (tasks, duration) in generated_sets() {
            for (discipline, mode) in ALL_POLICIES {
                let run = simulate(&tasks, duration, discipline, mode).unwrap();
                for spec in &tasks {
                    let windows = (duration + spec.period - 1) / spec.period;
                    let mut executed = vec![0; windows as usize];
                    for ev in run.events.iter().filter(|e| e.label == spec.name) {
                        executed[(ev.start / spec.period) as usize] += 1;
                    }
                    assert!(executed.iter().all(|&n| n <= spec.execution));

                    // Boundaries k·P (k ≥ 1) inside the run close window k-1.
                    let expected_misses = (1..windows)
                        .filter(|&k| executed[(k - 1) as usize] < spec.execution)
                        .count() as u64;
                    assert_eq!(
                        run.metrics.task(&spec.name).unwrap().missed,
                        expected_misses,
                        "task {} under {discipline}/{mode}",
                        spec.name
                    );
                }
            }
        }
    }
}
