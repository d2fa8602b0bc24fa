/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Utilisation-based schedulability hints.
//!
//! The engine computes these before a run and only **logs** them; a task set
//! above the bound is still simulated.
//!
//! # Theory
//! **Liu & Layland (1973)**: under Rate Monotonic priorities a set of `n`
//! independent periodic tasks is guaranteed schedulable on one processor if
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq n \left(2^{1/n} - 1\right)$$
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 3 | 0.780 |
//! | ∞ | ln(2) ≈ 0.693 |
//!
//! Between the bound and `1.0` the set may or may not be schedulable; above
//! `1.0` it is overloaded and misses are certain.

use crate::task::TaskSpec;

/// `U_bound(n) = n × (2^(1/n) − 1)`; `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Sum of `execution / period` over tasks with a positive period.
pub fn total_utilization(tasks: &[TaskSpec]) -> f64 {
    tasks
        .iter()
        .filter(|t| t.period > 0)
        .map(TaskSpec::utilization)
        .sum()
}

/// Returns `Some(total_utilisation)` when the set exceeds the Liu & Layland
/// bound, `None` when it is provably schedulable (or empty).
pub fn check_liu_layland(tasks: &[TaskSpec]) -> Option<f64> {
    let n = tasks.iter().filter(|t| t.period > 0).count();
    if n == 0 {
        return None;
    }

    let total_u = total_utilization(tasks);
    if total_u > liu_layland_bound(n) {
        Some(total_u)
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(period: i64, execution: i64) -> TaskSpec {
        TaskSpec::new("t", period, execution, 1)
    }

    #[test]
    fn bound_zero_tasks_is_zero() {
        assert_eq!(liu_layland_bound(0), 0.0);
    }

    #[test]
    fn bound_two_tasks_is_approximately_0_828() {
        let b = liu_layland_bound(2);
        assert!((b - 0.8284).abs() < 1e-3, "bound(2) ≈ 0.828, got {b}");
    }

    #[test]
    fn bound_converges_toward_ln2() {
        let b = liu_layland_bound(1000);
        assert!((b - 2.0_f64.ln()).abs() < 1e-3);
    }

    #[test]
    fn default_registry_set_is_feasible() {
        // ADC 2/10 + Filter 6/30 + DataTX 4/20 = 0.6 ≤ bound(3) ≈ 0.780
        let set = [spec(10, 2), spec(30, 6), spec(20, 4)];
        assert!((total_utilization(&set) - 0.6).abs() < 1e-9);
        assert!(check_liu_layland(&set).is_none());
    }

    #[test]
    fn overloaded_set_exceeds_bound() {
        let set = [spec(5, 4), spec(5, 4)];
        let u = check_liu_layland(&set).expect("1.6 must exceed bound(2)");
        assert!((u - 1.6).abs() < 1e-9);
    }

    #[test]
    fn non_positive_periods_are_ignored() {
        let set = [spec(0, 5), spec(10, 5)];
        assert!(check_liu_layland(&set).is_none());
        assert!((total_utilization(&set) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_set_is_feasible() {
        assert!(check_liu_layland(&[]).is_none());
    }
}
