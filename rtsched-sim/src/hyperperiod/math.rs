/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GCD and checked LCM over tick counts.

use super::HyperperiodError;
use crate::task::Tick;

/// Euclidean GCD on non-negative ticks.  `gcd(0, x) == x`.
pub fn gcd(mut a: Tick, mut b: Tick) -> Tick {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Checked LCM of two positive tick counts.
///
/// Divides before multiplying; the multiplication itself is still checked and
/// reported as [`HyperperiodError::Overflow`].
pub fn lcm(a: Tick, b: Tick) -> Result<Tick, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// Fold a slice of periods into one LCM.  `Ok(0)` for an empty slice.
pub fn lcm_of_slice(periods: &[Tick]) -> Result<Tick, HyperperiodError> {
    let Some(&first) = periods.first() else {
        return Ok(0);
    };
    periods[1..].iter().try_fold(first, |acc, &p| lcm(acc, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_basic_cases() {
        assert_eq!(gcd(30, 20), 10);
        assert_eq!(gcd(7, 5), 1);
        assert_eq!(gcd(0, 9), 9);
    }

    #[test]
    fn lcm_of_default_registry_periods() {
        // ADC 10, Filter 30, DataTX 20
        assert_eq!(lcm_of_slice(&[10, 30, 20]).unwrap(), 60);
    }

    #[test]
    fn lcm_with_zero_is_zero() {
        assert_eq!(lcm(0, 4).unwrap(), 0);
    }

    #[test]
    fn lcm_of_empty_slice_is_zero() {
        assert_eq!(lcm_of_slice(&[]).unwrap(), 0);
    }

    #[test]
    fn lcm_overflow_is_reported() {
        let a = Tick::MAX / 2 + 1;
        let b = Tick::MAX / 2;
        assert!(matches!(lcm(a, b), Err(HyperperiodError::Overflow { .. })));
    }
}
