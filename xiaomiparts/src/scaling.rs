// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

// slider <-> vtg_level conversion

use crate::schema::{MAX_VIBRATION, MIN_VIBRATION};

/// Map a 0-100 slider position onto the vibrator register range.
///
/// `pct / 100 * (max - min) + min`, with no rounding.
pub fn percent_to_vibration(percent: i32) -> f64 {
    percent as f64 / 100.0 * (MAX_VIBRATION - MIN_VIBRATION) as f64 + MIN_VIBRATION as f64
}

/// Inverse of [`percent_to_vibration`], rounded and clamped to 0-100.
pub fn vibration_to_percent(level: i32) -> i32 {
    let clamped = level.clamp(MIN_VIBRATION, MAX_VIBRATION);
    ((clamped - MIN_VIBRATION) as f64 / (MAX_VIBRATION - MIN_VIBRATION) as f64 * 100.0).round()
        as i32
}

/// Text written to `vtg_level`: the real number with at least one decimal.
pub fn encode_vibration(level: f64) -> String {
    format!("{level:?}")
}
