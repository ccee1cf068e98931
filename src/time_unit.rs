//! Simulation time units
//!
//! A time unit is a power of ten of seconds between 1fs (10^-15) and 100s
//! (10^2). Tokens follow the `timescale` spelling: an optional magnitude of
//! 1, 10 or 100 followed by `s`, `ms`, `us`, `ns`, `ps` or `fs`.

use std::ffi::CStr;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, VerilatedError};

/// Names indexed by `2 - power`
const NAMES: [&CStr; 18] = [
    c"100s", c"10s", c"1s",
    c"100ms", c"10ms", c"1ms",
    c"100us", c"10us", c"1us",
    c"100ns", c"10ns", c"1ns",
    c"100ps", c"10ps", c"1ps",
    c"100fs", c"10fs", c"1fs",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TimeUnit(i8);

impl TimeUnit {
    pub const MIN_POWER: i32 = -15;
    pub const MAX_POWER: i32 = 2;

    pub const S: TimeUnit = TimeUnit(0);
    pub const MS: TimeUnit = TimeUnit(-3);
    pub const US: TimeUnit = TimeUnit(-6);
    pub const NS: TimeUnit = TimeUnit(-9);
    pub const PS: TimeUnit = TimeUnit(-12);
    pub const FS: TimeUnit = TimeUnit(-15);

    /// Build from a power of ten of seconds (`-9` is 1ns)
    pub fn from_power(power: i32) -> Result<Self> {
        if (Self::MIN_POWER..=Self::MAX_POWER).contains(&power) {
            Ok(TimeUnit(power as i8))
        } else {
            Err(VerilatedError::TimeUnitOutOfRange(power))
        }
    }

    pub fn power(self) -> i32 {
        self.0 as i32
    }

    pub fn as_c_str(self) -> &'static CStr {
        NAMES[(Self::MAX_POWER - self.power()) as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.as_c_str().to_str().unwrap_or("")
    }
}

impl Default for TimeUnit {
    fn default() -> Self {
        TimeUnit::NS
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TimeUnit> for String {
    fn from(unit: TimeUnit) -> String {
        unit.as_str().to_string()
    }
}

impl FromStr for TimeUnit {
    type Err = VerilatedError;

    fn from_str(token: &str) -> Result<Self> {
        let invalid = || VerilatedError::InvalidTimeUnit(token.to_string());
        let trimmed = token.trim();

        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (magnitude, unit) = trimmed.split_at(digits_end);

        let magnitude_power = match magnitude {
            "" | "1" => 0,
            "10" => 1,
            "100" => 2,
            _ => return Err(invalid()),
        };

        let base_power = match unit.trim_start() {
            "s" => 0,
            "ms" => -3,
            "us" => -6,
            "ns" => -9,
            "ps" => -12,
            "fs" => -15,
            _ => return Err(invalid()),
        };

        Self::from_power(base_power + magnitude_power)
    }
}
