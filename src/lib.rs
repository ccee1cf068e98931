//! Verilated Runtime Shim
//!
//! Process-wide simulation control and VCD dump handles, available both as
//! a Rust API and as a flat C ABI:
//! - [`config`]: global flags (reset policy, debug level, $finish, assertions,
//!   VPI error handling, tracing), plusargs and flush/exit callbacks
//! - [`cov`]: coverage point registry and coverage file output
//! - [`vcd`]: single-owner VCD writer with file rotation and rollover
//! - [`test_bench`]: clock/reset harness over a Verilated-style model
//! - [`ffi`]: `extern "C"` exports over all of the above
//!
//! The callback API shape and the rollover unit follow the engine version
//! targeted at build time (`VERILATED_ENGINE_VERSION`, see `build.rs`).

pub mod args;
pub mod callbacks;
pub mod config;
pub mod cov;
pub mod error;
pub mod ffi;
pub mod test_bench;
pub mod time_unit;
pub mod vcd;

pub use args::{CommandArgs, RuntimeOption};
pub use config::{global, ConfigSnapshot, GlobalConfig, RandReset};
pub use cov::{CoverId, CoverPoint, CoverageDb};
pub use error::{Result, VerilatedError};
pub use test_bench::{Module, TestBench};
pub use time_unit::TimeUnit;
pub use vcd::{SignalId, VcdDump};

/// Product name reported to VPI and `+verilator+V`
pub const PRODUCT_NAME: &str = "Verilator";

/// Engine API level this build was configured for (`MAJOR.MINOR`)
pub const PRODUCT_VERSION: &str = env!("VERILATED_ENGINE_VERSION");
