//! Global simulation configuration
//!
//! `GlobalConfig` holds every simulation-wide flag behind one lock and is
//! shared by reference. The C ABI drives the process-wide instance returned
//! by [`global`]; Rust callers and tests may build their own.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::args::{CommandArgs, RuntimeOption};
use crate::cov::{self, CoverId, CoverPoint, CoverageDb};
use crate::error::Result;
use crate::time_unit::TimeUnit;
use crate::{PRODUCT_NAME, PRODUCT_VERSION};

#[cfg(verilated_callbacks = "list")]
use crate::callbacks::{Callback, CallbackList};
#[cfg(verilated_callbacks = "slot")]
use crate::callbacks::{FlushSlot, VoidCb};

const RUNTIME_HELP: &str = "\
+verilator+debug                Enable debugging
+verilator+debugi+<value>       Enable debugging at a level
+verilator+error+limit+<value>  Set error limit
+verilator+help                 Display help
+verilator+noassert             Disable assert checking
+verilator+rand+reset+<value>   Set random reset technique
+verilator+seed+<value>         Set random seed
+verilator+V                    Verbose version and config
+verilator+version              Show version and exit";

/// Initial value policy for otherwise uninitialized signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RandReset {
    /// 0: all bits zero
    Zeros,
    /// 1: all bits one
    Ones,
    /// 2: randomize all bits
    Randomize,
}

impl RandReset {
    /// Interpret a raw policy value; anything but 0 and 1 randomizes
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => RandReset::Zeros,
            1 => RandReset::Ones,
            _ => RandReset::Randomize,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            RandReset::Zeros => 0,
            RandReset::Ones => 1,
            RandReset::Randomize => 2,
        }
    }
}

/// Point-in-time copy of the configuration, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    pub product: String,
    pub version: String,
    pub rand_reset: i32,
    pub rand_seed: i32,
    pub debug: i32,
    pub calc_unused_sigs: bool,
    pub got_finish: bool,
    pub assert_on: bool,
    pub fatal_on_vpi_error: bool,
    pub trace_ever_on: bool,
    pub error_limit: i32,
    pub time_unit: TimeUnit,
    pub time_precision: TimeUnit,
    pub args: Vec<String>,
    pub scopes: Vec<String>,
    pub coverage_points: usize,
    pub flush_callbacks: usize,
    pub exit_callbacks: usize,
}

struct State {
    rand_reset: i32,
    rand_seed: i32,
    rng: StdRng,
    debug: i32,
    calc_unused_sigs: bool,
    got_finish: bool,
    assert_on: bool,
    fatal_on_vpi_error: bool,
    trace_ever_on: bool,
    error_limit: i32,
    time_unit: TimeUnit,
    time_precision: TimeUnit,
    args: CommandArgs,
    scopes: Vec<String>,
    coverage: CoverageDb,
    #[cfg(verilated_callbacks = "list")]
    flush_cbs: CallbackList,
    #[cfg(verilated_callbacks = "list")]
    exit_cbs: CallbackList,
    #[cfg(verilated_callbacks = "slot")]
    flush_cb: FlushSlot,
}

impl State {
    fn new() -> Self {
        Self {
            rand_reset: 0,
            rand_seed: 0,
            rng: StdRng::from_entropy(),
            debug: 0,
            calc_unused_sigs: false,
            got_finish: false,
            assert_on: true,
            fatal_on_vpi_error: true,
            trace_ever_on: false,
            error_limit: 1,
            time_unit: TimeUnit::PS,
            time_precision: TimeUnit::PS,
            args: CommandArgs::new(),
            scopes: Vec::new(),
            coverage: CoverageDb::new(),
            #[cfg(verilated_callbacks = "list")]
            flush_cbs: CallbackList::new(),
            #[cfg(verilated_callbacks = "list")]
            exit_cbs: CallbackList::new(),
            #[cfg(verilated_callbacks = "slot")]
            flush_cb: FlushSlot::new(),
        }
    }
}

/// Simulation-wide configuration and callbacks
pub struct GlobalConfig {
    state: Mutex<State>,
    running_flush: AtomicBool,
    #[cfg(verilated_callbacks = "list")]
    running_exit: AtomicBool,
}

/// The process-wide configuration used by the C ABI
pub fn global() -> &'static GlobalConfig {
    static GLOBAL: OnceLock<GlobalConfig> = OnceLock::new();
    GLOBAL.get_or_init(GlobalConfig::new)
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::new()),
            running_flush: AtomicBool::new(false),
            #[cfg(verilated_callbacks = "list")]
            running_exit: AtomicBool::new(false),
        }
    }

    // ------------------------------------------------------------------
    // Reset policy

    /// Store the reset policy; values other than 0/1/2 are kept as given
    pub fn set_rand_reset(&self, value: i32) {
        self.state.lock().rand_reset = value;
    }

    pub fn rand_reset(&self) -> i32 {
        self.state.lock().rand_reset
    }

    pub fn rand_reset_mode(&self) -> RandReset {
        RandReset::from_raw(self.rand_reset())
    }

    /// Seed for randomized reset; 0 draws a seed from the OS
    pub fn set_rand_seed(&self, seed: i32) {
        let mut state = self.state.lock();
        state.rand_seed = seed;
        state.rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed as u32 as u64)
        };
    }

    pub fn rand_seed(&self) -> i32 {
        self.state.lock().rand_seed
    }

    /// Reset value of a `width`-bit signal under the current policy
    pub fn rand_reset_value(&self, width: u32) -> u64 {
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        let mut state = self.state.lock();
        match RandReset::from_raw(state.rand_reset) {
            RandReset::Zeros => 0,
            RandReset::Ones => mask,
            RandReset::Randomize => state.rng.gen::<u64>() & mask,
        }
    }

    // ------------------------------------------------------------------
    // Flags

    pub fn set_debug(&self, level: i32) {
        self.state.lock().debug = level;
    }

    pub fn debug(&self) -> i32 {
        self.state.lock().debug
    }

    pub fn set_calc_unused_sigs(&self, flag: bool) {
        self.state.lock().calc_unused_sigs = flag;
    }

    pub fn calc_unused_sigs(&self) -> bool {
        self.state.lock().calc_unused_sigs
    }

    /// Record that the simulation executed $finish
    pub fn set_got_finish(&self, flag: bool) {
        self.state.lock().got_finish = flag;
    }

    pub fn got_finish(&self) -> bool {
        self.state.lock().got_finish
    }

    /// Allow tracing to be enabled at some point
    pub fn set_trace_ever_on(&self, flag: bool) {
        self.state.lock().trace_ever_on = flag;
    }

    pub fn trace_ever_on(&self) -> bool {
        self.state.lock().trace_ever_on
    }

    pub fn set_assert_on(&self, flag: bool) {
        self.state.lock().assert_on = flag;
    }

    pub fn assert_on(&self) -> bool {
        self.state.lock().assert_on
    }

    pub fn set_fatal_on_vpi_error(&self, flag: bool) {
        self.state.lock().fatal_on_vpi_error = flag;
    }

    pub fn fatal_on_vpi_error(&self) -> bool {
        self.state.lock().fatal_on_vpi_error
    }

    /// Number of errors tolerated before stopping
    pub fn set_error_limit(&self, limit: i32) {
        self.state.lock().error_limit = limit;
    }

    pub fn error_limit(&self) -> i32 {
        self.state.lock().error_limit
    }

    pub fn set_time_unit(&self, unit: TimeUnit) {
        self.state.lock().time_unit = unit;
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.state.lock().time_unit
    }

    pub fn set_time_precision(&self, precision: TimeUnit) {
        self.state.lock().time_precision = precision;
    }

    pub fn time_precision(&self) -> TimeUnit {
        self.state.lock().time_precision
    }

    // ------------------------------------------------------------------
    // Command arguments

    /// Record process arguments, replacing earlier ones, and apply any
    /// `+verilator+` runtime options among them
    ///
    /// The arguments are recorded even when an option is rejected; in that
    /// case no option from this call is applied.
    pub fn command_args<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.state.lock().args.record(args.iter().cloned());
        self.apply_runtime_args(&args)
    }

    /// Append process arguments, applying runtime options among the new ones
    pub fn add_command_args<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.state.lock().args.add(args.iter().cloned());
        self.apply_runtime_args(&args)
    }

    fn apply_runtime_args(&self, args: &[String]) -> Result<()> {
        let options = args
            .iter()
            .filter_map(|arg| RuntimeOption::parse(arg).transpose())
            .collect::<Result<Vec<_>>>()?;

        for option in options {
            match option {
                RuntimeOption::Debug => self.set_debug(4),
                RuntimeOption::DebugLevel(level) => self.set_debug(level),
                RuntimeOption::ErrorLimit(limit) => self.set_error_limit(limit),
                RuntimeOption::NoAssert => self.set_assert_on(false),
                RuntimeOption::RandReset(value) => self.set_rand_reset(value),
                RuntimeOption::Seed(seed) => self.set_rand_seed(seed),
                RuntimeOption::Help => {
                    tracing::info!(target: "verilated", "Runtime options:\n{}", RUNTIME_HELP)
                }
                RuntimeOption::Version => {
                    tracing::info!(target: "verilated", "{} {}", PRODUCT_NAME, PRODUCT_VERSION)
                }
            }
        }
        Ok(())
    }

    pub fn command_args_list(&self) -> Vec<String> {
        self.state.lock().args.args().to_vec()
    }

    /// Plusarg lookup for `$test$plusargs` / `$value$plusargs`
    ///
    /// `prefix` excludes the leading `+`; the whole matching argument is
    /// returned.
    pub fn plus_match(&self, prefix: &str) -> Option<String> {
        let state = self.state.lock();
        if !state.args.is_loaded() {
            tracing::warn!(
                target: "verilated",
                "plusargs queried before command arguments were recorded"
            );
            return None;
        }
        state.args.plus_match(prefix).map(str::to_string)
    }

    // ------------------------------------------------------------------
    // Scopes and diagnostics

    /// Register a scope name for `scopes_dump`; duplicates are ignored
    pub fn register_scope(&self, name: &str) {
        let mut state = self.state.lock();
        if !state.scopes.iter().any(|s| s == name) {
            state.scopes.push(name.to_string());
        }
    }

    pub fn scopes(&self) -> Vec<String> {
        self.state.lock().scopes.clone()
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        let state = self.state.lock();

        #[cfg(verilated_callbacks = "list")]
        let (flush_callbacks, exit_callbacks) = (state.flush_cbs.len(), state.exit_cbs.len());
        #[cfg(verilated_callbacks = "slot")]
        let (flush_callbacks, exit_callbacks) = (state.flush_cb.get().is_some() as usize, 0);

        ConfigSnapshot {
            product: PRODUCT_NAME.to_string(),
            version: PRODUCT_VERSION.to_string(),
            rand_reset: state.rand_reset,
            rand_seed: state.rand_seed,
            debug: state.debug,
            calc_unused_sigs: state.calc_unused_sigs,
            got_finish: state.got_finish,
            assert_on: state.assert_on,
            fatal_on_vpi_error: state.fatal_on_vpi_error,
            trace_ever_on: state.trace_ever_on,
            error_limit: state.error_limit,
            time_unit: state.time_unit,
            time_precision: state.time_precision,
            args: state.args.args().to_vec(),
            scopes: state.scopes.clone(),
            coverage_points: state.coverage.len(),
            flush_callbacks,
            exit_callbacks,
        }
    }

    pub fn internals_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Log most of the internal state; the format is not stable
    pub fn internals_dump(&self) {
        match self.internals_json() {
            Ok(json) => tracing::info!(target: "verilated", "internalsDump:\n{}", json),
            Err(e) => tracing::error!(target: "verilated", "internalsDump failed: {}", e),
        }
    }

    /// Log registered scope names; the format is not stable
    pub fn scopes_dump(&self) {
        let scopes = self.scopes();
        tracing::info!(target: "verilated", "scopesDump: {} scope(s)", scopes.len());
        for scope in &scopes {
            tracing::info!(target: "verilated", "  {}", scope);
        }
    }

    // ------------------------------------------------------------------
    // Coverage

    pub fn cov_insert(&self, point: CoverPoint) -> CoverId {
        self.state.lock().coverage.insert(point)
    }

    /// Count one hit; false if the point no longer exists
    pub fn cov_increment(&self, id: CoverId) -> bool {
        self.state.lock().coverage.increment(id)
    }

    pub fn cov_count(&self, id: CoverId) -> Option<u64> {
        self.state.lock().coverage.count(id)
    }

    pub fn cov_points(&self) -> usize {
        self.state.lock().coverage.len()
    }

    /// Write all coverage data to a file
    pub fn cov_write(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.state.lock().coverage.to_text();
        cov::write_text(path.as_ref(), &text)
    }

    /// Clear coverage points
    pub fn cov_clear(&self) {
        self.state.lock().coverage.clear();
    }

    /// Clear points not matching `pattern`
    pub fn cov_clear_non_match(&self, pattern: &str) {
        self.state.lock().coverage.clear_non_match(pattern);
    }

    /// Zero coverage points
    pub fn cov_zero(&self) {
        self.state.lock().coverage.zero();
    }

    // ------------------------------------------------------------------
    // Flush / exit callbacks (engine 4.038+)

    /// Register a flush callback
    ///
    /// # Safety
    /// The callback must stay valid to call with its data until removed.
    #[cfg(verilated_callbacks = "list")]
    pub unsafe fn add_flush_cb(&self, cb: Callback) {
        self.state.lock().flush_cbs.add(cb);
    }

    /// Remove the exact `(callback, data)` pair; returns whether it existed
    #[cfg(verilated_callbacks = "list")]
    pub fn remove_flush_cb(&self, cb: Callback) -> bool {
        self.state.lock().flush_cbs.remove(cb)
    }

    /// Run flush callbacks in registration order, then flush stdio
    #[cfg(verilated_callbacks = "list")]
    pub fn run_flush_callbacks(&self) {
        if self.running_flush.swap(true, Ordering::AcqRel) {
            return;
        }
        let cbs = self.state.lock().flush_cbs.snapshot();
        for cb in &cbs {
            // SAFETY: validity was promised at registration
            unsafe { cb.invoke() };
        }
        flush_stdio();
        self.running_flush.store(false, Ordering::Release);
    }

    /// Register an exit callback
    ///
    /// # Safety
    /// The callback must stay valid to call with its data until removed.
    #[cfg(verilated_callbacks = "list")]
    pub unsafe fn add_exit_cb(&self, cb: Callback) {
        self.state.lock().exit_cbs.add(cb);
    }

    #[cfg(verilated_callbacks = "list")]
    pub fn remove_exit_cb(&self, cb: Callback) -> bool {
        self.state.lock().exit_cbs.remove(cb)
    }

    /// Run exit callbacks in registration order
    #[cfg(verilated_callbacks = "list")]
    pub fn run_exit_callbacks(&self) {
        if self.running_exit.swap(true, Ordering::AcqRel) {
            return;
        }
        let cbs = self.state.lock().exit_cbs.snapshot();
        for cb in &cbs {
            // SAFETY: validity was promised at registration
            unsafe { cb.invoke() };
        }
        self.running_exit.store(false, Ordering::Release);
    }

    // ------------------------------------------------------------------
    // Single flush callback (engines before 4.038)

    /// Set the flush callback; a different second callback is rejected
    ///
    /// # Safety
    /// The callback must stay valid to call for the rest of the process.
    #[cfg(verilated_callbacks = "slot")]
    pub unsafe fn set_flush_cb(&self, cb: VoidCb) -> Result<()> {
        self.state.lock().flush_cb.set(cb)
    }

    /// Call the flush callback if any, then flush stdio
    #[cfg(verilated_callbacks = "slot")]
    pub fn flush_call(&self) {
        if self.running_flush.swap(true, Ordering::AcqRel) {
            return;
        }
        let cb = self.state.lock().flush_cb.get();
        if let Some(cb) = cb {
            // SAFETY: validity was promised at registration
            unsafe { cb() };
        }
        flush_stdio();
        self.running_flush.store(false, Ordering::Release);
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn flush_stdio() {
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!(target: "verilated", "stdout flush failed: {}", e);
    }
    if let Err(e) = std::io::stderr().flush() {
        tracing::debug!(target: "verilated", "stderr flush failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::new();
        assert_eq!(config.rand_reset(), 0);
        assert_eq!(config.debug(), 0);
        assert!(!config.calc_unused_sigs());
        assert!(!config.got_finish());
        assert!(config.assert_on());
        assert!(config.fatal_on_vpi_error());
        assert!(!config.trace_ever_on());
        assert_eq!(config.error_limit(), 1);
        assert_eq!(config.time_unit(), TimeUnit::PS);
        assert!(config.command_args_list().is_empty());
    }

    #[test]
    fn test_rand_reset_keeps_raw_value() {
        let config = GlobalConfig::new();
        config.set_rand_reset(7);
        assert_eq!(config.rand_reset(), 7);
        assert_eq!(config.rand_reset_mode(), RandReset::Randomize);
        config.set_rand_reset(1);
        assert_eq!(config.rand_reset_mode(), RandReset::Ones);
    }

    #[test]
    fn test_rand_reset_values() {
        let config = GlobalConfig::new();
        assert_eq!(config.rand_reset_value(8), 0);

        config.set_rand_reset(RandReset::Ones.as_raw());
        assert_eq!(config.rand_reset_value(8), 0xff);
        assert_eq!(config.rand_reset_value(64), u64::MAX);

        config.set_rand_reset(RandReset::Randomize.as_raw());
        config.set_rand_seed(42);
        let first: Vec<u64> = (0..4).map(|_| config.rand_reset_value(12)).collect();
        assert!(first.iter().all(|v| *v <= 0xfff));
        config.set_rand_seed(42);
        let second: Vec<u64> = (0..4).map(|_| config.rand_reset_value(12)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_command_args_apply_runtime_options() {
        let config = GlobalConfig::new();
        config
            .command_args([
                "sim",
                "+verilator+debugi+3",
                "+verilator+noassert",
                "+verilator+rand+reset+2",
                "+verilator+seed+9",
                "+verilator+error+limit+5",
                "+user=1",
            ])
            .unwrap();

        assert_eq!(config.debug(), 3);
        assert!(!config.assert_on());
        assert_eq!(config.rand_reset(), 2);
        assert_eq!(config.rand_seed(), 9);
        assert_eq!(config.error_limit(), 5);
        assert_eq!(config.plus_match("user").as_deref(), Some("+user=1"));
    }

    #[test]
    fn test_rejected_option_still_records_args() {
        let config = GlobalConfig::new();
        let err = config
            .command_args(["sim", "+verilator+debug", "+verilator+nope"])
            .unwrap_err();
        assert!(err.to_string().contains("+verilator+nope"));
        assert_eq!(config.debug(), 0);
        assert_eq!(config.command_args_list().len(), 3);
    }

    #[test]
    fn test_add_command_args_appends() {
        let config = GlobalConfig::new();
        config.command_args(["sim", "+a"]).unwrap();
        config.add_command_args(["+b", "+verilator+debug"]).unwrap();
        assert_eq!(config.command_args_list(), vec!["sim", "+a", "+b", "+verilator+debug"]);
        assert_eq!(config.debug(), 4);
        assert_eq!(config.plus_match("b").as_deref(), Some("+b"));
    }

    #[test]
    fn test_plus_match_before_args_recorded() {
        let config = GlobalConfig::new();
        assert_eq!(config.plus_match("anything"), None);
    }

    #[test]
    fn test_snapshot_json() {
        let config = GlobalConfig::new();
        config.set_got_finish(true);
        config.register_scope("TOP.counter");
        config.register_scope("TOP.counter");
        let json = config.internals_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["got_finish"], serde_json::Value::Bool(true));
        assert_eq!(value["time_unit"], "1ps");
        assert_eq!(value["scopes"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(value["product"], PRODUCT_NAME);
    }

    #[test]
    fn test_coverage_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.dat");
        let config = GlobalConfig::new();
        let top = config.cov_insert(CoverPoint {
            filename: "top.v".to_string(),
            line: 4,
            hier: "top".to_string(),
            ..Default::default()
        });
        let sub = config.cov_insert(CoverPoint {
            filename: "sub.v".to_string(),
            line: 9,
            hier: "top.sub".to_string(),
            ..Default::default()
        });
        assert!(config.cov_increment(top));
        assert!(config.cov_increment(sub));
        assert_eq!(config.snapshot().coverage_points, 2);

        config.cov_write(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("C '")).count(), 2);

        config.cov_clear_non_match("sub.v");
        assert_eq!(config.cov_points(), 1);
        config.cov_zero();
        assert_eq!(config.cov_count(sub), Some(0));
        config.cov_clear();
        assert!(!config.cov_increment(sub));
    }

    #[cfg(verilated_callbacks = "list")]
    #[test]
    fn test_flush_runs_without_callbacks() {
        let config = GlobalConfig::new();
        config.run_flush_callbacks();
        config.run_flush_callbacks();
        assert_eq!(config.snapshot().flush_callbacks, 0);
    }

    #[cfg(verilated_callbacks = "list")]
    mod callbacks {
        use super::*;
        use std::ffi::c_void;

        struct Probe {
            config: *const GlobalConfig,
            calls: u32,
            saw_finish: bool,
        }

        unsafe extern "C" fn reenter(data: *mut c_void) {
            let probe = &mut *(data as *mut Probe);
            probe.calls += 1;
            let config = &*probe.config;
            probe.saw_finish = config.got_finish();
            config.run_flush_callbacks();
            config.run_exit_callbacks();
        }

        #[test]
        fn test_callbacks_may_reenter_runtime() {
            let config = GlobalConfig::new();
            config.set_got_finish(true);
            let mut probe = Probe { config: &config, calls: 0, saw_finish: false };
            let cb = Callback::new(reenter, &mut probe as *mut Probe as *mut c_void);

            unsafe {
                config.add_flush_cb(cb);
                config.add_exit_cb(cb);
            }
            config.run_flush_callbacks();
            config.run_exit_callbacks();

            // flush -> exit nested once, then exit -> flush nested once
            assert_eq!(probe.calls, 4);
            assert!(probe.saw_finish);
            assert_eq!(config.snapshot().flush_callbacks, 1);

            assert!(config.remove_flush_cb(cb));
            assert!(config.remove_exit_cb(cb));
            config.run_flush_callbacks();
            config.run_exit_callbacks();
            assert_eq!(probe.calls, 4);
        }
    }

    #[cfg(verilated_callbacks = "slot")]
    mod callbacks {
        use super::*;
        use std::sync::atomic::AtomicU32;

        static CALLS: AtomicU32 = AtomicU32::new(0);

        unsafe extern "C" fn count() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        #[test]
        fn test_flush_call_runs_slot() {
            let config = GlobalConfig::new();
            config.flush_call();
            assert_eq!(CALLS.load(Ordering::SeqCst), 0);
            unsafe { config.set_flush_cb(count).unwrap() };
            config.flush_call();
            config.flush_call();
            assert_eq!(CALLS.load(Ordering::SeqCst), 2);
        }
    }
}
