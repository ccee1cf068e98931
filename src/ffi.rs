//! C ABI function exports for the Verilated runtime
//!
//! Global functions drive the process-wide [`GlobalConfig`](crate::GlobalConfig)
//! returned by [`global`]; `verilatedvcdc_*` functions take a dump handle
//! created by `verilatedvcdc_new`. Booleans cross the boundary as `int`
//! (0 = false, nonzero = true; getters return exactly 0 or 1).
//!
//! Errors from the runtime are logged; no function reports them to the
//! caller beyond the state it can query (e.g. `verilatedvcdc_is_open`).

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::config::global;
use crate::cov::{self, CoverId, CoverPoint};
use crate::time_unit::TimeUnit;
use crate::vcd::VcdDump;
use crate::{PRODUCT_NAME, PRODUCT_VERSION};

#[cfg(verilated_callbacks = "list")]
use crate::callbacks::{Callback, VoidPCb};
#[cfg(verilated_callbacks = "list")]
use std::ffi::c_void;

#[cfg(verilated_callbacks = "slot")]
use crate::callbacks::VoidCb;

/// Opaque dump handle as seen from C
pub type VerilatedVcdC = VcdDump;

// ============================================================================
// Marshaling helpers
// ============================================================================

fn to_c_bool(flag: bool) -> c_int {
    if flag { 1 } else { 0 }
}

unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    match CStr::from_ptr(s).to_str() {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(target: "verilated", "non UTF-8 string argument: {}", e);
            None
        }
    }
}

unsafe fn path_arg(s: *const c_char) -> Option<PathBuf> {
    if s.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(s).to_bytes();

    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        Some(PathBuf::from(OsStr::from_bytes(bytes)))
    }
    #[cfg(not(unix))]
    {
        Some(PathBuf::from(String::from_utf8_lossy(bytes).into_owned()))
    }
}

unsafe fn argv_to_vec(argc: c_int, argv: *const *const c_char) -> Vec<String> {
    if argv.is_null() || argc <= 0 {
        return Vec::new();
    }
    (0..argc as usize)
        .map(|i| *argv.add(i))
        .filter(|arg| !arg.is_null())
        .map(|arg| CStr::from_ptr(arg).to_string_lossy().into_owned())
        .collect()
}

fn static_c_string(cell: &'static OnceLock<CString>, s: &str) -> *const c_char {
    cell.get_or_init(|| CString::new(s).unwrap_or_default()).as_ptr()
}

// ============================================================================
// Global Configuration
// ============================================================================

/// Select initial value of otherwise uninitialized signals.
///
/// 0 = Set to zeros
/// 1 = Set all bits to one
/// 2 = Randomize all bits
#[no_mangle]
pub extern "C" fn verilated_set_rand_reset(val: c_int) {
    global().set_rand_reset(val);
}

/// Return randReset value
#[no_mangle]
pub extern "C" fn verilated_rand_reset() -> c_int {
    global().rand_reset()
}

/// Seed for randomized reset (0 = seed from the OS)
#[no_mangle]
pub extern "C" fn verilated_set_rand_seed(seed: c_int) {
    global().set_rand_seed(seed);
}

#[no_mangle]
pub extern "C" fn verilated_rand_seed() -> c_int {
    global().rand_seed()
}

/// Enable debug of internal verilated code
#[no_mangle]
pub extern "C" fn verilated_set_debug(level: c_int) {
    global().set_debug(level);
}

/// Return debug value
#[no_mangle]
pub extern "C" fn verilated_debug() -> c_int {
    global().debug()
}

/// Enable calculation of unused signals
#[no_mangle]
pub extern "C" fn verilated_set_calc_unused_sigs(flag: c_int) {
    global().set_calc_unused_sigs(flag != 0);
}

/// Return calcUnusedSigs value
#[no_mangle]
pub extern "C" fn verilated_calc_unused_sigs() -> c_int {
    to_c_bool(global().calc_unused_sigs())
}

/// Did the simulation $finish?
#[no_mangle]
pub extern "C" fn verilated_set_got_finish(flag: c_int) {
    global().set_got_finish(flag != 0);
}

/// Return if got a $finish
#[no_mangle]
pub extern "C" fn verilated_got_finish() -> c_int {
    to_c_bool(global().got_finish())
}

/// Allow traces to at some point be enabled (disables some optimizations)
#[no_mangle]
pub extern "C" fn verilated_trace_ever_on(flag: c_int) {
    global().set_trace_ever_on(flag != 0);
}

/// Enable/disable assertions
#[no_mangle]
pub extern "C" fn verilated_set_assert_on(flag: c_int) {
    global().set_assert_on(flag != 0);
}

#[no_mangle]
pub extern "C" fn verilated_assert_on() -> c_int {
    to_c_bool(global().assert_on())
}

/// Enable/disable vpi fatal
#[no_mangle]
pub extern "C" fn verilated_set_fatal_on_vpi_error(flag: c_int) {
    global().set_fatal_on_vpi_error(flag != 0);
}

#[no_mangle]
pub extern "C" fn verilated_fatal_on_vpi_error() -> c_int {
    to_c_bool(global().fatal_on_vpi_error())
}

/// Stop after this many errors
#[no_mangle]
pub extern "C" fn verilated_set_error_limit(limit: c_int) {
    global().set_error_limit(limit);
}

#[no_mangle]
pub extern "C" fn verilated_error_limit() -> c_int {
    global().error_limit()
}

// ============================================================================
// Time Unit / Precision
// ============================================================================

fn power_arg(value: c_int) -> Option<TimeUnit> {
    // Either sign is accepted: 9 and -9 both mean 1ns
    match TimeUnit::from_power(-value.saturating_abs()) {
        Ok(unit) => Some(unit),
        Err(e) => {
            tracing::warn!(target: "verilated", "{}", e);
            None
        }
    }
}

/// Set time unit as a power of ten (9 or -9 = 1ns)
#[no_mangle]
pub extern "C" fn verilated_set_timeunit(value: c_int) {
    if let Some(unit) = power_arg(value) {
        global().set_time_unit(unit);
    }
}

/// Return time unit as a negative power of ten
#[no_mangle]
pub extern "C" fn verilated_timeunit() -> c_int {
    global().time_unit().power()
}

/// Return time unit as a string such as "1ns" (static storage)
#[no_mangle]
pub extern "C" fn verilated_timeunit_string() -> *const c_char {
    global().time_unit().as_c_str().as_ptr()
}

/// Set time precision as a power of ten (12 or -12 = 1ps)
#[no_mangle]
pub extern "C" fn verilated_set_timeprecision(value: c_int) {
    if let Some(unit) = power_arg(value) {
        global().set_time_precision(unit);
    }
}

#[no_mangle]
pub extern "C" fn verilated_timeprecision() -> c_int {
    global().time_precision().power()
}

#[no_mangle]
pub extern "C" fn verilated_timeprecision_string() -> *const c_char {
    global().time_precision().as_c_str().as_ptr()
}

// ============================================================================
// Command Arguments
// ============================================================================

static PLUS_MATCH: Mutex<Option<CString>> = parking_lot::const_mutex(None);

/// Record command line arguments, for retrieval by $test$plusargs/$value$plusargs
#[no_mangle]
pub unsafe extern "C" fn verilated_command_args(argc: c_int, argv: *const *const c_char) {
    let args = argv_to_vec(argc, argv);
    if let Err(e) = global().command_args(args) {
        tracing::error!(target: "verilated", "{}", e);
    }
}

/// Append command line arguments to those already recorded
#[no_mangle]
pub unsafe extern "C" fn verilated_command_args_add(argc: c_int, argv: *const *const c_char) {
    let args = argv_to_vec(argc, argv);
    if let Err(e) = global().add_command_args(args) {
        tracing::error!(target: "verilated", "{}", e);
    }
}

/// Match plusargs with a given prefix (without the leading '+')
///
/// Returns the whole matching argument, or "" if none matches. The string
/// is valid only until the next call; do not free it.
#[no_mangle]
pub unsafe extern "C" fn verilated_command_args_plus_match(prefixp: *const c_char) -> *const c_char {
    let matched = str_arg(prefixp)
        .and_then(|prefix| global().plus_match(prefix))
        .unwrap_or_default();
    let matched = CString::new(matched).unwrap_or_default();

    let mut slot = PLUS_MATCH.lock();
    slot.insert(matched).as_ptr()
}

// ============================================================================
// Identification / Diagnostics
// ============================================================================

/// Produce name & version for (at least) VPI
#[no_mangle]
pub extern "C" fn verilated_product_name() -> *const c_char {
    static NAME: OnceLock<CString> = OnceLock::new();
    static_c_string(&NAME, PRODUCT_NAME)
}

#[no_mangle]
pub extern "C" fn verilated_product_version() -> *const c_char {
    static VERSION: OnceLock<CString> = OnceLock::new();
    static_c_string(&VERSION, PRODUCT_VERSION)
}

/// For debugging, print much of the internal state.
/// The output of this function may change in future releases.
#[no_mangle]
pub extern "C" fn verilated_internals_dump() {
    global().internals_dump();
}

/// For debugging, print text list of all scope names.
/// The output of this function may change in future releases.
#[no_mangle]
pub extern "C" fn verilated_scopes_dump() {
    global().scopes_dump();
}

/// Internal state as JSON (caller must free with verilated_free_string)
/// Returns null on error
#[no_mangle]
pub extern "C" fn verilated_internals_json() -> *mut c_char {
    let json = global()
        .internals_json()
        .and_then(|json| Ok(CString::new(json)?));
    match json {
        Ok(json) => json.into_raw(),
        Err(e) => {
            tracing::error!(target: "verilated", "{}", e);
            ptr::null_mut()
        }
    }
}

/// Free a string returned by verilated_internals_json
#[no_mangle]
pub unsafe extern "C" fn verilated_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Coverage
// ============================================================================

/// Return default filename
#[no_mangle]
pub extern "C" fn verilated_cov_default_filename() -> *const c_char {
    static NAME: OnceLock<CString> = OnceLock::new();
    static_c_string(&NAME, cov::DEFAULT_FILENAME)
}

/// Insert a coverage point; returns its id (never 0)
#[no_mangle]
pub unsafe extern "C" fn verilated_cov_insert(
    filename: *const c_char,
    line: c_int,
    page: *const c_char,
    comment: *const c_char,
    hier: *const c_char,
) -> u64 {
    let text = |s| str_arg(s).unwrap_or_default().to_string();
    let point = CoverPoint {
        filename: text(filename),
        line: line.max(0) as u32,
        page: text(page),
        comment: text(comment),
        hier: text(hier),
    };
    global().cov_insert(point).as_raw()
}

/// Count one hit on a coverage point
#[no_mangle]
pub extern "C" fn verilated_cov_inc(id: u64) {
    if !global().cov_increment(CoverId::from_raw(id)) {
        tracing::debug!(target: "verilated::cov", "increment of unknown point {}", id);
    }
}

/// Write all coverage data to a file (null = default filename)
#[no_mangle]
pub unsafe extern "C" fn verilated_cov_write(filename: *const c_char) {
    let path = path_arg(filename).unwrap_or_else(|| PathBuf::from(cov::DEFAULT_FILENAME));
    if let Err(e) = global().cov_write(path) {
        tracing::error!(target: "verilated::cov", "{}", e);
    }
}

/// Clear coverage points (and call delete on all items)
#[no_mangle]
pub extern "C" fn verilated_cov_clear() {
    global().cov_clear();
}

/// Clear items not matching the provided string
#[no_mangle]
pub unsafe extern "C" fn verilated_cov_clear_non_match(matchp: *const c_char) {
    if let Some(pattern) = str_arg(matchp) {
        global().cov_clear_non_match(pattern);
    }
}

/// Zero coverage points
#[no_mangle]
pub extern "C" fn verilated_cov_zero() {
    global().cov_zero();
}

// ============================================================================
// Flush / Exit Callbacks (engine 4.038+)
// ============================================================================

/// Callbacks to run on global flush
#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub unsafe extern "C" fn verilated_add_flush_cb(cb: Option<VoidPCb>, datap: *mut c_void) {
    if let Some(cb) = cb {
        global().add_flush_cb(Callback::new(cb, datap));
    }
}

#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub unsafe extern "C" fn verilated_remove_flush_cb(cb: Option<VoidPCb>, datap: *mut c_void) {
    if let Some(cb) = cb {
        global().remove_flush_cb(Callback::new(cb, datap));
    }
}

#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub extern "C" fn verilator_run_flush_callbacks() {
    global().run_flush_callbacks();
}

/// Callbacks to run prior to termination
#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub unsafe extern "C" fn verilated_add_exit_cb(cb: Option<VoidPCb>, datap: *mut c_void) {
    if let Some(cb) = cb {
        global().add_exit_cb(Callback::new(cb, datap));
    }
}

#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub unsafe extern "C" fn verilated_remove_exit_cb(cb: Option<VoidPCb>, datap: *mut c_void) {
    if let Some(cb) = cb {
        global().remove_exit_cb(Callback::new(cb, datap));
    }
}

#[cfg(verilated_callbacks = "list")]
#[no_mangle]
pub extern "C" fn verilator_run_exit_callbacks() {
    global().run_exit_callbacks();
}

// ============================================================================
// Flush Callback (engines before 4.038)
// ============================================================================

/// Flush callback for VCD waves
#[cfg(verilated_callbacks = "slot")]
#[no_mangle]
pub unsafe extern "C" fn verilated_flush_cb(cb: Option<VoidCb>) {
    if let Some(cb) = cb {
        if let Err(e) = global().set_flush_cb(cb) {
            tracing::error!(target: "verilated", "{}", e);
        }
    }
}

#[cfg(verilated_callbacks = "slot")]
#[no_mangle]
pub extern "C" fn verilated_flush_call() {
    global().flush_call();
}

// ============================================================================
// VCD Dump Handles
// ============================================================================

/// Create a closed dump handle (caller must free with verilatedvcdc_delete)
#[no_mangle]
pub extern "C" fn verilatedvcdc_new() -> *mut VerilatedVcdC {
    Box::into_raw(Box::new(VcdDump::new()))
}

/// Destroy a dump handle, closing its file
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_delete(vcd: *mut VerilatedVcdC) {
    if !vcd.is_null() {
        drop(Box::from_raw(vcd));
    }
}

/// Is file open?
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_is_open(vcd: *const VerilatedVcdC) -> c_int {
    if vcd.is_null() {
        return 0;
    }
    to_c_bool((*vcd).is_open())
}

/// Open a new VCD file
/// This includes a complete header dump each time it is called,
/// just as if this object was deleted and reconstructed.
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_open(vcd: *mut VerilatedVcdC, filename: *const c_char) {
    if vcd.is_null() {
        return;
    }
    let Some(path) = path_arg(filename) else {
        return;
    };
    if let Err(e) = (*vcd).open(path) {
        tracing::error!(target: "verilated::vcd", "{}", e);
    }
}

/// Continue a VCD dump by rotating to a new file name
/// The header is only in the first file created, this allows
/// "cat" to be used to combine the header plus any number of data files.
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_open_next(vcd: *mut VerilatedVcdC, inc_filename: c_int) {
    if vcd.is_null() {
        return;
    }
    if let Err(e) = (*vcd).open_next(inc_filename != 0) {
        tracing::error!(target: "verilated::vcd", "{}", e);
    }
}

/// Set size after which a new file should be created
/// Bytes for engines from 4.226, megabytes before
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_rollover_mb(vcd: *mut VerilatedVcdC, rollover_size: usize) {
    if !vcd.is_null() {
        (*vcd).set_rollover_size(rollover_size as u64);
    }
}

/// Close dump
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_close(vcd: *mut VerilatedVcdC) {
    if vcd.is_null() {
        return;
    }
    if let Err(e) = (*vcd).close() {
        tracing::error!(target: "verilated::vcd", "{}", e);
    }
}

/// Flush dump
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_flush(vcd: *mut VerilatedVcdC) {
    if vcd.is_null() {
        return;
    }
    if let Err(e) = (*vcd).flush() {
        tracing::error!(target: "verilated::vcd", "{}", e);
    }
}

/// Write one cycle of dump data
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_dump(vcd: *mut VerilatedVcdC, timeui: u64) {
    if vcd.is_null() {
        return;
    }
    if let Err(e) = (*vcd).dump(timeui) {
        tracing::error!(target: "verilated::vcd", "{}", e);
    }
}

/// Set time units (s/ms, defaults to ns)
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_set_time_unit(vcd: *mut VerilatedVcdC, unit: *const c_char) {
    if vcd.is_null() {
        return;
    }
    if let Some(unit) = str_arg(unit) {
        if let Err(e) = (*vcd).set_time_unit(unit) {
            tracing::warn!(target: "verilated::vcd", "{}", e);
        }
    }
}

/// Set time resolution (s/ms, defaults to ns)
#[no_mangle]
pub unsafe extern "C" fn verilatedvcdc_set_time_resolution(
    vcd: *mut VerilatedVcdC,
    unit: *const c_char,
) {
    if vcd.is_null() {
        return;
    }
    if let Some(unit) = str_arg(unit) {
        if let Err(e) = (*vcd).set_time_resolution(unit) {
            tracing::warn!(target: "verilated::vcd", "{}", e);
        }
    }
}
