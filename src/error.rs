//! Error types for the Verilated runtime

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerilatedError {
    #[error("Can't write to file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid time unit: {0:?}")]
    InvalidTimeUnit(String),

    #[error("Time unit 10^{0}s is outside 1fs..100s")]
    TimeUnitOutOfRange(i32),

    #[error("Unknown runtime argument: {0}")]
    UnknownRuntimeArg(String),

    #[error("Invalid value in runtime argument: {0}")]
    InvalidRuntimeArg(String),

    #[error("Turning on wave traces requires trace_ever_on(true) before time 0")]
    TraceNotEnabled,

    #[error("Flush callback already registered with a different function")]
    FlushCallbackConflict,

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("String contains an interior NUL byte: {0}")]
    Nul(#[from] std::ffi::NulError),
}

pub type Result<T> = std::result::Result<T, VerilatedError>;
