//! VCD (Value Change Dump) Writer
//!
//! Single-owner dump handle with support for:
//! - Header written once per `open`, so rotated files concatenate with `cat`
//! - Rotation to `_catNNNN` file names, manual or on a rollover threshold
//! - Time unit / resolution declared in the `$timescale` header
//! - Declared signals written on change (all of them on the first record
//!   of each file)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VerilatedError};
use crate::time_unit::TimeUnit;
use crate::{PRODUCT_NAME, PRODUCT_VERSION};

/// Index of a declared signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(usize);

/// VCD dump handle
pub struct VcdDump {
    /// Signal names (indexed by signal index)
    signal_names: Vec<String>,

    /// Signal widths (indexed by signal index)
    signal_widths: Vec<usize>,

    /// VCD identifier for each signal (indexed by signal index)
    vcd_ids: Vec<String>,

    /// Current signal values
    values: Vec<u64>,

    /// Values as of the last record, for change detection
    prev_values: Vec<u64>,

    /// Signals declared in the header of the current session
    header_signals: usize,

    /// Module name for the top scope
    module_name: String,

    /// File writer while open
    file_writer: Option<BufWriter<File>>,

    /// Name of the current file (mangled with `_catNNNN` once rotated)
    filename: Option<PathBuf>,

    /// Next record writes every signal
    full_dump: bool,

    /// Bytes written to the current file
    wrote_bytes: u64,

    /// Rollover threshold as configured (0 = never)
    rollover_size: u64,

    /// Unit of the times passed to `dump`
    time_unit: TimeUnit,

    /// Unit of the times written to the file
    time_resolution: TimeUnit,

    /// Time records written since creation
    record_count: u64,
}

impl VcdDump {
    /// Create a closed dump handle
    pub fn new() -> Self {
        Self {
            signal_names: Vec::new(),
            signal_widths: Vec::new(),
            vcd_ids: Vec::new(),
            values: Vec::new(),
            prev_values: Vec::new(),
            header_signals: 0,
            module_name: "TOP".to_string(),
            file_writer: None,
            filename: None,
            full_dump: true,
            wrote_bytes: 0,
            rollover_size: 0,
            time_unit: TimeUnit::NS,
            time_resolution: TimeUnit::NS,
            record_count: 0,
        }
    }

    /// Convert an index to a VCD identifier (ASCII-safe)
    fn idx_to_vcd_id(idx: usize) -> String {
        // VCD allows printable ASCII 33-126 (94 characters)
        let base = 94;
        let offset = 33u8; // '!'

        if idx < base {
            return ((offset + idx as u8) as char).to_string();
        }

        // Multi-character: bijective base-94
        let mut result = String::new();
        let mut n = idx;
        loop {
            result.insert(0, (offset + (n % base) as u8) as char);
            n /= base;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        result
    }

    /// Set the module name for the top scope
    pub fn set_module_name(&mut self, name: &str) {
        self.module_name = name.to_string();
    }

    /// Declare a traced signal
    ///
    /// Signals declared while open are written from the next `open`.
    pub fn declare(&mut self, name: &str, width: usize) -> SignalId {
        let idx = self.signal_names.len();
        if self.is_open() {
            tracing::warn!(
                target: "verilated::vcd",
                "signal {} declared while open; traced from the next open",
                name
            );
        }
        self.signal_names.push(name.to_string());
        self.signal_widths.push(width.clamp(1, 64));
        self.vcd_ids.push(Self::idx_to_vcd_id(idx));
        self.values.push(0);
        self.prev_values.push(0);
        SignalId(idx)
    }

    /// Update a signal's current value (masked to its width)
    ///
    /// Ids not declared on this dump are ignored.
    pub fn set(&mut self, id: SignalId, value: u64) {
        let (Some(&width), Some(slot)) = (self.signal_widths.get(id.0), self.values.get_mut(id.0))
        else {
            tracing::warn!(target: "verilated::vcd", "set on undeclared signal {:?}", id);
            return;
        };
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        *slot = value & mask;
    }

    pub fn signal_count(&self) -> usize {
        self.signal_names.len()
    }

    /// Is file open?
    pub fn is_open(&self) -> bool {
        self.file_writer.is_some()
    }

    /// File currently (or last) written
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Open a new VCD file
    ///
    /// This includes a complete header dump each time it is called, just as
    /// if this object was deleted and reconstructed. Ignored when already
    /// open. With a rollover threshold set the first file is `_cat0000`.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.is_open() {
            tracing::debug!(target: "verilated::vcd", "open ignored, already open");
            return Ok(());
        }

        self.filename = Some(path.as_ref().to_path_buf());
        self.open_next_inner(self.rollover_size != 0)?;

        self.header_signals = self.signal_names.len();
        self.write_header()
    }

    /// Continue the dump by rotating to a new file
    ///
    /// The header is only in the first file created, this allows "cat" to
    /// be used to combine the header plus any number of data files. Without
    /// `inc_filename` the current file name is reopened (and truncated).
    pub fn open_next(&mut self, inc_filename: bool) -> Result<()> {
        if !self.is_open() {
            tracing::warn!(target: "verilated::vcd", "open_next called before open");
            return Ok(());
        }
        self.open_next_inner(inc_filename)
    }

    fn open_next_inner(&mut self, inc_filename: bool) -> Result<()> {
        self.close_file()?;

        let Some(mut path) = self.filename.clone() else {
            return Ok(());
        };
        if inc_filename {
            path = Self::next_cat_name(&path);
        }

        let file = File::create(&path).map_err(|source| VerilatedError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(target: "verilated::vcd", "writing {}", path.display());

        self.file_writer = Some(BufWriter::with_capacity(1 << 16, file));
        self.filename = Some(path);
        self.full_dump = true;
        self.wrote_bytes = 0;
        Ok(())
    }

    /// `wave.vcd` -> `wave_cat0000.vcd` -> `wave_cat0001.vcd` ...
    fn next_cat_name(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

        let new_stem = match stem.rfind("_cat") {
            Some(pos)
                if stem.len() == pos + 8
                    && stem[pos + 4..].bytes().all(|b| b.is_ascii_digit()) =>
            {
                let n: u32 = stem[pos + 4..].parse().unwrap_or(0);
                format!("{}_cat{:04}", &stem[..pos], (n + 1) % 10_000)
            }
            _ => format!("{}_cat0000", stem),
        };

        let file_name = match ext {
            Some(ext) => format!("{}.{}", new_stem, ext),
            None => new_stem,
        };
        path.with_file_name(file_name)
    }

    /// Set the rollover threshold
    ///
    /// Counted in bytes for engines from 4.226, in megabytes before. 0
    /// disables rollover. Checked before each record.
    pub fn set_rollover_size(&mut self, size: u64) {
        self.rollover_size = size;
    }

    pub fn rollover_size(&self) -> u64 {
        self.rollover_size
    }

    fn rollover_bytes(&self) -> u64 {
        if cfg!(verilated_rollover = "megabytes") {
            self.rollover_size.saturating_mul(1024 * 1024)
        } else {
            self.rollover_size
        }
    }

    /// Bytes written to the current file
    pub fn wrote_bytes(&self) -> u64 {
        self.wrote_bytes
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Close dump
    pub fn close(&mut self) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }
        self.close_file()?;
        tracing::debug!(target: "verilated::vcd", "closed after {} records", self.record_count);
        Ok(())
    }

    fn close_file(&mut self) -> Result<()> {
        if let Some(mut writer) = self.file_writer.take() {
            writer.flush().map_err(|source| self.io_error(source))?;
        }
        Ok(())
    }

    /// Flush dump
    pub fn flush(&mut self) -> Result<()> {
        let result = match self.file_writer {
            Some(ref mut writer) => writer.flush(),
            None => Ok(()),
        };
        result.map_err(|source| self.io_error(source))
    }

    /// Write one cycle of dump data at `time`, written as given
    ///
    /// Ignored while closed. Times are not required to increase.
    pub fn dump(&mut self, time: u64) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }

        let rollover = self.rollover_bytes();
        if rollover != 0 && self.wrote_bytes > rollover {
            self.open_next_inner(true)?;
        }

        let mut output = format!("#{}\n", time);
        for idx in 0..self.header_signals {
            let value = self.values[idx];
            if self.full_dump || value != self.prev_values[idx] {
                output.push_str(&Self::format_value(value, self.signal_widths[idx], &self.vcd_ids[idx]));
                output.push('\n');
                self.prev_values[idx] = value;
            }
        }
        self.full_dump = false;
        self.record_count += 1;
        self.write_str(&output)
    }

    /// Set time units (e.g. "1us")
    pub fn set_time_unit(&mut self, token: &str) -> Result<()> {
        self.time_unit = token.parse()?;
        Ok(())
    }

    /// Set time resolution (e.g. "1ps"); declared as `$timescale` on open
    pub fn set_time_resolution(&mut self, token: &str) -> Result<()> {
        self.time_resolution = token.parse()?;
        Ok(())
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn time_resolution(&self) -> TimeUnit {
        self.time_resolution
    }

    /// Write VCD header
    fn write_header(&mut self) -> Result<()> {
        let mut header = String::new();

        header.push_str(&format!(
            "$version Generated by VerilatedVcd ({} {}) $end\n",
            PRODUCT_NAME, PRODUCT_VERSION
        ));
        header.push_str(&format!("$timescale {} $end\n", self.time_resolution));
        header.push_str(&format!("$scope module {} $end\n", self.module_name));

        for idx in 0..self.header_signals {
            // Sanitize name for VCD (replace problematic chars)
            let safe_name = self.signal_names[idx]
                .replace(' ', "_")
                .replace('.', "_")
                .replace('[', "_")
                .replace(']', "");
            header.push_str(&format!(
                "$var wire {} {} {} $end\n",
                self.signal_widths[idx], self.vcd_ids[idx], safe_name
            ));
        }

        header.push_str("$upscope $end\n");
        header.push_str("$enddefinitions $end\n\n");

        self.write_str(&header)
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        let result = match self.file_writer {
            Some(ref mut writer) => writer.write_all(s.as_bytes()),
            None => Ok(()),
        };
        result.map_err(|source| self.io_error(source))?;
        self.wrote_bytes += s.len() as u64;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> VerilatedError {
        VerilatedError::Io {
            path: self.filename.clone().unwrap_or_default(),
            source,
        }
    }

    /// Format a signal value for VCD output
    fn format_value(value: u64, width: usize, vcd_id: &str) -> String {
        if width == 1 {
            format!("{}{}", value & 1, vcd_id)
        } else {
            // Format as binary with leading zeros
            let binary = format!("{:0width$b}", value, width = width);
            format!("b{} {}", binary, vcd_id)
        }
    }
}

impl Default for VcdDump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VcdDump {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!(target: "verilated::vcd", "close on drop failed: {}", e);
        }
    }
}
