//! Coverage point registry
//!
//! Points are inserted once by the model and incremented as it runs. The
//! database is written in the `SystemC::Coverage-3` text format read by
//! `verilator_coverage`: one `C '<keys>' <count>` line per point, keys
//! separated by `\x01` and key/value by `\x02`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, VerilatedError};

/// File name used when none is given
pub const DEFAULT_FILENAME: &str = "coverage.dat";

const HEADER: &str = "# SystemC::Coverage-3\n";

/// Handle to an inserted point; stays unique after `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoverId(u64);

impl CoverId {
    pub fn from_raw(raw: u64) -> Self {
        CoverId(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Source location and naming of a coverage point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverPoint {
    pub filename: String,
    pub line: u32,
    pub page: String,
    pub comment: String,
    pub hier: String,
}

impl CoverPoint {
    fn fields(&self) -> [(&'static str, String); 5] {
        [
            ("f", self.filename.clone()),
            ("l", self.line.to_string()),
            ("page", self.page.clone()),
            ("o", self.comment.clone()),
            ("h", self.hier.clone()),
        ]
    }

    fn key(&self) -> String {
        let mut key = String::new();
        for (name, value) in self.fields() {
            if value.is_empty() {
                continue;
            }
            key.push('\x01');
            key.push_str(name);
            key.push('\x02');
            key.push_str(&value);
        }
        key
    }

    fn matches(&self, pattern: &str) -> bool {
        self.fields().iter().any(|(_, value)| value.contains(pattern))
    }
}

#[derive(Debug, Default)]
struct Entry {
    point: CoverPoint,
    count: u64,
}

/// Coverage points in insertion order
#[derive(Debug, Default)]
pub struct CoverageDb {
    entries: BTreeMap<CoverId, Entry>,
    next_id: u64,
}

impl CoverageDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: CoverPoint) -> CoverId {
        self.next_id += 1;
        let id = CoverId(self.next_id);
        self.entries.insert(id, Entry { point, count: 0 });
        id
    }

    /// Add one to a point; false if the point was cleared
    pub fn increment(&mut self, id: CoverId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, id: CoverId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every point
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove points with no field containing `pattern`; empty keeps all
    pub fn clear_non_match(&mut self, pattern: &str) {
        if pattern.is_empty() {
            return;
        }
        self.entries.retain(|_, e| e.point.matches(pattern));
    }

    /// Reset every count to zero, keeping the points
    pub fn zero(&mut self) {
        for entry in self.entries.values_mut() {
            entry.count = 0;
        }
    }

    /// Render the database as coverage file text
    pub fn to_text(&self) -> String {
        let mut text = String::from(HEADER);
        for entry in self.entries.values() {
            text.push_str(&format!("C '{}' {}\n", entry.point.key(), entry.count));
        }
        text
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        write_text(path.as_ref(), &self.to_text())
    }
}

/// Write rendered coverage text to `path`
pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    let io_error = |source| VerilatedError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(io_error)?;
    writer.flush().map_err(io_error)?;
    tracing::debug!(target: "verilated::cov", "wrote {}", path.display());
    Ok(())
}
