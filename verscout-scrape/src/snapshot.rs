//! Flat snapshot file: a header row, then one value per row.
use crate::csv::{parse_rows, write_row};
use crate::result_set::ResultSet;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use verscout_common::{Result, ScoutError};

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    header: String,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, header: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            header: header.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values in file order, header skipped.
    ///
    /// A missing or unreadable file is an empty snapshot, not an error.
    pub fn load(&self) -> Vec<String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "snapshot not found; assuming no existing values");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "error reading snapshot; assuming no existing values");
                return Vec::new();
            }
        };

        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let values: Vec<String> = parse_rows(text)
            .into_iter()
            .skip(1)
            .filter_map(|row| row.into_iter().next())
            .map(|field| {
                // Quoted cells keep their whitespace; it was written that way.
                if field.quoted {
                    field.value
                } else {
                    field.value.trim().to_string()
                }
            })
            .filter(|v| !v.is_empty())
            .collect();

        info!(path = %self.path.display(), count = values.len(), "snapshot loaded");
        values
    }

    /// Overwrite the file with the header and one row per value, in order.
    /// Returns the number of value rows written.
    pub fn save(&self, values: &ResultSet) -> Result<usize> {
        self.write(values).map_err(|source| ScoutError::Snapshot {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = values.len(), "snapshot written");
        Ok(values.len())
    }

    fn write(&self, values: &ResultSet) -> std::io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(&self.path)?);
        write_row(&mut out, &[self.header.as_str()])?;
        for value in values {
            write_row(&mut out, &[value.as_str()])?;
        }
        out.flush()
    }
}
