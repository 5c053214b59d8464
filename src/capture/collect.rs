use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::parse::{parse_hop_table, split_capture_file_name, split_trace_lines};
use super::record::Capture;

/// Supplier of parsed captures, in discovery order.
pub trait CaptureSource {
    fn list_captures(&self) -> Result<Vec<Capture>>;
}

/// Reads `<dir>/<timestamp>-<name>.csv` hop tables and their
/// `<traces>/<name>.trace` companions.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    uploads_dir: PathBuf,
    traces_dir: PathBuf,
    limit: usize,
}

impl DirectorySource {
    pub fn new(uploads_dir: impl Into<PathBuf>, traces_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            traces_dir: traces_dir.into(),
            limit: 50,
        }
    }

    /// Keep only the newest `limit` files (by sorted name).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn capture_file_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.uploads_dir).with_context(|| {
            format!("failed to read capture directory {}", self.uploads_dir.display())
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to list capture directory {}", self.uploads_dir.display())
            })?;
            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !name.ends_with(".csv") {
                continue;
            }
            names.push(name);
        }

        names.sort();
        let skip = names.len().saturating_sub(self.limit);
        Ok(names.split_off(skip))
    }

    fn load_capture(&self, file_name: &str) -> Result<Capture> {
        let (id, trace_name) = split_capture_file_name(file_name)?;

        let table_path = self.uploads_dir.join(file_name);
        let raw_table = fs::read_to_string(&table_path)
            .with_context(|| format!("failed to read hop table {}", table_path.display()))?;
        let table = parse_hop_table(&raw_table)
            .with_context(|| format!("failed to parse hop table {}", table_path.display()))?;

        let trace_path = self.traces_dir.join(format!("{trace_name}.trace"));
        let raw_lines = match fs::read_to_string(&trace_path) {
            Ok(raw) => split_trace_lines(&raw),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %trace_path.display(), "trace companion missing");
                Vec::new()
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read trace {}", trace_path.display()));
            }
        };

        Ok(Capture::new(id, raw_lines, table))
    }
}

impl CaptureSource for DirectorySource {
    fn list_captures(&self) -> Result<Vec<Capture>> {
        let names = self.capture_file_names()?;
        let mut captures = Vec::with_capacity(names.len());

        for name in &names {
            match self.load_capture(name) {
                Ok(capture) => captures.push(capture),
                Err(error) => warn!(file = %name, "skipping capture: {error:#}"),
            }
        }

        info!(
            dir = %self.uploads_dir.display(),
            captures = captures.len(),
            "loaded captures"
        );
        Ok(captures)
    }
}

/// Fixed in-memory capture list.
impl CaptureSource for Vec<Capture> {
    fn list_captures(&self) -> Result<Vec<Capture>> {
        Ok(self.clone())
    }
}
