use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// Destination for rendered documents.
pub trait OutputSink {
    /// Called once before anything is fetched.
    fn prepare(&mut self) -> Result<()>;

    /// Opens the output for the document at `path` (without extension).
    fn open(&mut self, path: &str) -> Result<Box<dyn Write + '_>>;

    /// Drops whatever `open` produced for `path` after a failed render.
    fn discard(&mut self, path: &str) -> Result<()>;
}

/// Refuses to reuse an existing output directory unless `overwrite` is set.
pub fn prepare_output_dir(output_dir: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && output_dir.exists() {
        return Err(Error::OutputExists(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Writes each document to `<directory>/<path>.md`.
pub struct DirectorySink {
    directory: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            directory: directory.into(),
            overwrite,
        }
    }

    /// Maps a `/`-separated document path below `directory`.
    ///
    /// Empty, `.` and `..` segments (e.g. from untitled folders) are dropped
    /// so the result never leaves the output directory.
    pub fn document_path(&self, path: &str) -> PathBuf {
        let segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .collect();

        let mut file_path = self.directory.clone();
        match segments.split_last() {
            Some((name, folders)) => {
                file_path.extend(folders);
                file_path.push(format!("{name}.md"));
            }
            None => file_path.push("untitled.md"),
        }
        file_path
    }
}

impl OutputSink for DirectorySink {
    fn prepare(&mut self) -> Result<()> {
        prepare_output_dir(&self.directory, self.overwrite)
    }

    fn open(&mut self, path: &str) -> Result<Box<dyn Write + '_>> {
        let file_path = self.document_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("{}", file_path.display());
        Ok(Box::new(BufWriter::new(File::create(file_path)?)))
    }

    fn discard(&mut self, path: &str) -> Result<()> {
        let file_path = self.document_path(path);
        if file_path.exists() {
            fs::remove_file(file_path)?;
        }
        Ok(())
    }
}

/// Keeps rendered documents in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub documents: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn text(&self, path: &str) -> Option<String> {
        self.documents
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl OutputSink for MemorySink {
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn open(&mut self, path: &str) -> Result<Box<dyn Write + '_>> {
        let buffer = self.documents.entry(path.to_string()).or_default();
        buffer.clear();
        Ok(Box::new(buffer))
    }

    fn discard(&mut self, path: &str) -> Result<()> {
        self.documents.remove(path);
        Ok(())
    }
}
