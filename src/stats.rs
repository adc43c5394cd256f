use crate::error::{GameError, Result};
use crate::tracker::SessionSummary;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of columns in a statistics row.
pub const COLUMN_COUNT: usize = 19;

/// Append-only table of finished sessions.
pub trait SessionStore {
    fn append(&mut self, summary: &SessionSummary) -> Result<()>;

    /// Every readable row, oldest first. Missing or damaged data is skipped.
    fn load_all(&self) -> Vec<SessionSummary>;
}

/// Headerless CSV file, one row per session.
#[derive(Debug, Clone)]
pub struct CsvStatsTable {
    path: PathBuf,
}

impl CsvStatsTable {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for CsvStatsTable {
    fn append(&mut self, summary: &SessionSummary) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(summary)?;
        writer.flush()?;

        debug!(path = %self.path.display(), score = summary.score, "session row appended");
        Ok(())
    }

    fn load_all(&self) -> Vec<SessionSummary> {
        if !self.path.exists() {
            return Vec::new();
        }

        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "statistics table unreadable");
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for (line, record) in reader.deserialize::<SessionSummary>().enumerate() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => warn!(line = line + 1, error = %e, "skipping bad statistics row"),
            }
        }
        rows
    }
}

/// In-memory table for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<SessionSummary>,
}

impl MemoryStore {
    pub fn rows(&self) -> &[SessionSummary] {
        &self.rows
    }
}

impl SessionStore for MemoryStore {
    fn append(&mut self, summary: &SessionSummary) -> Result<()> {
        self.rows.push(summary.clone());
        Ok(())
    }

    fn load_all(&self) -> Vec<SessionSummary> {
        self.rows.clone()
    }
}

/// The best score, kept as a single integer in a text file.
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored score. A missing or unparseable file is a startup
    /// error; callers decide whether to fall back to zero.
    pub fn load(&self) -> Result<u32> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            GameError::Startup(format!("cannot read {}: {e}", self.path.display()))
        })?;
        contents
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .parse::<u32>()
            .map_err(|e| {
                GameError::Startup(format!("bad high score in {}: {e}", self.path.display()))
            })
    }

    /// Replace the stored score. Writes a sibling temp file and renames it
    /// over the old one.
    pub fn save(&self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{score}\n"))?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
