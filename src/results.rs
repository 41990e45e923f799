use crate::app_dirs::AppDirs;
use crate::session::{ClickRecord, RoundSummary};
use crate::util::epoch_secs;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// The document written once per completed round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResults {
    /// Local wall-clock time the round ended, "YYYY-MM-DD HH:MM:SS"
    pub date: String,
    pub score: u32,
    pub clicks: Vec<ClickRecord>,
}

/// Where completed rounds go. Write-only; nothing in the program reads the
/// documents back.
pub trait ResultsSink {
    fn write(&self, results: &RoundResults, ended_at: SystemTime) -> io::Result<PathBuf>;
}

/// Writes `results_<unix_epoch_seconds>.json` into a directory. The epoch
/// suffix keeps filenames from colliding across runs ending at different
/// seconds.
#[derive(Debug, Clone)]
pub struct FileResultsSink {
    dir: PathBuf,
}

impl FileResultsSink {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileResultsSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsSink for FileResultsSink {
    fn write(&self, results: &RoundResults, ended_at: SystemTime) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(format!("results_{}.json", epoch_secs(ended_at) as u64));
        let data = serde_json::to_vec_pretty(results)?;
        fs::write(&path, data)?;
        Ok(path)
    }
}

/// Append-only per-round history under the platform state directory, one CSV
/// row per completed round. Best effort: a missing state directory disables
/// the log rather than the game.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: Option<PathBuf>,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: Some(p.as_ref().to_path_buf()),
        }
    }

    pub fn append(&self, summary: &RoundSummary, duration: Duration) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !path.exists();

        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer
                .write_record([
                    "date",
                    "duration_secs",
                    "score",
                    "total_clicks",
                    "accuracy_pct",
                    "mean_reaction_ms",
                    "std_dev_ms",
                ])
                .map_err(into_io)?;
        }

        writer
            .write_record([
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                duration.as_secs().to_string(),
                summary.score.to_string(),
                summary.total_clicks.to_string(),
                format!("{:.1}", summary.accuracy),
                format!("{:.1}", summary.mean_reaction_ms),
                format!("{:.1}", summary.std_dev_ms),
            ])
            .map_err(into_io)?;
        writer.flush()?;
        Ok(())
    }
}

fn into_io(err: csv::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}
