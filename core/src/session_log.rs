//! Timestamped request/response log for one client session.
//!
//! Each session writes to its own file under the log directory, named after
//! the local time the session started. Lines are `<timestamp> <message>`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

const HEADER: &str = "Logging started. Date|Time Format: DD-MM-YY-HH-MM-SS";

/// Local time as `day-month-year-hour-minute-second`, without zero padding.
pub fn timestamp() -> String {
    Local::now().format("%-d-%-m-%Y-%-H-%-M-%-S").to_string()
}

#[derive(Debug, Default)]
pub struct SessionLog {
    file: Option<(PathBuf, File)>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// Open a new log file under `dir` and write the header line.
    ///
    /// A no-op when the log is already active.
    pub fn start(&mut self, dir: &Path) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", timestamp()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(path = %path.display(), "logging started");
        self.file = Some((path, file));
        self.log(HEADER);
        Ok(())
    }

    /// Append one timestamped line. Does nothing when the log is inactive.
    pub fn log(&mut self, message: &str) {
        if let Some((path, file)) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{} {}", timestamp(), message) {
                warn!(path = %path.display(), error = %e, "failed to write session log");
            }
        }
    }
}
