use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::utils::logging::LogEntry;

/// Append-only log file for one run of the application.
///
/// Each run gets `safelink_<timestamp>.log` in the log directory and
/// `latest.log` is pointed at it.
pub struct LogFile {
    file: Mutex<Option<File>>,
    path: PathBuf,
}

impl LogFile {
    pub fn create_in(log_dir: &Path) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = log_dir.join(format!("safelink_{}.log", timestamp));
        let latest = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest);
            let _ = std::os::unix::fs::symlink(&path, &latest);
        }

        #[cfg(windows)]
        {
            let _ = std::fs::write(&latest, format!("Current log file: {}\n", path.display()));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok();

        Self {
            file: Mutex::new(file),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", entry.format_for_display());
                // Flushed per line so the file is complete after a crash
                let _ = file.flush();
            }
        }
    }

    pub fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_entries_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogFile::create_in(dir.path());
        log.write_entry(&LogEntry::new(Level::WARN, "requests", "chat failed".to_string()));
        log.flush();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("WARN [requests] chat failed"));
        assert!(log
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("safelink_"));
    }

    #[cfg(unix)]
    #[test]
    fn test_latest_points_at_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogFile::create_in(dir.path());
        let target = std::fs::read_link(dir.path().join("latest.log")).unwrap();
        assert_eq!(target, log.path());
    }
}
