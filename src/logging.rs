use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Global log file handle. When `Some`, `tlog!` writes to this file as well.
pub(crate) static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

/// Whether `tlog!` echoes to stderr. Off while the interactive console owns
/// the terminal unless `--verbose` was given.
pub(crate) static STDERR_ENABLED: AtomicBool = AtomicBool::new(true);

pub(crate) fn set_stderr_logging(enabled: bool) {
    STDERR_ENABLED.store(enabled, Ordering::Relaxed);
}

pub(crate) fn stderr_logging() -> bool {
    STDERR_ENABLED.load(Ordering::Relaxed)
}

/// Initialise file logging to the given directory.
/// Creates a timestamped log file and a `serial-debug.log` symlink (Unix only).
pub(crate) fn init_file_logging(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create log dir: {}", e))?;

    let filename = chrono::Local::now()
        .format("%Y%m%d-%H%M%S-serial-debug.log")
        .to_string();
    let log_path = log_dir.join(&filename);

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to create log file: {}", e))?;

    // Windows symlinks require elevated privileges
    #[cfg(unix)]
    {
        let symlink_path = log_dir.join("serial-debug.log");
        let _ = std::fs::remove_file(&symlink_path);
        if let Err(e) = std::os::unix::fs::symlink(&filename, &symlink_path) {
            eprintln!(
                "{} [logging] Failed to create serial-debug.log symlink: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                e
            );
        }
    }

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }

    // tlog! would lock LOG_FILE again
    if stderr_logging() {
        eprintln!(
            "{} [logging] File logging started: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            log_path.display()
        );
    }

    Ok(())
}

/// Stop file logging and close the log file.
pub(crate) fn stop_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if guard.is_some() {
            *guard = None;
            if stderr_logging() {
                eprintln!(
                    "{} [logging] File logging stopped",
                    chrono::Local::now().format("%H:%M:%S%.3f")
                );
            }
        }
    }
}

/// Timestamped logging macro.
/// Prepends `HH:MM:SS.mmm` local time to every message written to stderr.
/// Also writes to the log file when file logging is enabled.
macro_rules! tlog {
    ($($arg:tt)*) => {{
        use std::io::Write as _;
        let msg = format!("{} {}", chrono::Local::now().format("%H:%M:%S%.3f"), format_args!($($arg)*));
        if $crate::logging::stderr_logging() {
            eprintln!("{}", msg);
        }
        if let Ok(mut guard) = $crate::logging::LOG_FILE.lock() {
            if let Some(ref mut f) = *guard {
                let _ = writeln!(f, "{}", msg);
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_writes_lines_and_symlink() {
        let dir = tempfile::tempdir().unwrap();
        init_file_logging(dir.path()).unwrap();
        tlog!("[test] hello from the log");
        stop_file_logging();

        let logs: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with("-serial-debug.log"))
            .collect();
        assert_eq!(logs.len(), 1);

        let content = std::fs::read_to_string(dir.path().join(&logs[0])).unwrap();
        assert!(content.contains("[test] hello from the log"));

        #[cfg(unix)]
        assert!(dir.path().join("serial-debug.log").exists());
    }
}
