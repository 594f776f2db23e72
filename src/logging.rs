// Process-wide log sink
//
// Connection and query events go through an injectable sink: the default
// appends to a file next to the running executable, tests capture in memory,
// and applications already running a tracing subscriber can bridge into it.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::Local;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Append-only log sink. Implementations must tolerate concurrent appends
/// from multiple manager instances.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Appends `timestamp - LEVEL - message` lines to a file.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the log file in append mode.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn log(&self, level: LogLevel, message: &str) {
        let line = format!(
            "{} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level.label(),
            message
        );
        if let Ok(mut file) = self.file.lock() {
            // A failed append is not worth failing the operation over.
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Captures log lines in memory. Test sink.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}

/// Forwards into the `tracing` ecosystem, for applications that already run a
/// subscriber.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: "mssql_bridge", "{message}"),
            LogLevel::Error => tracing::error!(target: "mssql_bridge", "{message}"),
        }
    }
}

/// Discards everything. Fallback when the default file cannot be opened.
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Default location: `mssql-bridge.log` next to the running executable, or in
/// the working directory when the executable path is unavailable.
pub fn default_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mssql-bridge.log")
}

/// The process-wide sink used by managers constructed without an explicit one.
pub fn default_sink() -> Arc<dyn LogSink> {
    static SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();
    SINK.get_or_init(|| match FileSink::open(default_log_path()) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            eprintln!("Warning: could not open log file: {e}");
            Arc::new(NoopSink)
        }
    })
    .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_levels_and_messages() {
        let sink = MemorySink::new();
        sink.info("connected to db.example.com/sales");
        sink.error("connection failed: refused");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, LogLevel::Info);
        assert_eq!(entries[1].0, LogLevel::Error);
        assert!(sink.contains("refused"));
    }

    #[test]
    fn file_sink_appends_severity_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.log");

        {
            let sink = FileSink::open(&path).unwrap();
            sink.info("first");
            sink.error("second");
        }
        // Reopening must append, not truncate.
        {
            let sink = FileSink::open(&path).unwrap();
            sink.info("third");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(" - INFO - first"));
        assert!(lines[1].contains(" - ERROR - second"));
        assert!(lines[2].contains(" - INFO - third"));
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.log");
        let sink = Arc::new(FileSink::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        sink.info(&format!("writer={i} line={j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.contains(" - INFO - writer=")));
    }

    #[test]
    fn default_path_ends_with_log_name() {
        assert!(default_log_path().ends_with("mssql-bridge.log"));
    }
}
