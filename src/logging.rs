/// Structured logging for the profile ingest service
///
/// Provides context-rich logging with pipeline component and record
/// identifiers, timestamps, and severity levels. Supports both console
/// output and file-based logging for batch runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Geolocation,
    Basin,
    Ingest,
    Database,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Geolocation => write!(f, "GEO"),
            Component::Basin => write!(f, "BASIN"),
            Component::Ingest => write!(f, "INGEST"),
            Component::Database => write!(f, "DB"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    fn log(&self, level: LogLevel, component: Component, record_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, record_id, message);
        let record_part = record_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, record_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, record_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// One log line: `<timestamp> <LEVEL> <COMPONENT>[ [record]]: message`.
fn format_entry(level: LogLevel, component: Component, record_id: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let record_part = record_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, record_part, message)
}

fn emit(level: LogLevel, component: Component, record_id: Option<&str>, message: &str) {
    // A poisoned lock only means another thread panicked mid-log; keep logging.
    let guard = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, component, record_id, message);
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger. Messages sent before this are dropped.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let logger = Logger {
        min_level,
        log_file: log_file.map(String::from),
        console_timestamps,
    };
    *LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(logger);
}

/// Log a general informational message
pub fn info(component: Component, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, record_id, message);
}

/// Log a warning message
pub fn warn(component: Component, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, record_id, message);
}

/// Log an error message
pub fn error(component: Component, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, record_id, message);
}

/// Log a debug message
pub fn debug(component: Component, record_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, record_id, message);
}

// ---------------------------------------------------------------------------
// Ingest Summary Logging
// ---------------------------------------------------------------------------

/// Level a batch summary is reported at.
pub fn summary_level(successful: usize, failed: usize) -> LogLevel {
    if failed == 0 {
        LogLevel::Info
    } else if successful == 0 {
        LogLevel::Error
    } else {
        LogLevel::Warning
    }
}

/// Log a summary of one ingest batch
pub fn log_ingest_summary(component: Component, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Ingest complete: {}/{} successful, {} failed",
        successful, total, failed
    );
    emit(summary_level(successful, failed), component, None, &message);
}
