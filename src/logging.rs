//! Structured logging for the marina monitoring service.
//!
//! Provides context-rich logging with box/station identifiers, timestamps,
//! and severity levels. Supports both console output and file-based logging
//! for daemon operations.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
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

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Frost,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Frost => write!(f, "FROST"),
            DataSource::Config => write!(f, "CONF"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - a box may be offline, decommissioned, or seasonal
    Expected,
    /// Unexpected failure - indicates service degradation or a configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
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
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: &DataSource, box_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        // Format the log entry
        let box_part = box_id.map(|b| format!(" [{}]", b)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, box_part, message);

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, box_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, box_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
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

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, box_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, &source, box_id, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, box_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, &source, box_id, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, box_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, &source, box_id, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, box_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, &source, box_id, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a FROST fetch failure based on the error message and context
pub fn classify_frost_failure(_box_id: &str, error_message: &str) -> FailureType {
    // A missing Thing usually means the box is decommissioned, seasonal, or
    // renamed upstream. That is a data-quality question, not service decay.
    if error_message.contains("Thing not found") {
        FailureType::Unknown
    }
    // HTTP errors indicate server-side issues
    else if error_message.contains("HTTP error") {
        FailureType::Unexpected
    }
    // Parse errors suggest API changes or bugs
    else if error_message.contains("Parse error") {
        FailureType::Unexpected
    }
    // Transport failures: network, DNS, timeout
    else if error_message.contains("Request failed") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a FROST fetch failure with automatic classification.
///
/// Used by the batched per-channel fetch path: a degraded channel is logged
/// here and its entry falls back to null, without failing the batch.
pub fn log_frost_failure(box_or_channel: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_frost_failure(box_or_channel, &error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::Frost, Some(box_or_channel), &message),
        FailureType::Unexpected => error(DataSource::Frost, Some(box_or_channel), &message),
        FailureType::Unknown => warn(DataSource::Frost, Some(box_or_channel), &message),
    }
}

// ---------------------------------------------------------------------------
// Fetch Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a batched latest-observation fetch
pub fn log_fetch_summary(source: DataSource, total: usize, with_data: usize, degraded: usize) {
    let message = format!(
        "Fetch complete: {}/{} channels with data, {} degraded",
        with_data, total, degraded
    );

    if degraded == 0 {
        info(source, None, &message);
    } else if with_data == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let missing_thing = "Thing not found: twlbox_strande";
        assert_eq!(
            classify_frost_failure("twlbox_strande", missing_thing),
            FailureType::Unknown
        );

        let http_error = "HTTP error: 500";
        assert_eq!(
            classify_frost_failure("metbox_kiel", http_error),
            FailureType::Unexpected
        );

        let transport = "Request failed: connection timed out";
        assert_eq!(
            classify_frost_failure("metbox_kiel", transport),
            FailureType::Unexpected
        );
    }
}
