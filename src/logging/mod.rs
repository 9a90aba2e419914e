//! Structured JSON logging.
//!
//! Events carry a level, a target such as `masonry::engine`, a message and a
//! free-form field map. Sinks decide where the serialized events go.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("log sink poisoned")]
    Poisoned,
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

/// Cheap to clone handle over a shared sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
            min_level: LogLevel::Trace,
        }
    }

    /// Drop events below `level` before they reach the sink.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        self.log_event(LogEvent::new(level, target, message))
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        self.sink.log(&event)
    }
}

/// Appends one JSON line per event, truncating once `max_bytes` would be
/// exceeded. `max_bytes == 0` disables truncation.
pub struct FileSink {
    path: PathBuf,
    max_bytes: u64,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_bytes,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, mut line: String) -> LoggingResult<()> {
        line.push('\n');
        let mut guard = self.writer.lock().map_err(|_| LoggingError::Poisoned)?;

        if self.should_truncate(guard.get_ref(), line.len() as u64)? {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            *guard = BufWriter::new(file);
        }

        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }

    fn should_truncate(&self, file: &File, incoming_len: u64) -> std::io::Result<bool> {
        if self.max_bytes == 0 {
            return Ok(false);
        }
        let current = file.metadata()?.len();
        Ok(current + incoming_len > self.max_bytes)
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let line = serde_json::to_string(event)?;
        self.write_line(line)
    }
}

/// Keeps events in memory; clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut guard = self.events.lock().map_err(|_| LoggingError::Poisoned)?;
        guard.push(event.clone());
        Ok(())
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    let map: LogFields = fields.into_iter().collect();
    LogEvent::with_fields(level, target, message, map)
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}
