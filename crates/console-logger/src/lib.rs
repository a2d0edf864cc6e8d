//! Console Logger
//!
//! A `tracing` subscriber for browser apps. Every formatted line goes to the
//! browser console (stderr off-wasm) and into a circular buffer of recent
//! lines that the UI can display.

use std::collections::VecDeque;
use std::io;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Default number of lines kept in memory
pub const DEFAULT_CAPACITY: usize = 500;

static BUFFER: OnceLock<LogBuffer> = OnceLock::new();

/// One captured log line
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

/// Bounded, shareable buffer of recent log lines
#[derive(Clone, Debug)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append a line, evicting the oldest when full
    pub fn push(&self, line: LogLine) {
        let mut lines = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Copy of the buffered lines, oldest first
    pub fn snapshot(&self) -> Vec<LogLine> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    #[error("Unknown log level: {0}")]
    BadLevel(String),

    #[error("A global logger is already installed")]
    AlreadySet,
}

/// Install the global subscriber.
///
/// `level` is one of `trace`, `debug`, `info`, `warn`, `error`.
pub fn init(level: &str, capacity: usize) -> Result<(), InitError> {
    let max_level = Level::from_str(level).map_err(|_| InitError::BadLevel(level.to_string()))?;
    let buffer = BUFFER.get_or_init(|| LogBuffer::new(capacity)).clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(ConsoleMakeWriter::new(buffer))
        // SystemTime is unavailable on wasm32-unknown-unknown; lines are stamped by the buffer.
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|_| InitError::AlreadySet)
}

/// Recent log lines, oldest first. Empty before `init`.
pub fn recent() -> Vec<LogLine> {
    BUFFER.get().map(LogBuffer::snapshot).unwrap_or_default()
}

/// Drop all buffered lines
pub fn clear() {
    if let Some(buffer) = BUFFER.get() {
        buffer.clear();
    }
}

/// `MakeWriter` handing out one `LineWriter` per event
pub struct ConsoleMakeWriter {
    buffer: LogBuffer,
}

impl ConsoleMakeWriter {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter::new(Level::INFO, self.buffer.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter::new(*meta.level(), self.buffer.clone())
    }
}

/// Collects one formatted event and emits it on drop
pub struct LineWriter {
    level: Level,
    bytes: Vec<u8>,
    buffer: LogBuffer,
}

impl LineWriter {
    fn new(level: Level, buffer: LogBuffer) -> Self {
        Self { level, bytes: Vec::new(), buffer }
    }
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if self.bytes.is_empty() {
            return;
        }
        let message = String::from_utf8_lossy(&self.bytes).trim_end().to_string();
        emit(self.level, &message);
        self.buffer.push(LogLine {
            at: Utc::now(),
            level: self.level,
            message,
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, message: &str) {
    let value = message.into();
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, message: &str) {
    eprintln!("{}", message);
}
