//! Console logging with subscriber fan-out.
//!
//! There is no process-wide logger: `main` builds a [`Logger`] and hands a
//! clone to every component. Each entry is printed to stderr with a level
//! marker and broadcast to subscribers (tests use this to assert on what
//! was reported).

use tokio::sync::broadcast;

/// Log level, also used to pick the console marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for sub-steps
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering of the entry
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Cloneable logging handle.
#[derive(Debug, Clone)]
pub struct Logger {
    sender: broadcast::Sender<LogEntry>,
    echo: bool,
}

impl Logger {
    /// Logger that prints every entry to stderr
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, echo: true }
    }

    /// Logger that only broadcasts (nothing is printed)
    pub fn silent() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, echo: false }
    }

    pub fn log(&self, entry: LogEntry) {
        if self.echo {
            eprintln!("{}", entry.render());
        }
        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.log(LogEntry::info(msg));
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.log(LogEntry::success(msg));
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(LogEntry::warning(msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(LogEntry::error(msg));
    }

    pub fn info_indent(&self, msg: impl Into<String>, indent: u8) {
        self.log(LogEntry::info(msg).with_indent(indent));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain everything a subscriber has received so far.
#[cfg(test)]
pub(crate) fn drain(rx: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    while let Ok(entry) = rx.try_recv() {
        entries.push(entry);
    }
    entries
}
