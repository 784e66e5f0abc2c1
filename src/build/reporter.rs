//! Console transcript sinks

use colored::Colorize;
use std::sync::Mutex;

/// How a line should be emphasised on a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Success,
    Warning,
    Failure,
}

/// Receives the user-facing transcript of a build or clean.
pub trait Reporter: Send + Sync {
    fn log(&self, line: &str);

    fn log_styled(&self, _style: LineStyle, line: &str) {
        self.log(line);
    }
}

/// Prints to stdout with coloured status lines.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn log(&self, line: &str) {
        println!("{line}");
    }

    fn log_styled(&self, style: LineStyle, line: &str) {
        match style {
            LineStyle::Plain => println!("{line}"),
            LineStyle::Success => println!("{}", line.green().bold()),
            LineStyle::Warning => println!("{}", line.yellow()),
            LineStyle::Failure => println!("{}", line.red().bold()),
        }
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn log(&self, _line: &str) {}
}
