//! Console output streams

use colored::*;

use super::event::Severity;

/// One of the console's output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Debug,
    Info,
    Warn,
    Error,
    /// Generic fallback stream
    Log,
}

impl ConsoleStream {
    /// Stream that receives events of the given severity
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Debug => ConsoleStream::Debug,
            Severity::Info => ConsoleStream::Info,
            Severity::Warning => ConsoleStream::Warn,
            Severity::Error => ConsoleStream::Error,
            Severity::None => ConsoleStream::Log,
        }
    }
}

/// Destination for formatted event lines
pub trait ConsoleSink: Send + Sync {
    fn write_line(&self, stream: ConsoleStream, line: &str);
}

/// Process stdout/stderr console.
///
/// Debug, info and generic lines go to stdout; warnings and errors go to
/// stderr.
#[derive(Debug, Default)]
pub struct StdConsole;

impl ConsoleSink for StdConsole {
    fn write_line(&self, stream: ConsoleStream, line: &str) {
        match stream {
            ConsoleStream::Debug => println!("{}", line.dimmed()),
            ConsoleStream::Info => println!("{}", line),
            ConsoleStream::Warn => eprintln!("{}", line.yellow()),
            ConsoleStream::Error => eprintln!("{}", line.red()),
            ConsoleStream::Log => println!("{}", line),
        }
    }
}
