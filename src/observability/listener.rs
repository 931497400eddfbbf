//! Severity-filtered console/file logging sink

use std::path::{Path, PathBuf};

use crate::error::AdapterError;

use super::console::{ConsoleSink, ConsoleStream, StdConsole};
use super::event::{PlatformEvent, Severity};
use super::file::{FileMode, FileSystem, LocalFileSystem};

/// Receiver of events of type `T`
pub trait EventListener<T> {
    fn on_event(&self, event: &T);
}

/// Logs platform events to the console and, optionally, a file
pub struct EventLogSink {
    threshold: Severity,
    console: Box<dyn ConsoleSink>,
    file_system: Option<Box<dyn FileSystem>>,
    file_target: Option<PathBuf>,
    file_mode: FileMode,
}

impl EventLogSink {
    /// Create a sink writing to stdout/stderr with local file access
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            console: Box::new(StdConsole),
            file_system: Some(Box::new(LocalFileSystem)),
            file_target: None,
            file_mode: FileMode::default(),
        }
    }

    pub fn with_console(mut self, console: Box<dyn ConsoleSink>) -> Self {
        self.console = console;
        self
    }

    pub fn with_file_system(mut self, file_system: Box<dyn FileSystem>) -> Self {
        self.file_system = Some(file_system);
        self
    }

    /// Drop file access; later `set_file_target` calls fail
    pub fn without_file_system(mut self) -> Self {
        self.file_system = None;
        self.file_target = None;
        self
    }

    pub fn configure(&mut self, threshold: Severity) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Also write every logged line to `path`
    pub fn set_file_target(&mut self, path: impl Into<PathBuf>) -> Result<(), AdapterError> {
        if self.file_system.is_none() {
            return Err(AdapterError::CapabilityUnavailable("file system access"));
        }
        self.file_target = Some(path.into());
        Ok(())
    }

    pub fn set_file_mode(&mut self, mode: FileMode) {
        self.file_mode = mode;
    }

    pub fn file_target(&self) -> Option<&Path> {
        self.file_target.as_deref()
    }
}

impl EventListener<PlatformEvent> for EventLogSink {
    fn on_event(&self, event: &PlatformEvent) {
        if event.event_type() < self.threshold {
            return;
        }

        let line = event.format_line();

        if let (Some(fs), Some(path)) = (&self.file_system, &self.file_target)
            && let Err(e) = fs.write_line(path, &line, self.file_mode)
        {
            log::warn!("Failed to write event to {}: {}", path.display(), e);
        }

        self.console.write_line(ConsoleStream::for_severity(event.event_type()), &line);
    }
}
