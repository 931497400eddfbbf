//! Event logging for SDK diagnostics
//!
//! Events are filtered by severity, rendered to a single line and sent to:
//! - Console - stream chosen by severity
//! - File - optional, overwritten or appended per event

pub mod console;
pub mod event;
pub mod file;
pub mod listener;

pub use event::{PlatformEvent, Severity};
pub use file::FileMode;
pub use listener::{EventListener, EventLogSink};
