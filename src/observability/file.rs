//! File-system capability used by the event log sink

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// How each event line lands in the file target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Every write replaces the file content with the latest line
    #[default]
    Overwrite,
    /// Every write adds one line at the end of the file
    Append,
}

/// Synchronous file output
pub trait FileSystem: Send + Sync {
    fn write_line(&self, path: &Path, line: &str, mode: FileMode) -> io::Result<()>;
}

/// `std::fs` backed file system
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn write_line(&self, path: &Path, line: &str, mode: FileMode) -> io::Result<()> {
        match mode {
            FileMode::Overwrite => fs::write(path, line),
            FileMode::Append => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}", line)
            }
        }
    }
}
