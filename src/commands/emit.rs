//! Emit command
//!
//! Builds one platform event from the command line and logs it through an
//! `EventLogSink` configured from the config file and flags.

use eyre::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;

use platkit::config::Config;
use platkit::observability::{EventListener, EventLogSink, FileMode, PlatformEvent, Severity};

/// Command-line description of the event to emit
pub struct EmitArgs {
    pub name: String,
    pub severity: Severity,
    pub threshold: Option<Severity>,
    pub id: Option<String>,
    pub time: Option<String>,
    pub fields: Vec<(String, String)>,
    pub log_file: Option<PathBuf>,
    pub append: bool,
}

pub fn run(args: EmitArgs, config: &Config) -> Result<()> {
    let threshold = args.threshold.unwrap_or(config.event_log.threshold);
    let mut sink = EventLogSink::new(threshold);

    if let Some(path) = args.log_file.as_ref().or(config.event_log.file.as_ref()) {
        sink.set_file_target(Config::expand_path(path))
            .context("Failed to set event log file")?;
    }
    sink.set_file_mode(if args.append { FileMode::Append } else { config.event_log.file_mode });

    let event = build_event(args);
    log::debug!("Emitting {} ({}) at threshold {}", event.name(), event.event_type(), threshold);
    sink.on_event(&event);

    Ok(())
}

fn build_event(args: EmitArgs) -> PlatformEvent {
    let mut event = PlatformEvent::new(args.name, args.severity);
    if let Some(id) = args.id {
        event = event.with_id(id);
    }
    if let Some(time) = args.time {
        event = event.with_time(time);
    }
    for (key, raw) in args.fields {
        event = event.with_field(key, parse_field_value(&raw));
    }
    event
}

/// JSON when it parses, plain text otherwise
fn parse_field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
