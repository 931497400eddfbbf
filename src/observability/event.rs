//! Platform event records and their single-line rendering

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Field names owned by the record itself; never rendered as extra fields
pub const RESERVED_FIELDS: [&str; 4] = ["eventTime", "eventType", "eventId", "name"];

/// Delimiter between fragments of a rendered event line
pub const FRAGMENT_DELIMITER: &str = " | ";

/// Rendering of an absent or null field value
pub const NULL_TOKEN: &str = "<NULL>";

/// Event severity, ordered from most to least verbose.
///
/// `None` sits above every real severity so that it can act as a filter
/// threshold that lets nothing through.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    #[default]
    None,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::None => "none",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic event emitted by the SDK
///
/// Immutable once built: the builder methods consume `self`, and the
/// accessors only hand out shared references.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEvent {
    event_time: String,
    event_type: Severity,
    event_id: String,
    name: String,
    #[serde(flatten)]
    fields: IndexMap<String, Value>,
}

impl PlatformEvent {
    /// Create an event stamped with the current UTC time and a fresh id
    pub fn new(name: impl Into<String>, event_type: Severity) -> Self {
        Self {
            event_time: Utc::now().to_rfc3339(),
            event_type,
            event_id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_time(mut self, event_time: impl Into<String>) -> Self {
        self.event_time = event_time.into();
        self
    }

    pub fn with_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    /// Attach an additional field. Re-using a key replaces the value in place.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn event_time(&self) -> &str {
        &self.event_time
    }

    pub fn event_type(&self) -> Severity {
        self.event_type
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Render as `time | name | key: value | ...`
    pub fn format_line(&self) -> String {
        let mut fragments = vec![self.event_time.clone(), self.name.clone()];

        for (key, value) in &self.fields {
            if key.is_empty() || RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            fragments.push(format!("{}: {}", key, render_value(value)));
        }

        fragments.join(FRAGMENT_DELIMITER)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => NULL_TOKEN.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_else(|_| NULL_TOKEN.to_string()),
    }
}
