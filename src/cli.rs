use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use platkit::observability::Severity;
use platkit::rest::RestRequestType;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "platkit",
    about = "Platform adapters - severity-filtered event logging and non-throwing REST calls",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/platkit/logs/platkit.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to platkit.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Push one event through the event log sink
    Emit {
        /// Event name
        #[arg(long)]
        name: String,

        /// Event severity
        #[arg(long, short, value_enum, default_value = "info")]
        severity: Severity,

        /// Drop events below this severity (overrides config)
        #[arg(long, short, value_enum)]
        threshold: Option<Severity>,

        /// Event id (defaults to a generated id)
        #[arg(long)]
        id: Option<String>,

        /// Event timestamp (defaults to now, RFC 3339)
        #[arg(long)]
        time: Option<String>,

        /// Extra field as key=value; values are parsed as JSON when possible
        #[arg(long = "field", short = 'f', value_parser = parse_key_value)]
        fields: Vec<(String, String)>,

        /// Also write the line to this file (overrides config)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Append to the log file instead of overwriting it
        #[arg(long)]
        append: bool,
    },

    /// Issue one REST request and print the normalized response
    Request {
        /// HTTP method
        #[arg(value_enum)]
        method: RestRequestType,

        /// Base URI
        uri: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", short = 'q', value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// JSON body (sent with POST only)
        #[arg(long)]
        body: Option<String>,

        /// Extra header as name:value (repeatable)
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Timeout in milliseconds, 0 for none (overrides config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Send Cache-Control: no-cache
        #[arg(long)]
        no_cache: bool,

        /// Identifier used in log lines (overrides config)
        #[arg(long)]
        connection_id: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s.split_once(':').ok_or_else(|| format!("expected name:value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
