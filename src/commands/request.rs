//! Request command
//!
//! Issues one REST call through `RestMessageAdapter` and prints the
//! normalized response.

use colored::*;
use eyre::{Context, Result};
use indexmap::IndexMap;
use std::time::Duration;

use crate::cli::OutputFormat;
use platkit::config::Config;
use platkit::rest::{RestMessageAdapter, RestRequestType, RestResponse};

/// Command-line description of the request to issue
pub struct RequestArgs {
    pub method: RestRequestType,
    pub uri: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout_ms: Option<u64>,
    pub no_cache: bool,
    pub connection_id: Option<String>,
}

/// Run the request command. Exits with status 1 when the response is not ok.
pub fn run(args: RequestArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let body = args
        .body
        .as_deref()
        .map(|raw| serde_json::from_str::<serde_json::Value>(raw))
        .transpose()
        .context("Request body is not valid JSON")?;

    let mut headers = config.rest.headers.clone();
    headers.extend(args.headers);
    let query: IndexMap<String, String> = args.query.into_iter().collect();

    let adapter = RestMessageAdapter::new(
        args.uri,
        args.connection_id.unwrap_or_else(|| config.rest.connection_id.clone()),
        Duration::from_millis(args.timeout_ms.unwrap_or(config.rest.timeout_ms)),
        args.no_cache || config.rest.ignore_cache,
        headers,
    )
    .context("Failed to create REST adapter")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let response = rt.block_on(adapter.request(args.method, &query, body.as_ref()));

    print_response(&response, format)?;

    if !response.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn print_response(response: &RestResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(response)?);
        }
        OutputFormat::Text => {
            let status = format!("{} {}", response.status, response.status_text);
            if response.ok {
                println!("{} {}", "✓".green(), status.green());
            } else {
                println!("{} {}", "✗".red(), status.red());
            }
            for line in response.headers.lines() {
                println!("  {}", line.dimmed());
            }
            if !response.data.is_empty() {
                println!();
                println!("{}", response.data);
            }
        }
    }

    Ok(())
}
