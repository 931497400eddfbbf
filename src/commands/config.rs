use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use platkit::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "platkit Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!();

            println!("{}:", "event_log".cyan());
            println!("  threshold: {}", config.event_log.threshold);
            match &config.event_log.file {
                Some(path) => println!("  file: {}", path.display()),
                None => println!("  file: {}", "(none)".dimmed()),
            }
            println!("  file_mode: {:?}", config.event_log.file_mode);
            println!();

            println!("{}:", "rest".cyan());
            println!("  connection_id: {}", config.rest.connection_id);
            println!("  timeout_ms: {}", config.rest.timeout_ms);
            println!("  ignore_cache: {}", config.rest.ignore_cache);
            if config.rest.headers.is_empty() {
                println!("  headers: {}", "(none)".dimmed());
            } else {
                println!("  headers:");
                for (name, value) in &config.rest.headers {
                    println!("    {}: {}", name, value);
                }
            }
        }
    }

    Ok(())
}
