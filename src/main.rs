//! SWC Client - command line access to the SportsWorldCentral API
//!
//! This is the main entry point for the `swc` CLI tool.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use swc_client::schemas::{BulkFile, Filters, ResourceType};
use swc_client::{StoredSettings, SwcClient, SwcConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: swc [--base-url URL] <command> [args]

Commands:
  health                          Check the API is up
  counts                          Show league, team and player counts
  list <resource> [key=value...]  List leagues, teams, players or performances
  get <resource> <id>             Fetch one record by id
  bulk <file> [destination]       Download a bulk file (players, leagues,
                                  performances, teams, team_players)
  config show                     Print the effective configuration
  config save                     Persist the effective configuration

Environment:
  SWC_API_BASE_URL, SWC_BACKOFF, SWC_BACKOFF_MAX_TIME, SWC_MAX_RETRIES,
  SWC_BULK_FILE_FORMAT (a .env file is loaded if present)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let base_url = take_flag(&mut args, "--base-url")?;

    let Some(command) = args.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let config = SwcConfig::load(base_url.as_deref())?;

    if command == "config" {
        return run_config(rest, &config);
    }

    let client = SwcClient::new(config)?;

    match command.as_str() {
        "health" => {
            let health = client.health_check().await?;
            if health.healthy {
                println!(
                    "✅ API healthy (HTTP {}){}",
                    health.status,
                    health
                        .message
                        .map(|m| format!(": {}", m))
                        .unwrap_or_default()
                );
            } else {
                println!("❌ API unhealthy (HTTP {})", health.status);
                std::process::exit(1);
            }
        }
        "counts" => print_json(&client.get_counts().await?)?,
        "list" => {
            let resource = parse_resource(rest.first())?;
            let filters = parse_filters(&rest[1..])?;
            print_json(&client.list_raw(resource, &filters).await?)?;
        }
        "get" => {
            let resource = parse_resource(rest.first())?;
            let id = rest.get(1).context("missing id")?;
            print_json(&client.get_raw(resource, id).await?)?;
        }
        "bulk" => {
            let file: BulkFile = rest
                .first()
                .context("missing bulk file name")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let destination = rest
                .get(1)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(file.file_name(client.config().bulk_file_format)));
            let summary = client.bulk_download(file, &destination).await?;
            println!(
                "📥 Downloaded {} bytes from {} to {}",
                summary.bytes,
                summary.url,
                summary.path.display()
            );
        }
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    }

    Ok(())
}

fn run_config(args: &[String], config: &SwcConfig) -> anyhow::Result<()> {
    match args.first().map(String::as_str) {
        Some("show") | None => {
            println!("Base URL:        {}", config.base_url);
            println!("Retry:           {}", config.retry_enabled);
            println!("Max retries:     {}", config.max_retries);
            println!("Backoff factor:  {:?}", config.backoff_factor);
            println!("Backoff max:     {:?}", config.backoff_max_time);
            println!("Timeout:         {:?}", config.timeout);
            println!("Bulk format:     {}", config.bulk_file_format);
            println!("Bulk base URL:   {}", config.bulk_base_url);
            if let Some(path) = StoredSettings::settings_path() {
                println!("Settings file:   {}", path.display());
            }
        }
        Some("save") => {
            let settings = StoredSettings {
                base_url: Some(config.base_url.clone()),
                backoff: Some(config.retry_enabled),
                backoff_max_time_secs: Some(config.backoff_max_time.as_secs()),
                max_retries: Some(config.max_retries),
                bulk_file_format: Some(config.bulk_file_format.to_string()),
                bulk_base_url: Some(config.bulk_base_url.clone()),
            };
            let path = settings.save().map_err(anyhow::Error::msg)?;
            println!("💾 Saved settings to {}", path.display());
        }
        Some(other) => bail!("unknown config command: {}", other),
    }
    Ok(())
}

/// Remove `--flag value` (or `--flag=value`) from `args`.
fn take_flag(args: &mut Vec<String>, flag: &str) -> anyhow::Result<Option<String>> {
    let prefix = format!("{}=", flag);
    if let Some(pos) = args.iter().position(|a| a.starts_with(&prefix)) {
        let arg = args.remove(pos);
        return Ok(Some(arg[prefix.len()..].to_string()));
    }
    match args.iter().position(|a| a == flag) {
        Some(pos) if pos + 1 < args.len() => {
            let value = args.remove(pos + 1);
            args.remove(pos);
            Ok(Some(value))
        }
        Some(_) => bail!("{} requires a value", flag),
        None => Ok(None),
    }
}

fn parse_resource(arg: Option<&String>) -> anyhow::Result<ResourceType> {
    arg.context("missing resource type")?
        .parse()
        .map_err(anyhow::Error::msg)
}

fn parse_filters(args: &[String]) -> anyhow::Result<Filters> {
    args.iter().try_fold(Filters::new(), |filters, arg| {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("filter must be key=value, got {:?}", arg))?;
        Ok(filters.with(key, value))
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
