//! Read, write and remove values at key paths inside JSON documents.
//!
//! ```text
//! safetydance get doc.json 'points[0].x'
//! safetydance set doc.json settings.theme '"dark"'
//! safetydance unset doc.json settings.theme
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use safetydance::exit_codes;
use safetydance::io::config::{DEFAULT_CONFIG_PATH, SafetyConfig, load_config};
use safetydance::io::{fs, json};
use safetydance::{last_error_message, logging, query, set, unset};

#[derive(Parser)]
#[command(
    name = "safetydance",
    version,
    about = "Read, write and remove values at key paths inside JSON documents"
)]
struct Cli {
    /// Config file (TOML). Missing file means defaults; every section is
    /// validated, `[exec]` included.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value at PATH (exit 2 if missing and no default).
    Get {
        file: PathBuf,
        /// Key path, e.g. `points[0].x`. Empty prints the whole document.
        path: String,
        /// JSON printed when PATH is missing.
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Set the value at PATH, creating intermediate objects. Creates FILE if missing.
    Set {
        file: PathBuf,
        path: String,
        /// JSON value; anything that does not parse is stored as a string.
        value: String,
    },
    /// Remove the value at PATH.
    Unset { file: PathBuf, path: String },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Get {
            file,
            path,
            default,
        } => cmd_get(&config, &file, &path, default.as_deref()),
        Command::Set { file, path, value } => cmd_set(&config, &file, &path, &value),
        Command::Unset { file, path } => cmd_unset(&config, &file, &path),
    }
}

fn cmd_get(config: &SafetyConfig, file: &Path, path: &str, default: Option<&str>) -> Result<i32> {
    let doc = read_document(file)?;
    let default = match default {
        Some(raw) => Some(json::parse(raw).ok_or_else(|| captured("parse --default", raw))?),
        None => None,
    };
    let Some(found) = query(&doc, path).or(default.as_ref()) else {
        debug!(path, "no value at path");
        return Ok(exit_codes::MISSING);
    };
    println!("{}", render(config, found)?);
    Ok(exit_codes::OK)
}

fn cmd_set(config: &SafetyConfig, file: &Path, path: &str, raw: &str) -> Result<i32> {
    let mut doc = if fs::exists(file) {
        read_document(file)?
    } else {
        Value::Null
    };
    let value = json::parse(raw).unwrap_or_else(|| Value::String(raw.to_string()));
    set(&mut doc, path, value);
    write_document(config, file, &doc)?;
    Ok(exit_codes::OK)
}

fn cmd_unset(config: &SafetyConfig, file: &Path, path: &str) -> Result<i32> {
    let mut doc = read_document(file)?;
    unset(&mut doc, path);
    write_document(config, file, &doc)?;
    Ok(exit_codes::OK)
}

fn read_document(file: &Path) -> Result<Value> {
    let contents = fs::read_to_string(file)
        .ok_or_else(|| captured("read", &file.display().to_string()))?;
    json::parse(&contents).ok_or_else(|| captured("parse", &file.display().to_string()))
}

fn write_document(config: &SafetyConfig, file: &Path, doc: &Value) -> Result<()> {
    let mut payload = render(config, doc)?;
    payload.push('\n');
    if !fs::write_file(file, payload) {
        return Err(captured("write", &file.display().to_string()));
    }
    Ok(())
}

fn render(config: &SafetyConfig, value: &Value) -> Result<String> {
    let rendered = if config.json.pretty {
        json::stringify_pretty(value)
    } else {
        json::stringify(value)
    };
    rendered.ok_or_else(|| captured("serialize", "value"))
}

/// Turn the error left in the last-error slot into a reportable one.
fn captured(action: &str, subject: &str) -> anyhow::Error {
    let detail = last_error_message().unwrap_or_else(|| "unknown error".to_string());
    anyhow!("{action} {subject}: {detail}")
}
