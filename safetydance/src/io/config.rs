//! CLI configuration stored in `.safetydance.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".safetydance.toml";

/// Tool configuration (TOML).
///
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SafetyConfig {
    pub exec: ExecConfig,
    pub json: JsonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecConfig {
    /// Wall-clock limit for `exec`/`spawn` in seconds.
    pub timeout_secs: u64,

    /// Keep at most this many bytes of stdout/stderr each.
    pub output_limit_bytes: usize,

    /// Shell prefix for `exec` (the command string is appended).
    pub shell: Vec<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            output_limit_bytes: 1_000_000,
            shell: vec!["sh".to_string(), "-c".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JsonConfig {
    /// Pretty-print documents written back by the CLI.
    pub pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl SafetyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.exec.timeout_secs == 0 {
            return Err(anyhow!("exec.timeout_secs must be > 0"));
        }
        if self.exec.output_limit_bytes == 0 {
            return Err(anyhow!("exec.output_limit_bytes must be > 0"));
        }
        if self.exec.shell.is_empty() || self.exec.shell[0].trim().is_empty() {
            return Err(anyhow!("exec.shell must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SafetyConfig::default()`. Every section is
/// validated, including ones the caller does not use, so a bad `[exec]` table
/// fails here rather than at the first `exec`.
pub fn load_config(path: &Path) -> Result<SafetyConfig> {
    if !path.exists() {
        let cfg = SafetyConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SafetyConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SafetyConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    #[test]
    fn load_missing_returns_default() {
        let temp = scratch_dir();
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SafetyConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = scratch_dir();
        let path = temp.path().join("nested").join("config.toml");
        let mut cfg = SafetyConfig::default();
        cfg.exec.timeout_secs = 5;
        cfg.json.pretty = false;
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = scratch_dir();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[json]\npretty = false\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(!cfg.json.pretty);
        assert_eq!(cfg.exec, ExecConfig::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = scratch_dir();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[exec]\ntimeout_secs = 0\n").expect("write");
        let err = load_config(&path).expect_err("invalid config");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn empty_shell_is_rejected() {
        let mut cfg = SafetyConfig::default();
        cfg.exec.shell.clear();
        assert!(cfg.validate().is_err());
    }
}
