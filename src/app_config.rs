//! Optional per-user defaults read from `snapgrab/config.toml`.
//!
//! The file is a flat list of `key = value` lines. Strings are double-quoted,
//! numbers are bare, and `#` starts a comment outside of quotes.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use snapgrab_core::ValidationMode;

const CONFIG_DIR_NAME: &str = "snapgrab";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Upper bound for `max_retries`.
const MAX_RETRIES_LIMIT: u32 = 10_000;

/// Upper bound for `timeout_secs` (one hour).
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Upper bound for `delay_ms` (10 minutes).
const MAX_DELAY_MS: u64 = 600_000;

/// Defaults from the config file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Where images are written.
    pub output_dir: Option<PathBuf>,
    /// Manifest file path.
    pub manifest: Option<PathBuf>,
    /// Attempts per item before it is abandoned.
    pub max_retries: Option<u32>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Pause between items in milliseconds.
    pub delay_ms: Option<u64>,
    /// Content validation policy.
    pub validation: Option<ValidationMode>,
    /// Threshold for the `min-size` validation policy.
    pub min_size_bytes: Option<u64>,
    /// Referer header sent with every request.
    pub referer: Option<String>,
}

impl FileConfig {
    /// Applies the same bounds the command line enforces.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.max_retries
            && !(1..=MAX_RETRIES_LIMIT).contains(&n)
        {
            bail!("`max_retries` = {n} is outside 1..={MAX_RETRIES_LIMIT}");
        }
        if let Some(secs) = self.timeout_secs
            && !(1..=MAX_TIMEOUT_SECS).contains(&secs)
        {
            bail!("`timeout_secs` = {secs} is outside 1..={MAX_TIMEOUT_SECS}");
        }
        if let Some(ms) = self.delay_ms
            && ms > MAX_DELAY_MS
        {
            bail!("`delay_ms` = {ms} is outside 0..={MAX_DELAY_MS}");
        }
        if self.min_size_bytes == Some(0) {
            bail!("`min_size_bytes` must be a positive byte count");
        }
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_dir" => self.output_dir = Some(PathBuf::from(unquote(value)?)),
            "manifest" => self.manifest = Some(PathBuf::from(unquote(value)?)),
            "referer" => self.referer = Some(unquote(value)?.to_string()),
            "max_retries" => {
                let n = parse_unsigned(value)?;
                self.max_retries =
                    Some(u32::try_from(n).map_err(|_| anyhow!("{n} does not fit in 32 bits"))?);
            }
            "timeout_secs" => self.timeout_secs = Some(parse_unsigned(value)?),
            "delay_ms" => self.delay_ms = Some(parse_unsigned(value)?),
            "min_size_bytes" => self.min_size_bytes = Some(parse_unsigned(value)?),
            "validation" => {
                let mode = unquote(value)?
                    .parse::<ValidationMode>()
                    .map_err(|e| anyhow!(e))?;
                self.validation = Some(mode);
            }
            other => bail!("unknown key '{other}'"),
        }
        Ok(())
    }
}

/// Where the config file is expected and what it held.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Candidate path; `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set.
    pub path: Option<PathBuf>,
    /// Parsed contents; `None` when no file exists at `path`.
    pub config: Option<FileConfig>,
}

/// `$XDG_CONFIG_HOME/snapgrab/config.toml`, else `$HOME/.config/snapgrab/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let base = match non_empty_env("XDG_CONFIG_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(non_empty_env("HOME")?).join(".config"),
    };
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty_env(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Reads the config file at the default location, if there is one.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(p) if p.is_file() => Some(read_config_file(p)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    parse_config_str(&text).with_context(|| format!("in config file {}", path.display()))
}

fn parse_config_str(text: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (number, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| anyhow!("line {number}: expected `key = value`"))?;
        let key = key.trim();
        cfg.set(key, value.trim())
            .with_context(|| format!("line {number}: bad `{key}` entry"))?;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts a trailing `#` comment, ignoring `#` inside a quoted string.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (at, ch) in line.char_indices() {
        if ch == '"' {
            quoted = !quoted;
        } else if ch == '#' && !quoted {
            return &line[..at];
        }
    }
    line
}

fn unquote(value: &str) -> Result<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| anyhow!("expected a double-quoted string, got {value}"))
}

fn parse_unsigned(value: &str) -> Result<u64> {
    if value.starts_with('-') {
        bail!("expected a non-negative integer, got {value}");
    }
    value
        .parse::<u64>()
        .with_context(|| format!("expected a non-negative integer, got {value:?}"))
}
