/*
 *  config.rs
 *
 *  lnpos - sats on the glass
 *  (c) 2026 lnpos contributors
 *
 *  YAML configuration with CLI overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::panel::Rotation;

const REDACTED: &str = "<redacted>";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every group falls back to its defaults
/// when absent from the YAML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// "error" | "warn" | "info" | "debug" | "trace"; None means info
    pub log_level: Option<String>,
    pub lightning: LightningConfig,
    pub display: DisplayConfig,
    pub assets: AssetsConfig,
    pub timing: TimingConfig,
}

/// Where the payment node lives and how to authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// LND REST base URL; `/v1/invoices` is appended when missing
    pub url: String,
    /// Hex encoded macaroon
    pub macaroon: String,
    /// Read the macaroon from a file (binary `invoice.macaroon` or hex)
    /// when `macaroon` is empty
    pub macaroon_file: Option<PathBuf>,
    /// PEM certificate to trust, typically LND's `tls.cert`
    pub tls_cert: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    pub timeout_ms: u64,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            url: "https://umbrel.local:8080".to_string(),
            macaroon: String::new(),
            macaroon_file: None,
            tls_cert: None,
            accept_invalid_certs: false,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Frames saved as PNG files
    Virtual,
    /// Vendor panel SDK loaded as a plugin
    #[default]
    Plugin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub driver: DriverKind,
    /// Plugin driver name, e.g. "it8951" -> liblnpos_it8951.so
    pub plugin: Option<String>,
    /// Explicit plugin library, skips the search path
    pub plugin_path: Option<PathBuf>,
    pub spi_device: String,
    pub spi_hz: u32,
    /// Panel VCOM in volts, printed on the flex cable
    pub vcom: f32,
    /// Virtual panel size
    pub width: u32,
    pub height: u32,
    /// Virtual panel frame directory
    pub output_dir: PathBuf,
    pub rotate: Rotation,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Plugin,
            plugin: Some("it8951".to_string()),
            plugin_path: None,
            spi_device: "/dev/spidev0.0".to_string(),
            spi_hz: 80_000_000,
            vcom: -2.61,
            width: 800,
            height: 600,
            output_dir: PathBuf::from("frames"),
            rotate: Rotation::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AssetsConfig {
    /// Badge image; the built-in badge is drawn when unset
    pub badge: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause between polls
    pub poll_interval_ms: u64,
    /// Extra pause after a full refresh
    pub settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 1_000, settle_ms: 2_000 }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Copy safe to print: the macaroon is masked
    pub fn redacted(&self) -> Config {
        let mut cfg = self.clone();
        if !cfg.lightning.macaroon.is_empty() {
            cfg.lightning.macaroon = REDACTED.to_string();
        }
        cfg
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "lnpos",
    version,
    about = "Lightning point-of-sale e-paper display",
    disable_help_flag = false
)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// shorthand for --log-level debug
    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// render to PNG files instead of the panel
    #[arg(short = 'v', long = "virtual", action = ArgAction::SetTrue)]
    pub virtual_display: bool,
    /// panel mounting rotation
    #[arg(short = 'r', long, value_enum, ignore_case = true)]
    pub rotate: Option<Rotation>,
    /// LND REST URL
    #[arg(long, value_hint = ValueHint::Url)]
    pub node_url: Option<String>,
    /// badge image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub badge: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config, secret masked
        let s = serde_yaml::to_string(&cfg.redacted())?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Defaults, then YAML (explicit path or search), then CLI, then checks.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        read_yaml(p)?
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    apply_cli_overrides(&mut cfg, cli);
    resolve_macaroon(&mut cfg.lightning)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lnpos/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lnpos/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lnpos.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lnpos.yaml", "config.yaml", "config/lnpos.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()   { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                 { cfg.log_level = Some("debug".to_string()); }
    if cli.virtual_display       { cfg.display.driver = DriverKind::Virtual; }
    if let Some(rot) = cli.rotate { cfg.display.rotate = rot; }
    if let Some(url) = cli.node_url.as_ref() { cfg.lightning.url = url.clone(); }
    if cli.badge.is_some()       { cfg.assets.badge = cli.badge.clone(); }
}

/// Fill `macaroon` from `macaroon_file` when only the file is given.
/// LND writes macaroons as raw bytes; hex files are taken as-is.
fn resolve_macaroon(lightning: &mut LightningConfig) -> Result<(), ConfigError> {
    if !lightning.macaroon.trim().is_empty() {
        return Ok(());
    }
    let Some(path) = lightning.macaroon_file.as_ref() else { return Ok(()) };

    let bytes = fs::read(path)?;
    let text = std::str::from_utf8(&bytes).ok().map(str::trim);
    lightning.macaroon = match text {
        Some(t) if !t.is_empty() && t.bytes().all(|b| b.is_ascii_hexdigit()) => t.to_string(),
        _ => to_hex(&bytes),
    };
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.lightning.macaroon.trim().is_empty() {
        return Err(ConfigError::Validation(
            "lightning.macaroon (or lightning.macaroon_file) is required".into(),
        ));
    }
    match reqwest::Url::parse(&cfg.lightning.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
        _ => {
            return Err(ConfigError::Validation(format!(
                "lightning.url must be an http(s) URL, got {:?}",
                cfg.lightning.url
            )));
        }
    }
    if cfg.lightning.timeout_ms == 0 {
        return Err(ConfigError::Validation("lightning.timeout_ms must be > 0".into()));
    }

    let display = &cfg.display;
    if !(-5.0..=0.0).contains(&display.vcom) {
        return Err(ConfigError::Validation("display vcom must be within -5.0..=0.0 volts".into()));
    }
    match display.driver {
        DriverKind::Virtual => {
            if display.width == 0 || display.height == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
        }
        DriverKind::Plugin => {
            let named = display.plugin.as_deref().is_some_and(|p| !p.trim().is_empty());
            if !named && display.plugin_path.is_none() {
                return Err(ConfigError::Validation(
                    "plugin driver needs display.plugin or display.plugin_path".into(),
                ));
            }
        }
    }
    Ok(())
}
