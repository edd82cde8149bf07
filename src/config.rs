//! `efis_pfd.toml` plus command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::protocol::DecoderConfig;

pub const DEFAULT_CONFIG_PATH: &str = "efis_pfd.toml";

#[derive(Parser, Debug)]
#[command(name = "efis_pfd", version, about = "EFIS primary flight display")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Serial port, e.g. /dev/ttyUSB0 or COM3
    #[arg(short, long)]
    pub port: Option<String>,
    #[arg(short, long)]
    pub baud: Option<u32>,
    /// Frame rate of the display loop
    #[arg(long)]
    pub tick_hz: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: if cfg!(windows) { "COM3" } else { "/dev/ttyUSB0" }.to_string(),
            baud_rate: 230_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PfdConfig {
    pub tick_hz: u32,
}

impl Default for PfdConfig {
    fn default() -> Self {
        Self { tick_hz: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub data_timeout_ms: u64,
    pub low_rate_threshold_ms: i64,
    pub reconnect_delay_ms: u64,
    pub max_lines_per_frame: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            data_timeout_ms: 100,
            low_rate_threshold_ms: 100,
            reconnect_delay_ms: 2000,
            max_lines_per_frame: 512,
        }
    }
}

impl LinkConfig {
    pub fn decoder(&self) -> DecoderConfig {
        DecoderConfig {
            data_timeout: Duration::from_millis(self.data_timeout_ms),
            low_rate_threshold_ms: self.low_rate_threshold_ms,
            max_lines_per_frame: self.max_lines_per_frame,
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("logs.log")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub pfd: PfdConfig,
    pub link: LinkConfig,
    pub log: LogConfig,
}

/// Where the configuration came from; reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { missing: PathBuf },
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text).context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults { missing: path.to_path_buf() }));
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg = Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?;
        Ok((cfg, ConfigSource::File(path.to_path_buf())))
    }

    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(port) = &cli.port {
            self.serial.port = port.clone();
        }
        if let Some(baud) = cli.baud {
            self.serial.baud_rate = baud;
        }
        if let Some(hz) = cli.tick_hz {
            self.pfd.tick_hz = hz;
        }
        self.validate().context("invalid command-line override")
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            bail!("serial.port must not be empty");
        }
        if self.serial.baud_rate == 0 {
            bail!("serial.baud_rate must be positive");
        }
        if !(1..=240).contains(&self.pfd.tick_hz) {
            bail!("pfd.tick_hz must be within 1..=240, got {}", self.pfd.tick_hz);
        }
        if self.link.data_timeout_ms == 0 {
            bail!("link.data_timeout_ms must be positive");
        }
        if self.link.max_lines_per_frame == 0 {
            bail!("link.max_lines_per_frame must be positive");
        }
        Ok(())
    }
}
