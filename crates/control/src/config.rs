//! Configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub device: DeviceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Which UPS to talk to and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// USB vendor id, hex (e.g. "0x0665")
    pub vendor_id: String,
    /// USB product id, hex (e.g. "0x5161")
    pub product_id: String,
    /// Per-transfer timeout in milliseconds (0 = wait forever)
    #[serde(default)]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "LoggingSettings::default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingSettings {
    fn default_level() -> String {
        "warn".to_string()
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            device: DeviceSettings {
                vendor_id: "0x0001".to_string(),
                product_id: "0x0000".to_string(),
                timeout_ms: 0,
            },
            logging: LoggingSettings::default(),
        }
    }
}

impl ControlConfig {
    /// Load configuration from the specified path
    ///
    /// Without a path, the per-user and system locations are tried in order.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned())
        } else {
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/ups-control/config.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ControlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("ups-control").join("config.toml")
        } else {
            PathBuf::from(".config/ups-control/config.toml")
        }
    }

    pub fn vendor_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.vendor_id, "VID")
    }

    pub fn product_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.product_id, "PID")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.device.timeout_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        self.vendor_id()?;
        self.product_id()?;

        Ok(())
    }
}

/// Parse a `VID:PID` pair such as `0665:5161` or `0x0665:0x5161`
pub fn parse_device_id(s: &str) -> Result<(u16, u16)> {
    let (vid, pid) = s.split_once(':').ok_or_else(|| {
        anyhow!(
            "Invalid device '{}', expected VID:PID (e.g., '0x0665:0x5161')",
            s
        )
    })?;

    Ok((parse_hex_id(vid, "VID")?, parse_hex_id(pid, "PID")?))
}

/// Parse a 1-4 digit hex id, with or without a `0x` prefix
pub fn parse_hex_id(id: &str, name: &str) -> Result<u16> {
    let trimmed = id.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex_part.is_empty() || hex_part.len() > 4 {
        return Err(anyhow!(
            "Invalid {} '{}', hex part must be 1-4 digits",
            name,
            id
        ));
    }

    // from_str_radix would also take a leading sign
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("Invalid {} '{}', not a valid hex number", name, id));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| anyhow!("Invalid {} '{}', not a valid hex number", name, id))
}
