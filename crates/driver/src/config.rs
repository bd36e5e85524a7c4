//! Driver configuration management

use crate::hid::CandidatePaths;
use common::{Error, Result, validate_log_level};
use protocol::{
    DEFAULT_CANDIDATE_COUNT, DEFAULT_CANDIDATE_PREFIX, SENSOR_PRODUCT_ID, SENSOR_VENDOR_ID,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Upper bound on the number of auto-detection candidates
pub const MAX_CANDIDATE_COUNT: u32 = 256;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Explicit device node; auto-detect when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Prefix of the candidate nodes probed during auto-detection
    #[serde(default = "DeviceSettings::default_candidate_prefix")]
    pub candidate_prefix: String,
    /// Number of candidate nodes probed during auto-detection
    #[serde(default = "DeviceSettings::default_candidate_count")]
    pub candidate_count: u32,
    /// Required vendor id, as `0x`-prefixed hex
    #[serde(default = "DeviceSettings::default_vendor_id")]
    pub vendor_id: String,
    /// Expected product id, as `0x`-prefixed hex (mismatch only warns)
    #[serde(default = "DeviceSettings::default_product_id")]
    pub product_id: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            path: None,
            candidate_prefix: Self::default_candidate_prefix(),
            candidate_count: Self::default_candidate_count(),
            vendor_id: Self::default_vendor_id(),
            product_id: Self::default_product_id(),
        }
    }
}

impl DeviceSettings {
    fn default_candidate_prefix() -> String {
        DEFAULT_CANDIDATE_PREFIX.to_string()
    }

    fn default_candidate_count() -> u32 {
        DEFAULT_CANDIDATE_COUNT
    }

    fn default_vendor_id() -> String {
        format!("0x{:04x}", SENSOR_VENDOR_ID)
    }

    fn default_product_id() -> String {
        format!("0x{:04x}", SENSOR_PRODUCT_ID)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
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
        "info".to_string()
    }
}

/// Where the active configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// Built-in defaults, with the reason no file was used
    Defaults(Error),
}

impl ConfigSource {
    /// Report the source; call once logging is set up
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from: {}", path.display()),
            ConfigSource::Defaults(e) => warn!("{}, using defaults", e),
        }
    }
}

impl DriverConfig {
    /// Load configuration from the specified path
    ///
    /// Without a path, the standard locations are tried in order.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            Self::candidate_paths()
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| Error::Config("No configuration file found".to_string()))?
        };

        Self::load_file(&config_path)
    }

    /// Load from the standard locations, falling back to defaults
    pub fn load_or_default() -> (Self, ConfigSource) {
        Self::load_first_of(&Self::candidate_paths())
    }

    /// Load the first existing file among `paths`, falling back to defaults
    ///
    /// A file that exists but fails to load is not skipped: defaults are used
    /// and the returned source carries the error.
    pub fn load_first_of(paths: &[PathBuf]) -> (Self, ConfigSource) {
        let Some(path) = paths.iter().find(|p| p.exists()) else {
            return (
                Self::default(),
                ConfigSource::Defaults(Error::Config("No configuration file found".to_string())),
            );
        };

        match Self::load_file(path) {
            Ok(config) => (config, ConfigSource::File(path.clone())),
            Err(e) => (Self::default(), ConfigSource::Defaults(e)),
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to load config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: DriverConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;

        info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("co2mon").join("co2mon.toml")
        } else {
            PathBuf::from(".config/co2mon/co2mon.toml")
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        vec![
            Self::default_path(),
            PathBuf::from("/etc/co2mon/co2mon.toml"),
        ]
    }

    /// Explicit device node from the file, tilde-expanded
    pub fn device_path(&self) -> Option<PathBuf> {
        self.device
            .path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    pub fn candidates(&self) -> CandidatePaths {
        CandidatePaths::new(
            self.device.candidate_prefix.clone(),
            self.device.candidate_count,
        )
    }

    pub fn vendor_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.vendor_id, "vendor_id")
    }

    pub fn product_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.product_id, "product_id")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_log_level(&self.logging.level)?;

        if self.device.candidate_prefix.is_empty() {
            return Err(Error::Config(
                "candidate_prefix must not be empty".to_string(),
            ));
        }

        if self.device.candidate_count == 0 || self.device.candidate_count > MAX_CANDIDATE_COUNT {
            return Err(Error::Config(format!(
                "candidate_count must be between 1 and {}, got {}",
                MAX_CANDIDATE_COUNT, self.device.candidate_count
            )));
        }

        if self
            .device
            .path
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return Err(Error::Config("device path must not be empty".to_string()));
        }

        self.vendor_id()?;
        self.product_id()?;
        Ok(())
    }
}

/// Parse a `0x`-prefixed USB id of one to four hex digits
fn parse_hex_id(id: &str, name: &str) -> Result<u16> {
    let hex_part = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .ok_or_else(|| {
            Error::Config(format!(
                "Invalid {} '{}', must start with '0x' (e.g., '0x04d9')",
                name, id
            ))
        })?;

    if hex_part.is_empty() || hex_part.len() > 4 {
        return Err(Error::Config(format!(
            "Invalid {} '{}', hex part must be 1-4 digits",
            name, id
        )));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| Error::Config(format!("Invalid {} '{}', not a valid hex number", name, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::capture_logs;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.vendor_id().unwrap(), 0x04d9);
        assert_eq!(config.product_id().unwrap(), 0xa052);
        assert_eq!(config.candidates(), CandidatePaths::default());
        assert!(config.device_path().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_hex_id_valid() {
        assert_eq!(parse_hex_id("0x04d9", "vendor_id").unwrap(), 0x04d9);
        assert_eq!(parse_hex_id("0XA052", "product_id").unwrap(), 0xa052);
        assert_eq!(parse_hex_id("0x1", "vendor_id").unwrap(), 1);
    }

    #[test]
    fn test_parse_hex_id_invalid() {
        assert!(parse_hex_id("04d9", "vendor_id").is_err());
        assert!(parse_hex_id("0x", "vendor_id").is_err());
        assert!(parse_hex_id("0x12345", "vendor_id").is_err());
        assert!(parse_hex_id("0xGHIJ", "vendor_id").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = DriverConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = DriverConfig::parse(&toml_str).unwrap();

        assert_eq!(config.logging.level, parsed.logging.level);
        assert_eq!(config.device.vendor_id, parsed.device.vendor_id);
        assert!(parsed.device.path.is_none());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = DriverConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_candidate_count() {
        let mut config = DriverConfig::default();
        config.device.candidate_count = 0;
        assert!(config.validate().is_err());

        config.device.candidate_count = 257;
        assert!(config.validate().is_err());

        config.device.candidate_count = 256;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_device_path_tilde_expansion() {
        let mut config = DriverConfig::default();
        config.device.path = Some("/dev/hidraw4".to_string());
        assert_eq!(config.device_path(), Some(PathBuf::from("/dev/hidraw4")));

        config.device.path = Some("~/sensor".to_string());
        let expanded = config.device_path().unwrap();
        assert!(expanded.ends_with("sensor"));
    }

    #[test]
    fn test_invalid_file_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("co2mon.toml");
        fs::write(&broken, "[logging]\nlevel = \"loud\"\n").unwrap();

        let (config, source) = DriverConfig::load_first_of(&[broken]);
        assert_eq!(config.logging.level, "info");
        let ConfigSource::Defaults(ref e) = source else {
            panic!("expected defaults, got {:?}", source);
        };
        assert!(e.to_string().contains("co2mon.toml"));

        let ((), logs) = capture_logs(|| source.log());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("using defaults"));
        assert!(logs.contains("loud"));
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let user = dir.path().join("user.toml");
        let system = dir.path().join("system.toml");
        fs::write(&user, "[logging]\nlevel = \"debug\"\n").unwrap();
        fs::write(&system, "[logging]\nlevel = \"error\"\n").unwrap();

        let (config, source) = DriverConfig::load_first_of(&[missing, user.clone(), system]);
        assert_eq!(config.logging.level, "debug");
        assert!(matches!(source, ConfigSource::File(ref p) if *p == user));

        let ((), logs) = capture_logs(|| source.log());
        assert!(logs.contains("Loaded configuration from"));
    }

    #[test]
    fn test_no_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, source) = DriverConfig::load_first_of(&[dir.path().join("none.toml")]);

        assert_eq!(config.logging.level, "info");
        assert!(matches!(source, ConfigSource::Defaults(_)));
    }
}
