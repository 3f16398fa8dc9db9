//! Runtime configuration read from the environment

use crate::catalog::Backend;
use crate::error::{CatalogError, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Default location of the KFD topology in sysfs
pub const DEFAULT_TOPOLOGY_ROOT: &str = "/sys/class/kfd/kfd/topology";

/// Environment variable overriding the topology root
pub const ENV_TOPOLOGY_ROOT: &str = "HC_INFO_TOPOLOGY_ROOT";
/// Environment variable naming the default accelerator
pub const ENV_DEFAULT_DEVICE: &str = "HC_INFO_DEFAULT_DEVICE";
/// Environment variable selecting the output format
pub const ENV_FORMAT: &str = "HC_INFO_FORMAT";
/// Environment variable overriding the compiled backend
pub const ENV_BACKEND: &str = "HC_INFO_BACKEND";

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned key/value lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CatalogError::InvalidConfig(format!(
                "{}: unknown output format '{}' (expected text or json)",
                ENV_FORMAT, other
            ))),
        }
    }
}

/// Reporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the KFD topology tree
    pub topology_root: PathBuf,
    /// Path of the accelerator to treat as default
    pub default_device: Option<String>,
    /// Output format
    pub format: OutputFormat,
    /// Catalog backend
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology_root: PathBuf::from(DEFAULT_TOPOLOGY_ROOT),
            default_device: None,
            format: OutputFormat::Text,
            backend: Backend::compiled(),
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        if let Some(root) = get(ENV_TOPOLOGY_ROOT) {
            config.topology_root = PathBuf::from(root);
        }
        config.default_device = get(ENV_DEFAULT_DEVICE);
        if let Some(format) = get(ENV_FORMAT) {
            config.format = format.parse()?;
        }
        if let Some(backend) = get(ENV_BACKEND) {
            config.backend = backend.parse()?;
        }

        log::debug!("configuration: {:?}", config);
        Ok(config)
    }
}
