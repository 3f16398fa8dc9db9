//! Device catalogs
//!
//! A [`DeviceCatalog`] answers three questions: which accelerators exist,
//! which one lives at a given path, and which one is the default. The
//! reporter only talks to this trait, so it can run against the KFD
//! topology, the host alone, or an in-memory list.

mod host;
mod kfd;

pub use host::{host_accelerator, HostCatalog, HOST_DEVICE_PATH};
pub use kfd::{KfdCatalog, KfdNode};

use crate::accelerator::Accelerator;
use crate::config::Config;
use crate::error::{CatalogError, Result};
use std::fmt;
use std::str::FromStr;

/// Literal path that names the default accelerator
pub const DEFAULT_DEVICE_PATH: &str = "default";

/// Source of accelerator descriptors
pub trait DeviceCatalog {
    /// All accelerators, in catalog order
    fn all(&self) -> Result<Vec<Accelerator>>;

    /// Accelerator at `path`; [`DEFAULT_DEVICE_PATH`] resolves to the default
    fn resolve(&self, path: &str) -> Result<Accelerator>;

    /// The accelerator used when none is specified
    fn default_accelerator(&self) -> Result<Accelerator>;
}

/// Backend the catalog is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Linux KFD topology (HSA agents)
    Kfd,
    /// Emulated host accelerator only
    Host,
    /// No backend compiled in
    Unknown,
}

impl Backend {
    /// Backend selected by the enabled cargo features
    pub fn compiled() -> Self {
        if cfg!(all(feature = "kfd", target_os = "linux")) {
            Backend::Kfd
        } else if cfg!(feature = "host") {
            Backend::Host
        } else {
            Backend::Unknown
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Kfd => write!(f, "HSA (KFD)"),
            Backend::Host => write!(f, "Host"),
            Backend::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for Backend {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kfd" | "hsa" => Ok(Backend::Kfd),
            "host" | "cpu" => Ok(Backend::Host),
            other => Err(CatalogError::InvalidConfig(format!(
                "{}: unknown backend '{}' (expected kfd or host)",
                crate::config::ENV_BACKEND,
                other
            ))),
        }
    }
}

/// Open the catalog selected by `config`
pub fn open_catalog(config: &Config) -> Result<Box<dyn DeviceCatalog>> {
    log::debug!("opening {} catalog", config.backend);

    let catalog: Box<dyn DeviceCatalog> = match config.backend {
        Backend::Kfd => Box::new(KfdCatalog::load(
            &config.topology_root,
            config.default_device.clone(),
        )?),
        Backend::Host => Box::new(HostCatalog::new()),
        Backend::Unknown => Box::new(StaticCatalog::empty()),
    };

    Ok(catalog)
}

/// Catalog over a fixed list of accelerators
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    accelerators: Vec<Accelerator>,
    default_path: Option<String>,
}

impl StaticCatalog {
    /// Catalog over `accelerators`, default chosen automatically
    pub fn new(accelerators: Vec<Accelerator>) -> Self {
        Self {
            accelerators,
            default_path: None,
        }
    }

    /// Catalog with no accelerators
    pub fn empty() -> Self {
        Self::default()
    }

    /// Prefer the accelerator at `path` as default
    ///
    /// Ignored when no accelerator has that path.
    pub fn with_default(mut self, path: impl Into<String>) -> Self {
        self.default_path = Some(path.into());
        self
    }

    fn find(&self, path: &str) -> Option<&Accelerator> {
        self.accelerators.iter().find(|a| a.device_path == path)
    }
}

impl DeviceCatalog for StaticCatalog {
    fn all(&self) -> Result<Vec<Accelerator>> {
        Ok(self.accelerators.clone())
    }

    fn resolve(&self, path: &str) -> Result<Accelerator> {
        if path == DEFAULT_DEVICE_PATH {
            return self.default_accelerator();
        }

        self.find(path)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))
    }

    fn default_accelerator(&self) -> Result<Accelerator> {
        let preferred = self.default_path.as_deref().and_then(|p| self.find(p));
        if self.default_path.is_some() && preferred.is_none() {
            log::warn!(
                "default device '{}' not present, falling back",
                self.default_path.as_deref().unwrap_or_default()
            );
        }

        preferred
            .or_else(|| self.accelerators.iter().find(|a| !a.is_emulated))
            .or_else(|| self.accelerators.first())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(DEFAULT_DEVICE_PATH.to_string()))
    }
}
