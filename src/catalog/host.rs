//! Emulated host accelerator

use super::{DeviceCatalog, StaticCatalog};
use crate::accelerator::{AccessType, Accelerator, Profile};
use crate::error::Result;

/// Path of the host accelerator
pub const HOST_DEVICE_PATH: &str = "cpu";

/// Descriptor for the host CPU, exposed as an emulated accelerator
pub fn host_accelerator(compute_units: u32) -> Accelerator {
    Accelerator {
        device_path: HOST_DEVICE_PATH.to_string(),
        description: "CPU Device".to_string(),
        version: 0,
        dedicated_memory: 0,
        compute_units,
        max_tile_static_size: 0,
        supports_double_precision: true,
        supports_limited_double_precision: true,
        is_debug: false,
        has_display: false,
        is_emulated: true,
        supports_cpu_shared_memory: true,
        default_cpu_access_type: AccessType::Auto,
        profile: Profile::None,
        peers: Vec::new(),
    }
}

/// Logical CPUs visible to this process, at least one
pub(crate) fn host_parallelism() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Catalog containing only the host accelerator
#[derive(Debug, Clone)]
pub struct HostCatalog {
    inner: StaticCatalog,
}

impl HostCatalog {
    /// Host catalog sized to the available parallelism
    pub fn new() -> Self {
        Self {
            inner: StaticCatalog::new(vec![host_accelerator(host_parallelism())]),
        }
    }
}

impl Default for HostCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCatalog for HostCatalog {
    fn all(&self) -> Result<Vec<Accelerator>> {
        self.inner.all()
    }

    fn resolve(&self, path: &str) -> Result<Accelerator> {
        self.inner.resolve(path)
    }

    fn default_accelerator(&self) -> Result<Accelerator> {
        self.inner.default_accelerator()
    }
}
