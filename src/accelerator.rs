//! Accelerator descriptors
//!
//! An [`Accelerator`] is a read-only snapshot of one device as reported by a
//! [`DeviceCatalog`](crate::catalog::DeviceCatalog).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default CPU access mode for memory allocated on an accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// Runtime decides
    Auto,
    /// No CPU access
    None,
    /// CPU may read
    Read,
    /// CPU may write
    Write,
    /// CPU may read and write
    ReadWrite,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Auto => write!(f, "auto"),
            AccessType::None => write!(f, "none"),
            AccessType::Read => write!(f, "read"),
            AccessType::Write => write!(f, "write"),
            AccessType::ReadWrite => write!(f, "read write"),
        }
    }
}

/// Execution profile reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// HSA base profile (discrete devices)
    Base,
    /// HSA full profile (shared virtual memory with the host)
    Full,
    /// Not an HSA agent
    None,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Base => write!(f, "base"),
            Profile::Full => write!(f, "full"),
            Profile::None => write!(f, "none"),
        }
    }
}

/// Double precision support level, derived from the two capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoublePrecision {
    /// Full IEEE double support
    Full,
    /// Limited double support
    Limited,
    /// No double support
    None,
}

impl fmt::Display for DoublePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoublePrecision::Full => write!(f, "yes"),
            DoublePrecision::Limited => write!(f, "limited"),
            DoublePrecision::None => write!(f, "none"),
        }
    }
}

/// Read-only description of one accelerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerator {
    /// Unique device path
    pub device_path: String,
    /// Human readable description
    pub description: String,
    /// Packed version, major in the high 16 bits and minor in the low 16 bits
    pub version: u32,
    /// Dedicated memory in KB
    pub dedicated_memory: u64,
    /// Number of compute units
    pub compute_units: u32,
    /// Maximum tile static (LDS) memory in bytes
    pub max_tile_static_size: u32,
    /// Full double precision support
    pub supports_double_precision: bool,
    /// Limited double precision support
    pub supports_limited_double_precision: bool,
    /// Debug device
    pub is_debug: bool,
    /// A display is attached
    pub has_display: bool,
    /// Device is emulated on the host
    pub is_emulated: bool,
    /// Memory can be shared with the CPU
    pub supports_cpu_shared_memory: bool,
    /// Default CPU access type
    pub default_cpu_access_type: AccessType,
    /// Execution profile
    pub profile: Profile,
    /// Paths of peer devices, in topology order
    pub peers: Vec<String>,
}

impl Accelerator {
    /// Version as `"<major>.<minor>"`
    pub fn version_string(&self) -> String {
        version_string(self.version)
    }

    /// Double precision level; full support takes precedence over limited
    pub fn double_precision(&self) -> DoublePrecision {
        if self.supports_double_precision {
            DoublePrecision::Full
        } else if self.supports_limited_double_precision {
            DoublePrecision::Limited
        } else {
            DoublePrecision::None
        }
    }
}

/// Pack a major/minor pair into a 32-bit version value
pub fn pack_version(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}

/// Split a packed version into `(major, minor)`
pub fn unpack_version(version: u32) -> (u16, u16) {
    ((version >> 16) as u16, (version & 0xFFFF) as u16)
}

/// Render a packed version as `"<major>.<minor>"`
pub fn version_string(version: u32) -> String {
    let (major, minor) = unpack_version(version);
    format!("{}.{}", major, minor)
}
