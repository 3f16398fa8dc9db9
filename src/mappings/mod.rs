//! Hardware database for AMD GPU target identification

pub mod gfx;

pub use gfx::{identify_gfx_target, GfxTarget, GFX_TARGETS};

/// GPU architecture families known to the KFD topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuFamily {
    /// Graphics Core Next 3rd/4th generation
    Gcn,
    /// Vega (GCN 5th generation)
    Vega,
    /// Compute DNA
    Cdna,
    /// Compute DNA 2
    Cdna2,
    /// Compute DNA 3
    Cdna3,
    /// Radeon DNA
    Rdna,
    /// Radeon DNA 2
    Rdna2,
    /// Radeon DNA 3
    Rdna3,
    /// Radeon DNA 4
    Rdna4,
}

impl std::fmt::Display for GpuFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuFamily::Gcn => write!(f, "GCN"),
            GpuFamily::Vega => write!(f, "Vega"),
            GpuFamily::Cdna => write!(f, "CDNA"),
            GpuFamily::Cdna2 => write!(f, "CDNA 2"),
            GpuFamily::Cdna3 => write!(f, "CDNA 3"),
            GpuFamily::Rdna => write!(f, "RDNA"),
            GpuFamily::Rdna2 => write!(f, "RDNA 2"),
            GpuFamily::Rdna3 => write!(f, "RDNA 3"),
            GpuFamily::Rdna4 => write!(f, "RDNA 4"),
        }
    }
}

/// Split a KFD `gfx_target_version` into `(major, minor, stepping)`
///
/// Format: `major * 10000 + minor * 100 + stepping`
pub fn parse_gfx_target_version(version: u32) -> (u32, u32, u32) {
    (version / 10000, (version / 100) % 100, version % 100)
}

/// ISA name for a `gfx_target_version`, e.g. `90010` -> `"gfx90a"`
pub fn gfx_isa_name(version: u32) -> String {
    let (major, minor, stepping) = parse_gfx_target_version(version);
    format!("gfx{}{}{:x}", major, minor, stepping)
}
