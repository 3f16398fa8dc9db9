//! AMD GFX target database

use super::GpuFamily;

/// Known GFX target used for naming and classification
#[derive(Debug, Clone)]
pub struct GfxTarget {
    /// KFD `gfx_target_version` value
    pub version: u32,
    /// Chip codename (e.g. "Vega 20")
    pub codename: &'static str,
    /// Architecture family
    pub family: GpuFamily,
}

/// Database of GFX targets exposed by ROCm-capable kernels
pub const GFX_TARGETS: &[GfxTarget] = &[
    // GCN
    GfxTarget { version: 80001,  codename: "Carrizo",        family: GpuFamily::Gcn },
    GfxTarget { version: 80002,  codename: "Tonga",          family: GpuFamily::Gcn },
    GfxTarget { version: 80003,  codename: "Fiji/Polaris",   family: GpuFamily::Gcn },

    // Vega
    GfxTarget { version: 90000,  codename: "Vega 10",        family: GpuFamily::Vega },
    GfxTarget { version: 90002,  codename: "Raven",          family: GpuFamily::Vega },
    GfxTarget { version: 90004,  codename: "Vega 12",        family: GpuFamily::Vega },
    GfxTarget { version: 90006,  codename: "Vega 20",        family: GpuFamily::Vega },
    GfxTarget { version: 90012,  codename: "Renoir",         family: GpuFamily::Vega },

    // CDNA
    GfxTarget { version: 90008,  codename: "Arcturus",       family: GpuFamily::Cdna },
    GfxTarget { version: 90010,  codename: "Aldebaran",      family: GpuFamily::Cdna2 },
    GfxTarget { version: 90400,  codename: "Aqua Vanjaram",  family: GpuFamily::Cdna3 },
    GfxTarget { version: 90402,  codename: "Aqua Vanjaram",  family: GpuFamily::Cdna3 },

    // RDNA
    GfxTarget { version: 100100, codename: "Navi 10",        family: GpuFamily::Rdna },
    GfxTarget { version: 100300, codename: "Navi 21",        family: GpuFamily::Rdna2 },
    GfxTarget { version: 100301, codename: "Navi 22",        family: GpuFamily::Rdna2 },
    GfxTarget { version: 100302, codename: "Navi 23",        family: GpuFamily::Rdna2 },
    GfxTarget { version: 100305, codename: "Rembrandt",      family: GpuFamily::Rdna2 },
    GfxTarget { version: 110000, codename: "Navi 31",        family: GpuFamily::Rdna3 },
    GfxTarget { version: 110001, codename: "Navi 32",        family: GpuFamily::Rdna3 },
    GfxTarget { version: 110002, codename: "Navi 33",        family: GpuFamily::Rdna3 },
    GfxTarget { version: 110003, codename: "Phoenix",        family: GpuFamily::Rdna3 },
    GfxTarget { version: 120001, codename: "Navi 48",        family: GpuFamily::Rdna4 },
];

/// Look up a GFX target by its KFD `gfx_target_version`
pub fn identify_gfx_target(version: u32) -> Option<&'static GfxTarget> {
    GFX_TARGETS.iter().find(|target| target.version == version)
}
