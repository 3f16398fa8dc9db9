//! Report formatting
//!
//! Text reports are aligned `label value` lines; JSON reports serialise the
//! descriptors directly.

use crate::accelerator::Accelerator;
use crate::catalog::Backend;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Column width of report labels
pub const LABEL_WIDTH: usize = 25;

/// Program name shown in usage text
pub const PROGRAM_NAME: &str = "hc-info";

/// Text rendering of one accelerator
pub struct AcceleratorReport<'a>(pub &'a Accelerator);

impl fmt::Display for AcceleratorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let acc = self.0;
        let w = LABEL_WIDTH;

        writeln!(f, "{:<w$}{}", "device path:", acc.device_path)?;
        writeln!(f, "{:<w$}{}", "description:", acc.description)?;
        writeln!(f, "{:<w$}{}", "version:", acc.version_string())?;
        writeln!(f, "{:<w$}{} KB", "dedicated memory:", acc.dedicated_memory)?;
        writeln!(f, "{:<w$}{}", "CPU shared memory:", acc.supports_cpu_shared_memory)?;
        writeln!(f, "{:<w$}{}", "max tile static size:", acc.max_tile_static_size)?;
        writeln!(f, "{:<w$}{}", "access type:", acc.default_cpu_access_type)?;
        writeln!(f, "{:<w$}{}", "compute units:", acc.compute_units)?;
        writeln!(f, "{:<w$}{}", "double precision:", acc.double_precision())?;
        writeln!(f, "{:<w$}{}", "debug:", acc.is_debug)?;
        writeln!(f, "{:<w$}{}", "has display:", acc.has_display)?;
        writeln!(f, "{:<w$}{}", "emulated:", acc.is_emulated)?;
        writeln!(f, "{:<w$}{}", "profile:", acc.profile)?;

        if acc.peers.is_empty() {
            writeln!(f, "{:<w$}-", "peers:")
        } else {
            writeln!(f, "{:<w$}{}", "peers:", acc.peers.join(" "))
        }
    }
}

/// Text listing: count header, every report, then the default device
pub fn format_listing(accelerators: &[Accelerator], default_path: &str) -> String {
    let mut text = format!("{} available accelerators:\n\n", accelerators.len());
    for acc in accelerators {
        text.push_str(&AcceleratorReport(acc).to_string());
        text.push('\n');
    }
    text.push_str(&format!("default accelerator:\t{}\n", default_path));
    text
}

/// JSON document for a full listing
#[derive(Debug, Serialize)]
pub struct Listing<'a> {
    /// When the listing was produced
    pub generated_at: DateTime<Utc>,
    /// Library version
    pub runtime_version: &'a str,
    /// Backend name
    pub backend: String,
    /// All accelerators
    pub accelerators: &'a [Accelerator],
    /// Path of the default accelerator
    pub default: Option<&'a str>,
}

impl<'a> Listing<'a> {
    /// Listing stamped with the current time
    pub fn new(backend: Backend, accelerators: &'a [Accelerator], default: Option<&'a str>) -> Self {
        Self {
            generated_at: Utc::now(),
            runtime_version: crate::VERSION,
            backend: backend.to_string(),
            accelerators,
            default,
        }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Pretty-printed JSON for one accelerator
pub fn accelerator_json(acc: &Accelerator) -> Result<String> {
    let mut json = serde_json::to_string_pretty(acc)?;
    json.push('\n');
    Ok(json)
}

/// Write usage text, including the compiled version and backend
pub fn write_usage<W: Write>(out: &mut W, backend: Backend) -> std::io::Result<()> {
    writeln!(out, "usage: {} [DEVICE-PATH]", PROGRAM_NAME)?;
    writeln!(out)?;
    writeln!(out, "prints information about the available HSA accelerators")?;
    writeln!(out, "DEVICE-PATH selects one accelerator; 'default' selects the default one")?;
    writeln!(out, "see: https://rocm.docs.amd.com")?;
    writeln!(out)?;
    writeln!(out, "runtime version: {}", crate::VERSION)?;
    writeln!(out, "backend: {}", backend)
}
