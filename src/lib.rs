//! # hcinfo - HSA accelerator inspection
//!
//! Enumerates the compute accelerators visible to the HSA runtime and
//! renders a report of their capabilities: memory, compute units, precision
//! support, profile and peer topology.
//!
//! ## Features
//!
//! - **KFD topology backend** reading `/sys/class/kfd/kfd/topology`
//! - **Host backend** exposing the emulated CPU accelerator
//! - **Catalog trait** so reports can be produced from any device source
//! - **Text and JSON** report formats
//!
//! ## Quick Start
//!
//! ```no_run
//! use hcinfo::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = open_catalog(&Config::from_env()?)?;
//!     for acc in catalog.all()? {
//!         print!("{}", AcceleratorReport(&acc));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod accelerator;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod mappings;
pub mod report;

pub use accelerator::{version_string, AccessType, Accelerator, DoublePrecision, Profile};
pub use catalog::{open_catalog, Backend, DeviceCatalog, HostCatalog, KfdCatalog, StaticCatalog};
pub use cli::{Invocation, Reporter, EXIT_FAILURE, EXIT_SUCCESS};
pub use config::{Config, OutputFormat};
pub use error::{CatalogError, Result};
pub use report::AcceleratorReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
///
/// # Example
///
/// ```no_run
/// println!("Using hcinfo v{}", hcinfo::version());
/// ```
pub fn version() -> &'static str {
    VERSION
}

/// Run the reporter for `args` (program name excluded) against `config`
///
/// Opens the configured catalog, writes reports to `out` and diagnostics to
/// `err`, and returns the process exit status.
pub fn run<S, O, E>(args: &[S], config: &Config, out: &mut O, err: &mut E) -> Result<i32>
where
    S: AsRef<str>,
    O: std::io::Write,
    E: std::io::Write,
{
    let invocation = Invocation::from_args(args);
    log::debug!("invocation: {:?}", invocation);

    // Usage and help must not depend on a readable topology.
    if matches!(invocation, Invocation::Help | Invocation::Usage) {
        let empty = StaticCatalog::empty();
        return Reporter::new(&empty, config.format, config.backend).run(&invocation, out, err);
    }

    let catalog = match open_catalog(config) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::warn!("failed to open {} catalog: {}", config.backend, e);
            match &invocation {
                Invocation::Device(path) => cli::write_not_found(err, path)?,
                _ => writeln!(err, "error: {}", e)?,
            }
            return Ok(EXIT_FAILURE);
        }
    };
    Reporter::new(catalog.as_ref(), config.format, config.backend).run(&invocation, out, err)
}

/// Prelude module for convenient imports
///
/// # Example
///
/// ```no_run
/// use hcinfo::prelude::*;
///
/// let catalog = HostCatalog::new();
/// let default = catalog.default_accelerator()?;
/// # Ok::<(), hcinfo::CatalogError>(())
/// ```
pub mod prelude {
    pub use crate::accelerator::{AccessType, Accelerator, Profile};
    pub use crate::catalog::{open_catalog, DeviceCatalog, HostCatalog, KfdCatalog, StaticCatalog};
    pub use crate::config::{Config, OutputFormat};
    pub use crate::report::AcceleratorReport;
    pub use crate::{run, version};
}
