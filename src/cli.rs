//! Argument dispatch for the `hc-info` reporter

use crate::catalog::{Backend, DeviceCatalog, DEFAULT_DEVICE_PATH};
use crate::config::OutputFormat;
use crate::error::{CatalogError, Result};
use crate::report::{accelerator_json, format_listing, write_usage, AcceleratorReport, Listing};
use std::io::Write;

/// Process exit status for success
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit status for usage errors and failed lookups
pub const EXIT_FAILURE: i32 = 1;

/// Write the single error line for a device path that did not resolve
pub fn write_not_found<E: Write>(err: &mut E, path: &str) -> std::io::Result<()> {
    writeln!(err, "{}", CatalogError::NotFound(path.to_string()))
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// No argument: list every accelerator
    ListAll,
    /// `-h` or `--help`
    Help,
    /// A single device path (or `default`)
    Device(String),
    /// More than one argument
    Usage,
}

impl Invocation {
    /// Classify the arguments following the program name
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [] => Invocation::ListAll,
            [arg] if matches!(arg.as_ref(), "-h" | "--help") => Invocation::Help,
            [arg] => Invocation::Device(arg.as_ref().to_string()),
            _ => Invocation::Usage,
        }
    }
}

/// Formats catalog contents for one invocation
pub struct Reporter<'a> {
    catalog: &'a dyn DeviceCatalog,
    format: OutputFormat,
    backend: Backend,
}

impl<'a> Reporter<'a> {
    /// Reporter over `catalog`
    pub fn new(catalog: &'a dyn DeviceCatalog, format: OutputFormat, backend: Backend) -> Self {
        Self {
            catalog,
            format,
            backend,
        }
    }

    /// Run `invocation`, writing reports to `out` and diagnostics to `err`
    ///
    /// Returns the process exit status. Only failures to write are errors.
    pub fn run<O, E>(&self, invocation: &Invocation, out: &mut O, err: &mut E) -> Result<i32>
    where
        O: Write,
        E: Write,
    {
        match invocation {
            Invocation::Help => {
                write_usage(out, self.backend)?;
                Ok(EXIT_SUCCESS)
            }
            Invocation::Usage => {
                write_usage(err, self.backend)?;
                Ok(EXIT_FAILURE)
            }
            Invocation::ListAll => match self.listing() {
                Ok(text) => {
                    out.write_all(text.as_bytes())?;
                    Ok(EXIT_SUCCESS)
                }
                Err(e) => {
                    writeln!(err, "error: {}", e)?;
                    Ok(EXIT_FAILURE)
                }
            },
            Invocation::Device(path) => match self.device(path) {
                Ok(text) => {
                    out.write_all(text.as_bytes())?;
                    Ok(EXIT_SUCCESS)
                }
                Err(e) => {
                    log::debug!("lookup of '{}' failed: {}", path, e);
                    write_not_found(err, path)?;
                    Ok(EXIT_FAILURE)
                }
            },
        }
    }

    /// Full listing, rendered before anything is written
    fn listing(&self) -> Result<String> {
        let accelerators = self.catalog.all()?;

        match self.format {
            OutputFormat::Text if accelerators.is_empty() => {
                Ok("no accelerators found.\n".to_string())
            }
            OutputFormat::Text => {
                let default = self.catalog.default_accelerator()?;
                Ok(format_listing(&accelerators, &default.device_path))
            }
            OutputFormat::Json => {
                let default = match self.catalog.default_accelerator() {
                    Ok(default) => Some(default.device_path),
                    Err(e) if e.is_not_found() => None,
                    Err(e) => return Err(e),
                };
                Listing::new(self.backend, &accelerators, default.as_deref()).to_json()
            }
        }
    }

    /// One device, checked against the requested path
    fn device(&self, path: &str) -> Result<String> {
        let acc = self.catalog.resolve(path)?;
        if path != DEFAULT_DEVICE_PATH && acc.device_path != path {
            log::warn!("'{}' resolved to '{}'", path, acc.device_path);
            return Err(CatalogError::NotFound(path.to_string()));
        }

        match self.format {
            OutputFormat::Text => Ok(AcceleratorReport(&acc).to_string()),
            OutputFormat::Json => accelerator_json(&acc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accelerator::{AccessType, Accelerator, Profile};
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    mock! {
        Catalog {}
        impl DeviceCatalog for Catalog {
            fn all(&self) -> Result<Vec<Accelerator>>;
            fn resolve(&self, path: &str) -> Result<Accelerator>;
            fn default_accelerator(&self) -> Result<Accelerator>;
        }
    }

    fn gpu(path: &str) -> Accelerator {
        Accelerator {
            device_path: path.to_string(),
            description: "AMD Navi 21 (gfx1030, RDNA 2)".to_string(),
            version: 0x000A_0003,
            dedicated_memory: 16777216,
            compute_units: 72,
            max_tile_static_size: 65536,
            supports_double_precision: true,
            supports_limited_double_precision: true,
            is_debug: false,
            has_display: false,
            is_emulated: false,
            supports_cpu_shared_memory: false,
            default_cpu_access_type: AccessType::None,
            profile: Profile::Base,
            peers: Vec::new(),
        }
    }

    fn run(catalog: &MockCatalog, args: &[&str], format: OutputFormat) -> (i32, String, String) {
        let reporter = Reporter::new(catalog, format, Backend::Kfd);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = reporter
            .run(&Invocation::from_args(args), &mut out, &mut err)
            .unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[rstest]
    #[case(&[], Invocation::ListAll)]
    #[case(&["-h"], Invocation::Help)]
    #[case(&["--help"], Invocation::Help)]
    #[case(&["HSA:0"], Invocation::Device("HSA:0".to_string()))]
    #[case(&["-x"], Invocation::Device("-x".to_string()))]
    #[case(&["a", "b"], Invocation::Usage)]
    #[case(&["-h", "--help"], Invocation::Usage)]
    #[case(&["--"], Invocation::Device("--".to_string()))]
    #[case(&["--", "--help"], Invocation::Usage)]
    fn test_invocation_from_args(#[case] args: &[&str], #[case] expected: Invocation) {
        assert_eq!(Invocation::from_args(args), expected);
    }

    #[test]
    fn test_no_accelerators() {
        let mut catalog = MockCatalog::new();
        catalog.expect_all().returning(|| Ok(Vec::new()));
        catalog.expect_default_accelerator().never();

        let (code, out, err) = run(&catalog, &[], OutputFormat::Text);
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "no accelerators found.\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_list_all() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_all()
            .returning(|| Ok(vec![gpu("HSA:0"), gpu("HSA:1")]));
        catalog
            .expect_default_accelerator()
            .returning(|| Ok(gpu("HSA:1")));

        let (code, out, _) = run(&catalog, &[], OutputFormat::Text);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.starts_with("2 available accelerators:\n\n"));
        assert_eq!(out.matches("device path:").count(), 2);
        assert!(out.ends_with("default accelerator:\tHSA:1\n"));
    }

    #[test]
    fn test_enumeration_failure() {
        let mut catalog = MockCatalog::new();
        catalog.expect_all().returning(|| {
            Err(CatalogError::InvalidConfig("broken".to_string()))
        });

        let (code, out, err) = run(&catalog, &[], OutputFormat::Text);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert!(err.starts_with("error: "));
    }

    #[rstest]
    #[case("-h")]
    #[case("--help")]
    fn test_help(#[case] flag: &str) {
        let mut catalog = MockCatalog::new();
        catalog.expect_all().never();

        let (code, out, err) = run(&catalog, &[flag], OutputFormat::Text);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.contains("usage:"));
        assert!(out.contains("backend: HSA (KFD)"));
        assert!(err.is_empty());
    }

    #[rstest]
    #[case(&["HSA:0", "HSA:1"])]
    #[case(&["-h", "extra"])]
    #[case(&["", "", ""])]
    fn test_too_many_arguments(#[case] args: &[&str]) {
        let mut catalog = MockCatalog::new();
        catalog.expect_all().never();
        catalog.expect_resolve().never();

        let (code, out, err) = run(&catalog, args, OutputFormat::Text);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert!(err.contains("usage:"));
    }

    #[test]
    fn test_single_device() {
        let mut catalog = MockCatalog::new();
        catalog.expect_resolve().returning(|path| Ok(gpu(path)));

        let (code, out, err) = run(&catalog, &["HSA:1"], OutputFormat::Text);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.starts_with("device path:             HSA:1\n"));
        assert!(out.contains("version:                 10.3\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_unknown_device() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_resolve()
            .returning(|path| Err(CatalogError::NotFound(path.to_string())));

        let (code, out, err) = run(&catalog, &["HSA:9"], OutputFormat::Text);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(err, "no accelerator for path: 'HSA:9'\n");
    }

    #[test]
    fn test_resolved_path_mismatch() {
        let mut catalog = MockCatalog::new();
        catalog.expect_resolve().returning(|_| Ok(gpu("HSA:0")));

        let (code, out, err) = run(&catalog, &["hsa:0"], OutputFormat::Text);
        assert_eq!(code, EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(err, "no accelerator for path: 'hsa:0'\n");
    }

    #[test]
    fn test_default_skips_path_check() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_resolve()
            .returning(|path| {
                assert_eq!(path, "default");
                Ok(gpu("HSA:0"))
            });

        let (code, out, _) = run(&catalog, &["default"], OutputFormat::Text);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.starts_with("device path:             HSA:0\n"));
    }

    #[test]
    fn test_json_listing_without_default() {
        let mut catalog = MockCatalog::new();
        catalog.expect_all().returning(|| Ok(Vec::new()));
        catalog
            .expect_default_accelerator()
            .returning(|| Err(CatalogError::NotFound("default".to_string())));

        let (code, out, _) = run(&catalog, &[], OutputFormat::Json);
        assert_eq!(code, EXIT_SUCCESS);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["accelerators"].as_array().unwrap().is_empty());
        assert!(value["default"].is_null());
    }

    #[test]
    fn test_json_device() {
        let mut catalog = MockCatalog::new();
        catalog.expect_resolve().returning(|path| Ok(gpu(path)));

        let (code, out, _) = run(&catalog, &["HSA:0"], OutputFormat::Json);
        assert_eq!(code, EXIT_SUCCESS);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["device_path"], "HSA:0");
        assert_eq!(value["compute_units"], 72);
    }
}
