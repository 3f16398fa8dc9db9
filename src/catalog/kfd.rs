//! KFD topology reader
//!
//! The amdkfd driver publishes every HSA agent under
//! `/sys/class/kfd/kfd/topology/nodes/<id>`. Each node carries a
//! `properties` file of `key value` lines, an ISA `name`, and
//! `mem_banks/` and `io_links/` subdirectories with their own
//! `properties` files.

use super::host::{host_accelerator, host_parallelism};
use super::{DeviceCatalog, StaticCatalog};
use crate::accelerator::{pack_version, AccessType, Accelerator, Profile};
use crate::error::{CatalogError, Result};
use crate::mappings::{gfx_isa_name, identify_gfx_target, parse_gfx_target_version};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Frame buffer heap types (public and private)
const FRAME_BUFFER_HEAPS: [u64; 2] = [1, 2];

/// SIMDs per compute unit when the node does not report it
const DEFAULT_SIMD_PER_CU: u64 = 4;

/// One topology node as read from sysfs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KfdNode {
    /// Node id (directory name)
    pub id: u32,
    /// ISA name, empty for CPU nodes
    pub name: String,
    /// Node properties
    pub properties: HashMap<String, u64>,
    /// Memory bank properties, by bank index
    pub mem_banks: Vec<HashMap<String, u64>>,
    /// IO link properties, by link index
    pub io_links: Vec<HashMap<String, u64>>,
}

impl KfdNode {
    /// Property value, zero when absent
    pub fn prop(&self, key: &str) -> u64 {
        self.properties.get(key).copied().unwrap_or(0)
    }

    /// Property value narrowed to `u32`, saturating at `u32::MAX`
    pub fn prop_u32(&self, key: &str) -> u32 {
        saturate_u32(self.prop(key))
    }

    /// GPU nodes report SIMDs; CPU nodes do not
    pub fn is_gpu(&self) -> bool {
        self.prop("simd_count") > 0
    }

    /// GPU node sharing the package with CPU cores
    pub fn is_apu(&self) -> bool {
        self.is_gpu() && self.prop("cpu_cores_count") > 0
    }

    /// ISA name, derived from `gfx_target_version` when `name` is empty
    pub fn isa(&self) -> String {
        if self.name.is_empty() {
            gfx_isa_name(self.prop_u32("gfx_target_version"))
        } else {
            self.name.clone()
        }
    }

    /// Frame buffer size in bytes
    pub fn frame_buffer_bytes(&self) -> u64 {
        let banked: u64 = self
            .mem_banks
            .iter()
            .filter(|bank| {
                FRAME_BUFFER_HEAPS.contains(&bank.get("heap_type").copied().unwrap_or(0))
            })
            .map(|bank| bank.get("size_in_bytes").copied().unwrap_or(0))
            .fold(0u64, u64::saturating_add);

        if banked > 0 {
            banked
        } else {
            self.prop("local_mem_size")
        }
    }

    /// Compute units, from SIMD count
    pub fn compute_units(&self) -> u32 {
        let simd_per_cu = match self.prop("simd_per_cu") {
            0 => DEFAULT_SIMD_PER_CU,
            n => n,
        };
        saturate_u32(self.prop("simd_count") / simd_per_cu)
    }
}

/// Catalog backed by the KFD topology
#[derive(Debug, Clone)]
pub struct KfdCatalog {
    inner: StaticCatalog,
}

impl KfdCatalog {
    /// Read the topology under `root`
    ///
    /// A missing root yields an empty catalog.
    pub fn load(root: &Path, default_device: Option<String>) -> Result<Self> {
        let nodes = read_nodes(root)?;
        log::debug!("read {} topology nodes from {}", nodes.len(), root.display());
        Ok(Self::from_nodes(nodes, default_device))
    }

    /// Build a catalog from already parsed nodes
    pub fn from_nodes(nodes: Vec<KfdNode>, default_device: Option<String>) -> Self {
        let mut inner = StaticCatalog::new(build_accelerators(&nodes));
        if let Some(path) = default_device {
            inner = inner.with_default(path);
        }
        Self { inner }
    }
}

impl DeviceCatalog for KfdCatalog {
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

/// Map nodes to accelerators: the host first, then GPUs as `HSA:<n>`
fn build_accelerators(nodes: &[KfdNode]) -> Vec<Accelerator> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let gpu_paths: HashMap<u32, String> = nodes
        .iter()
        .filter(|node| node.is_gpu())
        .enumerate()
        .map(|(ordinal, node)| (node.id, format!("HSA:{}", ordinal)))
        .collect();

    let cpu_cores: u64 = nodes
        .iter()
        .filter(|node| !node.is_gpu())
        .map(|node| node.prop("cpu_cores_count"))
        .fold(0u64, u64::saturating_add);
    let host_units = if cpu_cores > 0 {
        saturate_u32(cpu_cores)
    } else {
        host_parallelism()
    };

    let mut accelerators = vec![host_accelerator(host_units)];
    accelerators.extend(
        nodes
            .iter()
            .filter(|node| node.is_gpu())
            .map(|node| gpu_accelerator(node, &gpu_paths)),
    );
    accelerators
}

fn gpu_accelerator(node: &KfdNode, gpu_paths: &HashMap<u32, String>) -> Accelerator {
    let gfx_version = node.prop_u32("gfx_target_version");
    let (major, minor, _) = parse_gfx_target_version(gfx_version);
    let isa = node.isa();
    let description = match identify_gfx_target(gfx_version) {
        Some(target) => format!("AMD {} ({}, {})", target.codename, isa, target.family),
        None => format!("AMD HSA Agent {}", isa),
    };

    let mut peers: Vec<String> = Vec::new();
    for link in &node.io_links {
        let Some(to) = link.get("node_to").and_then(|&to| u32::try_from(to).ok()) else {
            continue;
        };
        if to == node.id {
            continue;
        }
        if let Some(path) = gpu_paths.get(&to) {
            if !peers.contains(path) {
                peers.push(path.clone());
            }
        }
    }

    let apu = node.is_apu();
    let accelerator = Accelerator {
        device_path: gpu_paths
            .get(&node.id)
            .cloned()
            .unwrap_or_else(|| format!("HSA:node{}", node.id)),
        description,
        version: pack_version(saturate_u16(major), saturate_u16(minor)),
        dedicated_memory: node.frame_buffer_bytes() / 1024,
        compute_units: node.compute_units(),
        max_tile_static_size: saturate_u32(node.prop("lds_size_in_kb").saturating_mul(1024)),
        supports_double_precision: true,
        supports_limited_double_precision: true,
        is_debug: false,
        has_display: false,
        is_emulated: false,
        supports_cpu_shared_memory: apu,
        default_cpu_access_type: if apu {
            AccessType::ReadWrite
        } else {
            AccessType::None
        },
        profile: if apu { Profile::Full } else { Profile::Base },
        peers,
    };

    log::debug!(
        "node {} -> {} ({}, {} CUs)",
        node.id,
        accelerator.device_path,
        accelerator.description,
        accelerator.compute_units
    );
    accelerator
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn saturate_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Read every node under `<root>/nodes`, in ascending id order
fn read_nodes(root: &Path) -> Result<Vec<KfdNode>> {
    let mut nodes = Vec::new();

    for (id, dir) in read_indexed_dirs(&root.join("nodes"))? {
        match read_node(id, &dir) {
            Ok(node) => nodes.push(node),
            Err(e) => log::warn!("skipping topology node {}: {}", id, e),
        }
    }

    Ok(nodes)
}

fn read_node(id: u32, dir: &Path) -> Result<KfdNode> {
    let properties = read_properties(&dir.join("properties"))?;

    let name_path = dir.join("name");
    let name = match fs::read_to_string(&name_path) {
        Ok(name) => name.trim().to_string(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(CatalogError::topology(name_path, e)),
    };

    let mem_banks = read_indexed_properties(&dir.join("mem_banks"))?;
    let io_links = read_indexed_properties(&dir.join("io_links"))?;

    Ok(KfdNode {
        id,
        name,
        properties,
        mem_banks,
        io_links,
    })
}

fn read_indexed_properties(dir: &Path) -> Result<Vec<HashMap<String, u64>>> {
    read_indexed_dirs(dir)?
        .into_iter()
        .map(|(_, entry)| read_properties(&entry.join("properties")))
        .collect()
}

/// Numerically named subdirectories of `dir`, sorted by number
///
/// A missing directory has no entries.
fn read_indexed_dirs(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} not present", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(CatalogError::topology(dir, e)),
    };

    let mut indexed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::topology(dir, e))?;
        let Some(index) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u32>().ok())
        else {
            continue;
        };
        indexed.push((index, entry.path()));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed)
}

fn read_properties(path: &Path) -> Result<HashMap<String, u64>> {
    let text = fs::read_to_string(path).map_err(|e| CatalogError::topology(path, e))?;
    parse_properties(path, &text)
}

/// Parse `key value` lines; blank lines are ignored
pub(crate) fn parse_properties(path: &Path, text: &str) -> Result<HashMap<String, u64>> {
    let mut properties = HashMap::new();

    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(key) = fields.next() else {
            continue;
        };

        let value = fields
            .next()
            .filter(|_| fields.next().is_none())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or_else(|| CatalogError::Parse {
                path: path.to_path_buf(),
                line: line.to_string(),
            })?;

        properties.insert(key.to_string(), value);
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn cpu_node(id: u32, cores: u64) -> KfdNode {
        KfdNode {
            id,
            properties: props(&[("cpu_cores_count", cores), ("simd_count", 0)]),
            ..KfdNode::default()
        }
    }

    fn gpu_node(id: u32, gfx: u64, links_to: &[u64]) -> KfdNode {
        KfdNode {
            id,
            name: String::new(),
            properties: props(&[
                ("simd_count", 240),
                ("simd_per_cu", 4),
                ("lds_size_in_kb", 64),
                ("gfx_target_version", gfx),
                ("local_mem_size", 0),
            ]),
            mem_banks: vec![
                props(&[("heap_type", 1), ("size_in_bytes", 16 << 30)]),
                props(&[("heap_type", 0), ("size_in_bytes", 1 << 20)]),
            ],
            io_links: links_to
                .iter()
                .map(|&to| props(&[("node_from", id as u64), ("node_to", to)]))
                .collect(),
        }
    }

    #[test]
    fn test_parse_properties() {
        let text = "cpu_cores_count 0\nsimd_count 240\n\nlds_size_in_kb 64\n";
        let parsed = parse_properties(Path::new("properties"), text).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["simd_count"], 240);
    }

    #[test]
    fn test_parse_properties_rejects_malformed_lines() {
        for bad in ["simd_count", "simd_count forty", "simd_count 1 2"] {
            let err = parse_properties(Path::new("properties"), bad).unwrap_err();
            assert!(matches!(err, CatalogError::Parse { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_gpu_node_mapping() {
        let catalog = KfdCatalog::from_nodes(vec![cpu_node(0, 16), gpu_node(1, 90006, &[0])], None);
        let all = catalog.all().unwrap();
        assert_eq!(all.len(), 2);

        let gpu = &all[1];
        assert_eq!(gpu.device_path, "HSA:0");
        assert_eq!(gpu.description, "AMD Vega 20 (gfx906, Vega)");
        assert_eq!(gpu.version_string(), "9.0");
        assert_eq!(gpu.dedicated_memory, 16 * 1024 * 1024);
        assert_eq!(gpu.compute_units, 60);
        assert_eq!(gpu.max_tile_static_size, 65536);
        assert_eq!(gpu.profile, Profile::Base);
        assert_eq!(gpu.default_cpu_access_type, AccessType::None);
        assert!(!gpu.supports_cpu_shared_memory);
        assert!(gpu.peers.is_empty());

        assert_eq!(all[0].device_path, "cpu");
        assert_eq!(all[0].compute_units, 16);
    }

    #[test]
    fn test_apu_node() {
        let mut node = gpu_node(1, 90012, &[]);
        node.properties.insert("cpu_cores_count".to_string(), 8);
        node.mem_banks.clear();
        node.properties.insert("local_mem_size".to_string(), 512 << 20);

        let catalog = KfdCatalog::from_nodes(vec![cpu_node(0, 8), node], None);
        let apu = catalog.resolve("HSA:0").unwrap();
        assert_eq!(apu.profile, Profile::Full);
        assert_eq!(apu.default_cpu_access_type, AccessType::ReadWrite);
        assert!(apu.supports_cpu_shared_memory);
        assert_eq!(apu.dedicated_memory, 512 * 1024);
        assert_eq!(apu.description, "AMD Renoir (gfx90c, Vega)");
    }

    #[test]
    fn test_unknown_target_description() {
        let catalog = KfdCatalog::from_nodes(vec![gpu_node(0, 70003, &[])], None);
        let gpu = catalog.resolve("HSA:0").unwrap();
        assert_eq!(gpu.description, "AMD HSA Agent gfx703");
        assert_eq!(gpu.version_string(), "7.0");
    }

    #[test]
    fn test_peers_follow_io_links() {
        let nodes = vec![
            cpu_node(0, 32),
            gpu_node(1, 90010, &[0, 2, 3, 2]),
            gpu_node(2, 90010, &[0, 1]),
            gpu_node(3, 90010, &[3]),
        ];
        let catalog = KfdCatalog::from_nodes(nodes, None);

        assert_eq!(catalog.resolve("HSA:0").unwrap().peers, ["HSA:1", "HSA:2"]);
        assert_eq!(catalog.resolve("HSA:1").unwrap().peers, ["HSA:0"]);
        assert!(catalog.resolve("HSA:2").unwrap().peers.is_empty());
    }

    #[test]
    fn test_default_device() {
        let nodes = vec![cpu_node(0, 4), gpu_node(1, 90006, &[]), gpu_node(2, 90006, &[])];
        let catalog = KfdCatalog::from_nodes(nodes.clone(), None);
        assert_eq!(catalog.default_accelerator().unwrap().device_path, "HSA:0");

        let catalog = KfdCatalog::from_nodes(nodes, Some("HSA:1".to_string()));
        assert_eq!(catalog.default_accelerator().unwrap().device_path, "HSA:1");
    }

    #[test]
    fn test_oversized_properties_saturate() {
        let mut node = gpu_node(1, 90006, &[u64::MAX]);
        node.properties.insert("lds_size_in_kb".to_string(), u64::MAX);
        node.properties.insert("simd_count".to_string(), u64::MAX);
        node.properties.insert("simd_per_cu".to_string(), 1);

        let catalog = KfdCatalog::from_nodes(vec![cpu_node(0, u64::MAX), node], None);
        let gpu = catalog.resolve("HSA:0").unwrap();
        assert_eq!(gpu.max_tile_static_size, u32::MAX);
        assert_eq!(gpu.compute_units, u32::MAX);
        assert!(gpu.peers.is_empty());
        assert_eq!(catalog.resolve("cpu").unwrap().compute_units, u32::MAX);
    }

    #[test]
    fn test_cpu_only_topology() {
        let catalog = KfdCatalog::from_nodes(vec![cpu_node(0, 12)], None);
        assert_eq!(catalog.default_accelerator().unwrap().device_path, "cpu");
    }

    #[test]
    fn test_load_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = KfdCatalog::load(&dir.path().join("absent"), None).unwrap();
        assert!(catalog.all().unwrap().is_empty());
    }
}
