/// Revision file loading.
/// Large files are memory-mapped; small ones are read into a buffer.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

use crate::application::assembler::RevisionFacts;
use crate::domain::error::Decoded;
use crate::domain::revision::RevisionCallGraph;

/// Files at least this large are memory-mapped.
pub const MMAP_THRESHOLD: u64 = 1 << 20;

/// Run `f` over the raw bytes of `path`.
pub fn with_bytes<T>(path: &Path, f: impl FnOnce(&[u8]) -> Result<T>) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Cannot stat {}", path.display()))?
        .len();

    if len >= MMAP_THRESHOLD {
        // The mapping is read-only and dropped before returning.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Cannot map {}", path.display()))?;
        f(&mmap)
    } else {
        let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
        f(&bytes)
    }
}

pub fn read_revision(path: &Path) -> Result<Decoded<RevisionCallGraph>> {
    with_bytes(path, |bytes| {
        RevisionCallGraph::from_json_slice(bytes)
            .with_context(|| format!("Invalid revision call graph: {}", path.display()))
    })
}

pub fn read_facts(path: &Path) -> Result<RevisionFacts> {
    with_bytes(path, |bytes| {
        serde_json::from_slice(bytes).with_context(|| format!("Invalid facts document: {}", path.display()))
    })
}

pub fn write_string(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "forge": "mvn", "product": "a:b", "version": "1", "generator": "g",
        "nodes": 0, "timestamp": 7,
        "cha": { "internalTypes": {}, "externalTypes": {}, "resolvedTypes": {} },
        "graph": { "internalCalls": [], "externalCalls": [], "resolvedCalls": [] }
    }"#;

    #[test]
    fn test_read_small_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cg.json");
        write_string(&path, MINIMAL).unwrap();

        let decoded = read_revision(&path).unwrap();
        assert!(!decoded.has_warnings());
        assert_eq!(decoded.value.timestamp(), 7);
    }

    #[test]
    fn test_read_mapped_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.json");
        // Pad with whitespace to cross the mapping threshold.
        let padded = format!("{}{}", MINIMAL, " ".repeat(MMAP_THRESHOLD as usize));
        write_string(&path, &padded).unwrap();

        let decoded = read_revision(&path).unwrap();
        assert_eq!(decoded.value.product(), "a:b");
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        write_string(&path, "{\"forge\": \"mvn\"}").unwrap();

        let err = read_revision(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
        assert!(read_revision(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/cg.json");
        write_string(&path, "{}").unwrap();
        assert!(path.is_file());
    }
}
