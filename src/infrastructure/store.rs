use anyhow::{Context, Result};
use dashmap::DashMap;
use sled::Db;

use crate::domain::revision::RevisionCallGraph;
use crate::ports::{RevisionStore, RevisionSummary};

fn decode(uri: &str, json: &[u8]) -> Result<RevisionCallGraph> {
    let decoded = RevisionCallGraph::from_json_slice(json)
        .with_context(|| format!("Stored revision is corrupt: {}", uri))?;
    Ok(decoded.into_value())
}

// ============================================================================
// MemoryRevisionStore - in-process storage using DashMap
// ============================================================================

#[derive(Default)]
pub struct MemoryRevisionStore {
    graphs: DashMap<String, String>,
    summaries: DashMap<String, RevisionSummary>,
}

impl MemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl RevisionStore for MemoryRevisionStore {
    fn put(&self, rcg: &RevisionCallGraph) -> Result<String> {
        let key = rcg.uri().to_string();
        let json = rcg.to_json_string()?;
        self.graphs.insert(key.clone(), json);
        self.summaries.insert(key.clone(), RevisionSummary::from(rcg));
        Ok(key)
    }

    fn get(&self, uri: &str) -> Result<Option<RevisionCallGraph>> {
        match self.graphs.get(uri) {
            Some(json) => decode(uri, json.as_bytes()).map(Some),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<RevisionSummary>> {
        let mut summaries: Vec<RevisionSummary> = self.summaries.iter().map(|r| r.value().clone()).collect();
        summaries.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(summaries)
    }

    fn remove(&self, uri: &str) -> Result<bool> {
        self.summaries.remove(uri);
        Ok(self.graphs.remove(uri).is_some())
    }
}

// ============================================================================
// DiskRevisionStore - persistent storage using sled
// ============================================================================

pub struct DiskRevisionStore {
    db: Db,
    // wire JSON by revision URI
    graphs_tree: sled::Tree,
    // bincode RevisionSummary by revision URI
    summaries_tree: sled::Tree,
}

impl DiskRevisionStore {
    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path).with_context(|| format!("Cannot open revision store at {}", path))?;
        let graphs_tree = db.open_tree("graphs")?;
        let summaries_tree = db.open_tree("summaries")?;
        tracing::debug!(path, revisions = graphs_tree.len(), "opened revision store");

        Ok(Self {
            db,
            graphs_tree,
            summaries_tree,
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush revision store")?;
        Ok(())
    }
}

impl RevisionStore for DiskRevisionStore {
    fn put(&self, rcg: &RevisionCallGraph) -> Result<String> {
        let key = rcg.uri().to_string();
        let json = rcg.to_json_string()?;
        let summary = bincode::serialize(&RevisionSummary::from(rcg))?;

        self.graphs_tree.insert(key.as_bytes(), json.as_bytes())?;
        self.summaries_tree.insert(key.as_bytes(), summary)?;
        Ok(key)
    }

    fn get(&self, uri: &str) -> Result<Option<RevisionCallGraph>> {
        match self.graphs_tree.get(uri.as_bytes())? {
            Some(bytes) => decode(uri, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<RevisionSummary>> {
        // sled iterates in key order, so the result is already sorted by URI.
        self.summaries_tree
            .iter()
            .map(|entry| -> Result<RevisionSummary> {
                let (key, bytes) = entry?;
                bincode::deserialize(&bytes).with_context(|| {
                    format!("Corrupt summary for {}", String::from_utf8_lossy(&key))
                })
            })
            .collect()
    }

    fn remove(&self, uri: &str) -> Result<bool> {
        self.summaries_tree.remove(uri.as_bytes())?;
        Ok(self.graphs_tree.remove(uri.as_bytes())?.is_some())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
