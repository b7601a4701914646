// Ports: what the application needs from the outside world.

use serde::{Deserialize, Serialize};

use crate::domain::callgraph::CallScope;
use crate::domain::hierarchy::Scope;
use crate::domain::revision::RevisionCallGraph;

pub trait OutputExporter {
    fn export(&self, rcg: &RevisionCallGraph, path: &str) -> anyhow::Result<()>;
}

/// Keyed storage of revision call graphs. Keys are revision URI strings
/// (`fasten://forge!product$version`). Implementations must be thread-safe.
pub trait RevisionStore: Send + Sync {
    /// Insert or replace. Returns the key it was stored under.
    fn put(&self, rcg: &RevisionCallGraph) -> anyhow::Result<String>;
    fn get(&self, uri: &str) -> anyhow::Result<Option<RevisionCallGraph>>;
    /// Summaries of every stored revision, ordered by URI.
    fn list(&self) -> anyhow::Result<Vec<RevisionSummary>>;
    /// Returns true if something was removed.
    fn remove(&self, uri: &str) -> anyhow::Result<bool>;
}

/// Counts and coordinates of one revision; cheap to store and print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionSummary {
    pub uri: String,
    pub forge: String,
    pub product: String,
    pub version: String,
    pub timestamp: i64,
    pub generator: String,
    pub node_count: usize,
    pub internal_types: usize,
    pub external_types: usize,
    pub resolved_types: usize,
    pub internal_calls: usize,
    pub external_calls: usize,
    pub resolved_calls: usize,
}

impl From<&RevisionCallGraph> for RevisionSummary {
    fn from(rcg: &RevisionCallGraph) -> Self {
        let cha = rcg.class_hierarchy();
        let graph = rcg.graph();
        Self {
            uri: rcg.uri().to_string(),
            forge: rcg.forge().to_string(),
            product: rcg.product().to_string(),
            version: rcg.version().to_string(),
            timestamp: rcg.timestamp(),
            generator: rcg.cg_generator().to_string(),
            node_count: rcg.node_count(),
            internal_types: cha.get(Scope::InternalTypes).len(),
            external_types: cha.get(Scope::ExternalTypes).len(),
            resolved_types: cha.get(Scope::ResolvedTypes).len(),
            internal_calls: graph.calls(CallScope::Internal).len(),
            external_calls: graph.calls(CallScope::External).len(),
            resolved_calls: graph.calls(CallScope::Resolved).len(),
        }
    }
}

impl std::fmt::Display for RevisionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) nodes={} types={}/{}/{} calls={}/{}/{}",
            self.uri,
            self.generator,
            self.node_count,
            self.internal_types,
            self.external_types,
            self.resolved_types,
            self.internal_calls,
            self.external_calls,
            self.resolved_calls
        )
    }
}
