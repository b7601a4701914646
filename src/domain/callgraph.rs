// Call edges of a revision call graph.
// Three independent relations: internal, external and resolved calls, each keyed
// by the (caller, callee) id pair and holding per-call-site metadata.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::methods::MethodId;
use crate::domain::node::Metadata;

/// Program counter / call-site id inside the caller.
pub type CallSiteId = i64;

/// `(caller, callee)`; equality and hashing are on the value pair only.
pub type CallPair = (MethodId, MethodId);

/// Call-site id -> call metadata (e.g. `{"type": "invokevirtual"}`).
pub type CallSites = BTreeMap<CallSiteId, Metadata>;

pub type CallMap = BTreeMap<CallPair, CallSites>;

/// Which edge relation a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallScope {
    /// Caller and callee both defined in the artifact.
    Internal,
    /// Caller internal, callee in a dependency not yet resolved.
    External,
    /// Callee resolved into a concrete dependency method.
    Resolved,
}

impl CallScope {
    pub const ALL: [CallScope; 3] = [CallScope::Internal, CallScope::External, CallScope::Resolved];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallScope::Internal => "internalCalls",
            CallScope::External => "externalCalls",
            CallScope::Resolved => "resolvedCalls",
        }
    }
}

impl fmt::Display for CallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The call graph itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    internal_calls: CallMap,
    external_calls: CallMap,
    resolved_calls: CallMap,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_calls(internal_calls: CallMap, external_calls: CallMap, resolved_calls: CallMap) -> Self {
        Self {
            internal_calls,
            external_calls,
            resolved_calls,
        }
    }

    pub fn calls(&self, scope: CallScope) -> &CallMap {
        match scope {
            CallScope::Internal => &self.internal_calls,
            CallScope::External => &self.external_calls,
            CallScope::Resolved => &self.resolved_calls,
        }
    }

    fn calls_mut(&mut self, scope: CallScope) -> &mut CallMap {
        match scope {
            CallScope::Internal => &mut self.internal_calls,
            CallScope::External => &mut self.external_calls,
            CallScope::Resolved => &mut self.resolved_calls,
        }
    }

    pub fn internal_calls(&self) -> &CallMap {
        &self.internal_calls
    }

    pub fn external_calls(&self) -> &CallMap {
        &self.external_calls
    }

    pub fn resolved_calls(&self) -> &CallMap {
        &self.resolved_calls
    }

    /// Record one call site. Call sites of the same pair accumulate; metadata of
    /// an already-known call site is merged key by key.
    pub fn add_call(
        &mut self,
        scope: CallScope,
        caller: MethodId,
        callee: MethodId,
        call_site: CallSiteId,
        metadata: Metadata,
    ) {
        let mut sites = CallSites::new();
        sites.insert(call_site, metadata);
        merge_sites(self.calls_mut(scope), (caller, callee), sites);
    }

    pub fn add_internal_call(&mut self, caller: MethodId, callee: MethodId, call_site: CallSiteId, metadata: Metadata) {
        self.add_call(CallScope::Internal, caller, callee, call_site, metadata);
    }

    pub fn add_external_call(&mut self, caller: MethodId, callee: MethodId, call_site: CallSiteId, metadata: Metadata) {
        self.add_call(CallScope::External, caller, callee, call_site, metadata);
    }

    pub fn add_resolved_call(&mut self, caller: MethodId, callee: MethodId, call_site: CallSiteId, metadata: Metadata) {
        self.add_call(CallScope::Resolved, caller, callee, call_site, metadata);
    }

    /// Add every call site of `pair` at once.
    pub fn add_call_sites(&mut self, scope: CallScope, pair: CallPair, sites: CallSites) {
        merge_sites(self.calls_mut(scope), pair, sites);
    }

    pub fn remove_call(&mut self, scope: CallScope, pair: CallPair) -> Option<CallSites> {
        self.calls_mut(scope).remove(&pair)
    }

    /// Move an edge between relations, e.g. external -> resolved after stitching.
    /// Returns false if the edge does not exist in `from`.
    pub fn move_call(&mut self, pair: CallPair, from: CallScope, to: CallScope) -> bool {
        match self.calls_mut(from).remove(&pair) {
            Some(sites) => {
                merge_sites(self.calls_mut(to), pair, sites);
                true
            }
            None => false,
        }
    }

    /// Union the internal and external calls of `other` into this graph.
    /// Resolved calls are per artifact pair and are never appended.
    pub fn append(&mut self, other: &Graph) {
        for (pair, sites) in &other.internal_calls {
            merge_sites(&mut self.internal_calls, *pair, sites.clone());
        }
        for (pair, sites) in &other.external_calls {
            merge_sites(&mut self.external_calls, *pair, sites.clone());
        }
    }

    /// Internal + external edges. Resolved calls are derived and not counted.
    pub fn size(&self) -> usize {
        self.internal_calls.len() + self.external_calls.len()
    }

    /// Edges in all three relations.
    pub fn edge_count(&self) -> usize {
        self.size() + self.resolved_calls.len()
    }

    pub fn call_site_count(&self, scope: CallScope) -> usize {
        self.calls(scope).values().map(|sites| sites.len()).sum()
    }

    pub fn is_call_graph_empty(&self) -> bool {
        self.internal_calls.is_empty() && self.external_calls.is_empty() && self.resolved_calls.is_empty()
    }
}

fn merge_sites(calls: &mut CallMap, pair: CallPair, sites: CallSites) {
    let entry = calls.entry(pair).or_default();
    for (site, metadata) in sites {
        entry.entry(site).or_default().extend(metadata);
    }
}
