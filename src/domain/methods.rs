//! The bijective method table of a type.
//!
//! Ids map to nodes and node URIs map back to ids. Both directions are kept in
//! sync on every insert, so neither side can be mutated on its own.

use std::collections::{BTreeMap, HashMap};

use crate::domain::node::Node;
use crate::domain::uri::EntityUri;

/// Method id, unique within one artifact's scope.
pub type MethodId = i64;

#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    by_id: BTreeMap<MethodId, Node>,
    by_uri: HashMap<EntityUri, MethodId>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `candidate` unless a node with the same URI exists,
    /// in which case the existing id is returned and nothing changes.
    ///
    /// If `candidate` is already bound to a different URI, that binding is
    /// replaced.
    pub fn insert(&mut self, node: Node, candidate: MethodId) -> MethodId {
        if let Some(&existing) = self.by_uri.get(node.uri()) {
            return existing;
        }
        if let Some(replaced) = self.by_id.remove(&candidate) {
            self.by_uri.remove(replaced.uri());
        }
        self.by_uri.insert(node.uri().clone(), candidate);
        self.by_id.insert(candidate, node);
        candidate
    }

    pub fn get(&self, id: MethodId) -> Option<&Node> {
        self.by_id.get(&id)
    }

    pub fn id_of(&self, uri: &EntityUri) -> Option<MethodId> {
        self.by_uri.get(uri).copied()
    }

    pub fn contains_id(&self, id: MethodId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn contains_uri(&self, uri: &EntityUri) -> bool {
        self.by_uri.contains_key(uri)
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (MethodId, &Node)> {
        self.by_id.iter().map(|(id, node)| (*id, node))
    }

    pub fn ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.by_id.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl PartialEq for MethodTable {
    fn eq(&self, other: &Self) -> bool {
        // by_uri is derived from by_id
        self.by_id == other.by_id
    }
}

impl FromIterator<(MethodId, Node)> for MethodTable {
    fn from_iter<I: IntoIterator<Item = (MethodId, Node)>>(iter: I) -> Self {
        let mut table = MethodTable::new();
        for (id, node) in iter {
            table.insert(node, id);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(uri: &str) -> Node {
        Node::parse(uri).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent_by_uri() {
        let mut table = MethodTable::new();
        assert_eq!(table.insert(node("/ns/A.m()V"), 3), 3);
        assert_eq!(table.insert(node("/ns/A.m()V"), 7), 3);
        assert_eq!(table.len(), 1);
        assert!(!table.contains_id(7));
    }

    #[test]
    fn test_reused_candidate_replaces_binding() {
        let mut table = MethodTable::new();
        table.insert(node("/ns/A.m()V"), 1);
        table.insert(node("/ns/A.n()V"), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().uri().as_str(), "/ns/A.n()V");
        assert_eq!(table.id_of(&EntityUri::parse("/ns/A.m()V").unwrap()), None);
        assert_eq!(table.id_of(&EntityUri::parse("/ns/A.n()V").unwrap()), Some(1));
    }

    #[test]
    fn test_iteration_is_by_ascending_id() {
        let table: MethodTable = vec![
            (9, node("/ns/A.c()V")),
            (2, node("/ns/A.a()V")),
            (5, node("/ns/A.b()V")),
        ]
        .into_iter()
        .collect();
        let ids: Vec<MethodId> = table.ids().collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
