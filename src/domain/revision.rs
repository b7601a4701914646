//! Revision call graph: the aggregate root.
//!
//! One `RevisionCallGraph` describes one published revision of one artifact:
//! its coordinates, the tool that produced it, its scoped class hierarchy and
//! its call edges. The revision URIs are always derived from the coordinates.
//!
//! There are three equivalent ways to build one: [`RevisionCallGraph::new`],
//! [`RevisionConfig::build`], and decoding the wire format (see `api::dto`).
//! All three go through the same validation.

use std::collections::{BTreeMap, HashSet};

use crate::domain::callgraph::{CallScope, Graph};
use crate::domain::error::{CallGraphError, CallGraphResult};
use crate::domain::hierarchy::{ClassHierarchy, Scope};
use crate::domain::methods::MethodId;
use crate::domain::node::Node;
use crate::domain::uri::EntityUri;

/// Timestamp value meaning "unknown".
pub const UNKNOWN_TIMESTAMP: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct RevisionCallGraph {
    forge: String,
    product: String,
    version: String,
    /// Seconds since the UNIX epoch, or `UNKNOWN_TIMESTAMP`.
    timestamp: i64,
    uri: EntityUri,
    forgeless_uri: EntityUri,
    cg_generator: String,
    node_count: usize,
    class_hierarchy: ClassHierarchy,
    graph: Graph,
}

/// Field-by-field description of a revision. Required fields are plain values;
/// only the timestamp is optional.
#[derive(Debug, Clone, Default)]
pub struct RevisionConfig {
    pub forge: String,
    pub product: String,
    pub version: String,
    pub cg_generator: String,
    pub timestamp: Option<i64>,
    pub node_count: usize,
    pub class_hierarchy: ClassHierarchy,
    pub graph: Graph,
}

impl RevisionConfig {
    pub fn build(self) -> CallGraphResult<RevisionCallGraph> {
        RevisionCallGraph::new(
            self.forge,
            self.product,
            self.version,
            self.timestamp.unwrap_or(UNKNOWN_TIMESTAMP),
            self.node_count,
            self.cg_generator,
            self.class_hierarchy,
            self.graph,
        )
    }
}

impl RevisionCallGraph {
    /// Build a revision call graph. Fails if any coordinate or the generator is
    /// empty, or if the coordinates do not form a valid revision URI. Negative timestamps are stored as unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        forge: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
        timestamp: i64,
        node_count: usize,
        cg_generator: impl Into<String>,
        class_hierarchy: ClassHierarchy,
        graph: Graph,
    ) -> CallGraphResult<Self> {
        let forge = forge.into();
        let product = product.into();
        let version = version.into();
        let cg_generator = cg_generator.into();
        for (field, value) in [
            ("forge", &forge),
            ("product", &product),
            ("version", &version),
            ("generator", &cg_generator),
        ] {
            if value.is_empty() {
                return Err(CallGraphError::MissingField(field.to_string()));
            }
        }
        let uri = EntityUri::revision(&forge, &product, &version)?;
        let forgeless_uri = EntityUri::forgeless(&product, &version)?;

        Ok(Self {
            forge,
            product,
            version,
            timestamp: if timestamp < 0 { UNKNOWN_TIMESTAMP } else { timestamp },
            uri,
            forgeless_uri,
            cg_generator,
            node_count,
            class_hierarchy,
            graph,
        })
    }

    pub fn forge(&self) -> &str {
        &self.forge
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Raw timestamp, `UNKNOWN_TIMESTAMP` when unknown.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn known_timestamp(&self) -> Option<i64> {
        (self.timestamp >= 0).then_some(self.timestamp)
    }

    pub fn uri(&self) -> &EntityUri {
        &self.uri
    }

    pub fn forgeless_uri(&self) -> &EntityUri {
        &self.forgeless_uri
    }

    pub fn cg_generator(&self) -> &str {
        &self.cg_generator
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn class_hierarchy(&self) -> &ClassHierarchy {
        &self.class_hierarchy
    }

    /// For the stitching stage: move types between scopes.
    pub fn class_hierarchy_mut(&mut self) -> &mut ClassHierarchy {
        &mut self.class_hierarchy
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// For the stitching stage: move edges between relations.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// All methods of all scopes keyed by id. Scopes are applied in the order
    /// internal, external, resolved; on an id collision the later scope wins.
    pub fn map_of_all_methods(&self) -> BTreeMap<MethodId, &Node> {
        let mut result = BTreeMap::new();
        for (_, types) in self.class_hierarchy.iter() {
            for ty in types.values() {
                result.extend(ty.methods().iter());
            }
        }
        result
    }

    /// Same as [`map_of_all_methods`](Self::map_of_all_methods) but keyed by
    /// `(scope, id)`, so ids repeated across scopes never collide.
    pub fn map_of_all_methods_scoped(&self) -> BTreeMap<(Scope, MethodId), &Node> {
        let mut result = BTreeMap::new();
        for (scope, types) in self.class_hierarchy.iter() {
            for ty in types.values() {
                result.extend(ty.methods().iter().map(|(id, node)| ((scope, id), node)));
            }
        }
        result
    }

    /// True if there is no call in any of the three relations.
    pub fn is_call_graph_empty(&self) -> bool {
        self.graph.is_call_graph_empty()
    }

    /// Check edge endpoints against the declared scopes.
    ///
    /// - internal calls: caller and callee in `internalTypes`
    /// - external calls: caller in `internalTypes`
    /// - resolved calls: caller in `internalTypes`, callee in `resolvedTypes`
    ///
    /// External callees are not checked: analyzers may emit them without a
    /// placeholder type.
    pub fn validate(&self) -> CallGraphResult<()> {
        let internal = self.ids_in(Scope::InternalTypes);
        let resolved = self.ids_in(Scope::ResolvedTypes);

        for scope in CallScope::ALL {
            for &(caller, callee) in self.graph.calls(scope).keys() {
                let callee_ok = match scope {
                    CallScope::Internal => internal.contains(&callee),
                    CallScope::External => true,
                    CallScope::Resolved => resolved.contains(&callee),
                };
                if !internal.contains(&caller) || !callee_ok {
                    return Err(CallGraphError::DanglingEdge {
                        scope: scope.as_str(),
                        caller,
                        callee,
                    });
                }
            }
        }
        Ok(())
    }

    fn ids_in(&self, scope: Scope) -> HashSet<MethodId> {
        self.class_hierarchy
            .get(scope)
            .values()
            .flat_map(|ty| ty.methods().ids())
            .collect()
    }
}
