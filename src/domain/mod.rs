// Domain model of revcg: URIs, nodes, types, scopes, edges and the revision aggregate.
// Pure data; no I/O and no logging happens below this module.

pub mod callgraph;
pub mod error;
pub mod hierarchy;
pub mod methods;
pub mod node;
pub mod revision;
pub mod types;
pub mod uri;

pub use callgraph::{CallMap, CallPair, CallScope, CallSiteId, CallSites, Graph};
pub use error::{CallGraphError, CallGraphResult, DecodeWarning, Decoded};
pub use hierarchy::{ClassHierarchy, Scope, TypeMap};
pub use methods::{MethodId, MethodTable};
pub use node::{Metadata, Node};
pub use revision::{RevisionCallGraph, RevisionConfig, UNKNOWN_TIMESTAMP};
pub use types::{Access, Type};
pub use uri::EntityUri;
