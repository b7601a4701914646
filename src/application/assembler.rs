/// Revision assembler.
/// Turns analyzer facts (types, methods, call sites) into a RevisionCallGraph,
/// assigning method ids from a single per-artifact counter.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::callgraph::{CallPair, CallScope, CallSiteId, Graph};
use crate::domain::hierarchy::{ClassHierarchy, Scope};
use crate::domain::methods::MethodId;
use crate::domain::node::{Metadata, Node};
use crate::domain::revision::{RevisionCallGraph, RevisionConfig};
use crate::domain::types::{Access, Type};
use crate::domain::uri::EntityUri;

/// A class or interface defined by the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeFact {
    pub uri: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub super_classes: Vec<String>,
    #[serde(default)]
    pub super_interfaces: Vec<String>,
    #[serde(default)]
    pub access: String,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// A method defined by the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodFact {
    pub uri: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One call site: `caller` invokes `callee` at `call_site` with dispatch `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFact {
    pub caller: String,
    pub callee: String,
    pub call_site: CallSiteId,
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Everything an analyzer reports for one artifact revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionFacts {
    pub forge: String,
    pub product: String,
    pub version: String,
    pub generator: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub types: Vec<TypeFact>,
    #[serde(default)]
    pub methods: Vec<MethodFact>,
    #[serde(default)]
    pub calls: Vec<CallFact>,
}

#[derive(Debug, Default)]
pub struct RevisionAssembler {
    next_id: MethodId,
    cha: ClassHierarchy,
    graph: Graph,
}

impl RevisionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a revision call graph from a complete set of facts.
    pub fn assemble(facts: RevisionFacts) -> Result<RevisionCallGraph> {
        let mut assembler = Self::new();
        for ty in &facts.types {
            assembler.add_type(ty)?;
        }
        for method in &facts.methods {
            assembler.add_method(method)?;
        }
        for call in &facts.calls {
            assembler.add_call(call)?;
        }
        assembler.finish(RevisionConfig {
            forge: facts.forge,
            product: facts.product,
            version: facts.version,
            cg_generator: facts.generator,
            timestamp: facts.timestamp,
            ..Default::default()
        })
    }

    /// Declare an internal type. Declaring it again replaces its modifiers and
    /// supertypes but keeps the methods already registered. A type first seen
    /// as an external callee becomes internal together with the calls into it.
    pub fn add_type(&mut self, fact: &TypeFact) -> Result<()> {
        let uri = EntityUri::parse(&fact.uri)?;
        let super_classes = parse_all(&fact.super_classes)
            .with_context(|| format!("Bad super class of {}", fact.uri))?;
        let super_interfaces = parse_all(&fact.super_interfaces)
            .with_context(|| format!("Bad super interface of {}", fact.uri))?;
        let access: Access = fact.access.parse()?;

        self.promote(&uri)?;
        let methods = self
            .cha
            .remove(Scope::InternalTypes, &uri)
            .map(|ty| ty.methods().clone())
            .unwrap_or_default();
        let ty = Type::new(
            fact.source_file.clone(),
            methods,
            super_classes,
            super_interfaces,
            access,
            fact.is_final,
        );
        self.cha.insert(Scope::InternalTypes, uri, ty);
        Ok(())
    }

    /// Register an internal method and return its id. Registering the same URI
    /// twice returns the first id.
    pub fn add_method(&mut self, fact: &MethodFact) -> Result<MethodId> {
        let node = Node::new(EntityUri::parse(&fact.uri)?, fact.metadata.clone());
        self.register(Scope::InternalTypes, node)
    }

    /// Record a call site. The caller must be an internal method; the callee
    /// is internal if its type is declared, external otherwise.
    pub fn add_call(&mut self, fact: &CallFact) -> Result<()> {
        let caller_uri = EntityUri::parse(&fact.caller)?;
        let caller = match self.find(Scope::InternalTypes, &caller_uri)? {
            Some(id) => id,
            None => bail!("Caller is not an internal method: {}", fact.caller),
        };

        let callee = Node::parse(&fact.callee)?;
        let callee_type = callee.type_uri()?;
        let scope = match self.cha.scope_of(&callee_type) {
            Some(Scope::InternalTypes) => CallScope::Internal,
            _ => CallScope::External,
        };
        let callee_id = match scope {
            CallScope::Internal => self.register(Scope::InternalTypes, callee)?,
            _ => self.register(Scope::ExternalTypes, callee)?,
        };

        let mut metadata = fact.metadata.clone();
        metadata.insert("type".to_string(), Value::String(fact.kind.clone()));
        self.graph.add_call(scope, caller, callee_id, fact.call_site, metadata);
        Ok(())
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> usize {
        self.next_id as usize
    }

    pub fn finish(self, config: RevisionConfig) -> Result<RevisionCallGraph> {
        let node_count = self.node_count();
        let rcg = RevisionConfig {
            node_count,
            class_hierarchy: self.cha,
            graph: self.graph,
            ..config
        }
        .build()
        .context("Failed to build revision call graph")?;

        tracing::debug!(
            uri = %rcg.uri(),
            nodes = node_count,
            calls = rcg.graph().size(),
            "assembled revision"
        );
        Ok(rcg)
    }

    fn find(&self, scope: Scope, method: &EntityUri) -> Result<Option<MethodId>> {
        let type_uri = Node::new(method.clone(), Metadata::new()).type_uri()?;
        Ok(self
            .cha
            .get(scope)
            .get(&type_uri)
            .and_then(|ty| ty.methods().id_of(method)))
    }

    fn register(&mut self, scope: Scope, node: Node) -> Result<MethodId> {
        let type_uri = node.type_uri()?;
        match self.cha.scope_of(&type_uri) {
            None => {
                if scope == Scope::InternalTypes {
                    tracing::debug!(type_uri = %type_uri, "implicitly declaring internal type");
                }
                self.cha.insert(scope, type_uri.clone(), Type::empty(""));
            }
            // A type first seen as a callee turns out to be defined here.
            Some(existing) if existing != scope && scope == Scope::InternalTypes => {
                self.promote(&type_uri)?;
            }
            Some(_) => {}
        }
        let ty = match self.cha.type_mut(scope, &type_uri) {
            Some(ty) => ty,
            None => bail!("Type {} is not in {}", type_uri, scope),
        };
        let id = ty.add_method(node, self.next_id);
        if id == self.next_id {
            self.next_id += 1;
        }
        Ok(id)
    }
}

impl RevisionAssembler {
    /// Move a non-internal type into `internalTypes` and turn the external
    /// calls into its methods into internal calls.
    fn promote(&mut self, type_uri: &EntityUri) -> Result<()> {
        let from = match self.cha.scope_of(type_uri) {
            Some(scope) if scope != Scope::InternalTypes => scope,
            _ => return Ok(()),
        };
        self.cha.move_type(type_uri, from, Scope::InternalTypes)?;

        let ids: HashSet<MethodId> = self
            .cha
            .get(Scope::InternalTypes)
            .get(type_uri)
            .map(|ty| ty.methods().ids().collect())
            .unwrap_or_default();
        let moved: Vec<CallPair> = self
            .graph
            .external_calls()
            .keys()
            .filter(|(_, callee)| ids.contains(callee))
            .copied()
            .collect();
        for pair in &moved {
            self.graph.move_call(*pair, CallScope::External, CallScope::Internal);
        }

        tracing::debug!(type_uri = %type_uri, calls = moved.len(), "promoted type to internal");
        Ok(())
    }
}

fn parse_all(raw: &[String]) -> Result<Vec<EntityUri>> {
    raw.iter()
        .map(|s| EntityUri::parse(s).map_err(anyhow::Error::from))
        .collect()
}
