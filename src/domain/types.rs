//! Types (classes and interfaces) of a revision.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::CallGraphError;
use crate::domain::methods::{MethodId, MethodTable};
use crate::domain::node::Node;
use crate::domain::uri::EntityUri;

/// Access modifier of a type. `Default` is package-private and is written as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    Public,
    Private,
    Protected,
    #[default]
    Default,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Default => "",
        }
    }
}

impl FromStr for Access {
    type Err = CallGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Access::Public),
            "private" => Ok(Access::Private),
            "protected" => Ok(Access::Protected),
            "" => Ok(Access::Default),
            other => Err(CallGraphError::UnknownAccess(other.to_string())),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class or an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    source_file_name: String,
    methods: MethodTable,
    /// Most-derived first; the order is the linearization order.
    super_classes: Vec<EntityUri>,
    super_interfaces: Vec<EntityUri>,
    access: Access,
    is_final: bool,
}

impl Type {
    pub fn new(
        source_file_name: impl Into<String>,
        methods: MethodTable,
        super_classes: Vec<EntityUri>,
        super_interfaces: Vec<EntityUri>,
        access: Access,
        is_final: bool,
    ) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            methods,
            super_classes,
            super_interfaces,
            access,
            is_final,
        }
    }

    /// An empty, non-final, package-private type.
    pub fn empty(source_file_name: impl Into<String>) -> Self {
        Self::new(
            source_file_name,
            MethodTable::new(),
            Vec::new(),
            Vec::new(),
            Access::Default,
            false,
        )
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn super_classes(&self) -> &[EntityUri] {
        &self.super_classes
    }

    pub fn super_interfaces(&self) -> &[EntityUri] {
        &self.super_interfaces
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Add a method, returning its id. If a method with the same URI is already
    /// present its id is returned instead of `candidate`.
    pub fn add_method(&mut self, node: Node, candidate: MethodId) -> MethodId {
        self.methods.insert(node, candidate)
    }

    /// First method (lowest id) whose entity contains `signature`.
    pub fn get_defined(&self, signature: &str) -> Option<(MethodId, &Node)> {
        self.methods
            .iter()
            .find(|(_, node)| node.entity().contains(signature))
    }

    /// Every method whose entity contains `signature`, in id order.
    pub fn defined_all(&self, signature: &str) -> Vec<(MethodId, &Node)> {
        self.methods
            .iter()
            .filter(|(_, node)| node.entity().contains(signature))
            .collect()
    }
}
