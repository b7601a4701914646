//! Scope-partitioned class hierarchy.
//!
//! Types live in exactly one of three scopes. Inserting a URI into one scope
//! removes it from the other two, so the partition holds after every mutation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{CallGraphError, CallGraphResult};
use crate::domain::types::Type;
use crate::domain::uri::EntityUri;

/// Resolution scope of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Defined by the artifact itself; ids are authoritative.
    InternalTypes,
    /// Referenced but defined in a dependency; placeholder.
    ExternalTypes,
    /// Formerly external, matched to a dependency's internal type while stitching.
    ResolvedTypes,
}

impl Scope {
    /// Iteration order used wherever scopes are walked in sequence.
    pub const ALL: [Scope; 3] = [Scope::InternalTypes, Scope::ExternalTypes, Scope::ResolvedTypes];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::InternalTypes => "internalTypes",
            Scope::ExternalTypes => "externalTypes",
            Scope::ResolvedTypes => "resolvedTypes",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CallGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internalTypes" => Ok(Scope::InternalTypes),
            "externalTypes" => Ok(Scope::ExternalTypes),
            "resolvedTypes" => Ok(Scope::ResolvedTypes),
            other => Err(CallGraphError::UnknownScope(other.to_string())),
        }
    }
}

pub type TypeMap = BTreeMap<EntityUri, Type>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassHierarchy {
    internal_types: TypeMap,
    external_types: TypeMap,
    resolved_types: TypeMap,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from three maps, checking that no URI appears in two scopes.
    pub fn from_scopes(
        internal_types: TypeMap,
        external_types: TypeMap,
        resolved_types: TypeMap,
    ) -> CallGraphResult<Self> {
        let cha = Self {
            internal_types,
            external_types,
            resolved_types,
        };
        for (scope, types) in cha.iter() {
            for uri in types.keys() {
                for other in Scope::ALL.iter().filter(|s| **s > scope) {
                    if cha.get(*other).contains_key(uri) {
                        return Err(CallGraphError::ScopeConflict {
                            uri: uri.to_string(),
                            first: scope,
                            second: *other,
                        });
                    }
                }
            }
        }
        Ok(cha)
    }

    pub fn get(&self, scope: Scope) -> &TypeMap {
        match scope {
            Scope::InternalTypes => &self.internal_types,
            Scope::ExternalTypes => &self.external_types,
            Scope::ResolvedTypes => &self.resolved_types,
        }
    }

    fn get_mut(&mut self, scope: Scope) -> &mut TypeMap {
        match scope {
            Scope::InternalTypes => &mut self.internal_types,
            Scope::ExternalTypes => &mut self.external_types,
            Scope::ResolvedTypes => &mut self.resolved_types,
        }
    }

    /// Insert a type into `scope`, evicting the URI from any other scope.
    /// Returns the type previously held under this URI, whatever its scope.
    pub fn insert(&mut self, scope: Scope, uri: EntityUri, ty: Type) -> Option<Type> {
        let previous = Scope::ALL
            .iter()
            .filter(|s| **s != scope)
            .find_map(|s| self.get_mut(*s).remove(&uri));
        let replaced = self.get_mut(scope).insert(uri, ty);
        replaced.or(previous)
    }

    pub fn remove(&mut self, scope: Scope, uri: &EntityUri) -> Option<Type> {
        self.get_mut(scope).remove(uri)
    }

    /// Move a type from one scope to another.
    pub fn move_type(&mut self, uri: &EntityUri, from: Scope, to: Scope) -> CallGraphResult<()> {
        let ty = self
            .get_mut(from)
            .remove(uri)
            .ok_or_else(|| CallGraphError::TypeNotFound {
                uri: uri.to_string(),
                scope: from,
            })?;
        self.get_mut(to).insert(uri.clone(), ty);
        Ok(())
    }

    /// Mutable access to one type without exposing the scope maps.
    pub fn type_mut(&mut self, scope: Scope, uri: &EntityUri) -> Option<&mut Type> {
        self.get_mut(scope).get_mut(uri)
    }

    pub fn scope_of(&self, uri: &EntityUri) -> Option<Scope> {
        Scope::ALL
            .into_iter()
            .find(|scope| self.get(*scope).contains_key(uri))
    }

    /// Scopes with their type maps, in `Scope::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Scope, &TypeMap)> {
        Scope::ALL.into_iter().map(move |scope| (scope, self.get(scope)))
    }

    pub fn type_count(&self) -> usize {
        self.iter().map(|(_, types)| types.len()).sum()
    }

    pub fn method_count(&self) -> usize {
        self.iter()
            .flat_map(|(_, types)| types.values())
            .map(|ty| ty.methods().len())
            .sum()
    }
}
