// Method nodes of a revision call graph.
// A node is a method URI plus opaque analyzer metadata (offsets, flags, ...).

use serde_json::{Map, Value};

use crate::domain::error::{CallGraphError, CallGraphResult};
use crate::domain::uri::EntityUri;

/// Metadata attached to a node or a call site; carried through untouched.
pub type Metadata = Map<String, Value>;

/// A callable method.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    uri: EntityUri,
    metadata: Metadata,
}

impl Node {
    pub fn new(uri: EntityUri, metadata: Metadata) -> Self {
        Self { uri, metadata }
    }

    /// Parse `uri` and build a node with empty metadata.
    pub fn parse(uri: &str) -> CallGraphResult<Self> {
        Ok(Self::new(EntityUri::parse(uri)?, Metadata::new()))
    }

    pub fn uri(&self) -> &EntityUri {
        &self.uri
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Entity part of the URI, e.g. `Lib.foo()%2Fjava.lang%2FVoid`.
    pub fn entity(&self) -> &str {
        self.uri.entity().unwrap_or_default()
    }

    /// Class part of the entity: everything up to the first `.`.
    pub fn class_name(&self) -> &str {
        let entity = self.entity();
        match entity.find('.') {
            Some(dot) => &entity[..dot],
            None => entity,
        }
    }

    /// Method part of the entity: between `ClassName.` and `(`.
    pub fn method_name(&self) -> &str {
        let entity = self.entity();
        let start = match entity.find('.') {
            Some(dot) => dot + 1,
            None => return "",
        };
        match entity[start..].find('(') {
            Some(paren) => &entity[start..start + paren],
            None => "",
        }
    }

    /// URI of the type declaring this method: `prefix/namespace/ClassName`.
    pub fn type_uri(&self) -> CallGraphResult<EntityUri> {
        let namespace = self.uri.namespace().ok_or_else(|| {
            CallGraphError::malformed_uri(self.uri.as_str(), "method URI has no namespace")
        })?;
        let class_name = self.class_name();
        if class_name.is_empty() {
            return Err(CallGraphError::malformed_uri(
                self.uri.as_str(),
                "method URI has no class name",
            ));
        }
        EntityUri::parse(&format!("{}/{}/{}", self.uri.prefix(), namespace, class_name))
    }

    /// Rename the class and the method inside the URI.
    pub fn change_name(&self, class_name: &str, method_name: &str) -> CallGraphResult<EntityUri> {
        let renamed_class = self.uri.as_str().replacen(
            &format!("/{}.", self.class_name()),
            &format!("/{}.", class_name),
            1,
        );
        let renamed = renamed_class.replacen(
            &format!(".{}(", self.method_name()),
            &format!(".{}(", method_name),
            1,
        );
        EntityUri::parse(&renamed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn foo() -> Node {
        Node::parse("/org.example/Lib.foo(%2Fjava.lang%2FString)%2Fjava.lang%2FVoid").unwrap()
    }

    #[test]
    fn test_entity_parts() {
        let node = foo();
        assert_eq!(node.entity(), "Lib.foo(%2Fjava.lang%2FString)%2Fjava.lang%2FVoid");
        assert_eq!(node.class_name(), "Lib");
        assert_eq!(node.method_name(), "foo");
        assert_eq!(node.type_uri().unwrap().as_str(), "/org.example/Lib");
    }

    #[test]
    fn test_type_uri_keeps_authority() {
        let node = Node::parse("//jdk/java.lang/Object.hashCode()%2Fjava.lang%2FIntegerType").unwrap();
        assert_eq!(node.type_uri().unwrap().as_str(), "//jdk/java.lang/Object");
    }

    #[test]
    fn test_change_name() {
        let renamed = foo().change_name("Other", "bar").unwrap();
        assert_eq!(
            renamed.as_str(),
            "/org.example/Other.bar(%2Fjava.lang%2FString)%2Fjava.lang%2FVoid"
        );
    }

    #[test]
    fn test_metadata_is_carried() {
        let mut metadata = Metadata::new();
        metadata.insert("first".to_string(), json!(12));
        metadata.insert("access".to_string(), json!("public"));
        let node = Node::new(foo().uri().clone(), metadata.clone());
        assert_eq!(node.metadata(), &metadata);
        assert_ne!(node, foo());
    }
}
