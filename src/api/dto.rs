//! JSON wire format of a revision call graph.
//!
//! ```json
//! {
//!   "forge": "mvn", "product": "org.example:lib", "version": "1.0.0",
//!   "generator": "testgen-1.0", "timestamp": 1574072773, "nodes": 1,
//!   "cha": { "internalTypes": { "/org/example/Lib": {
//!              "sourceFile": "Lib.java",
//!              "methods": { "0": { "uri": "/org/example/Lib.foo()%2Fjava.lang%2FVoid", "metadata": {} } },
//!              "superClasses": [], "superInterfaces": [], "access": "public", "final": false } },
//!            "externalTypes": {}, "resolvedTypes": {} },
//!   "graph": { "internalCalls": [], "externalCalls": [["0", "100", { "5": { "type": "virtual" } }]],
//!              "resolvedCalls": [] }
//! }
//! ```
//!
//! Every DTO field is optional at the serde level so that an absent key becomes
//! a typed `MissingField` error naming the full path, rather than a bare serde
//! message. `timestamp` is the only key that may be absent; it is omitted on
//! encode when unknown and defaults to `-1` on decode with a warning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::callgraph::{CallMap, CallScope, CallSites, Graph};
use crate::domain::error::{CallGraphError, CallGraphResult, DecodeWarning, Decoded};
use crate::domain::hierarchy::{ClassHierarchy, Scope, TypeMap};
use crate::domain::methods::{MethodId, MethodTable};
use crate::domain::node::{Metadata, Node};
use crate::domain::revision::{RevisionCallGraph, UNKNOWN_TIMESTAMP};
use crate::domain::types::{Access, Type};
use crate::domain::uri::EntityUri;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RevisionDto {
    pub forge: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    pub cha: Option<ChaDto>,
    pub graph: Option<GraphDto>,
    pub nodes: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaDto {
    pub internal_types: Option<BTreeMap<String, TypeDto>>,
    pub external_types: Option<BTreeMap<String, TypeDto>>,
    pub resolved_types: Option<BTreeMap<String, TypeDto>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDto {
    pub source_file: Option<String>,
    pub methods: Option<BTreeMap<String, NodeDto>>,
    pub super_classes: Option<Vec<String>>,
    pub super_interfaces: Option<Vec<String>>,
    pub access: Option<String>,
    #[serde(rename = "final")]
    pub is_final: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NodeDto {
    pub uri: Option<String>,
    pub metadata: Option<Metadata>,
}

/// `[callerId, calleeId, {callSiteId: metadata}]`
pub type CallDto = (String, String, BTreeMap<String, Metadata>);

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDto {
    pub internal_calls: Option<Vec<CallDto>>,
    pub external_calls: Option<Vec<CallDto>>,
    pub resolved_calls: Option<Vec<CallDto>>,
}

// ─────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────

impl From<&RevisionCallGraph> for RevisionDto {
    fn from(rcg: &RevisionCallGraph) -> Self {
        RevisionDto {
            forge: Some(rcg.forge().to_string()),
            product: Some(rcg.product().to_string()),
            version: Some(rcg.version().to_string()),
            generator: Some(rcg.cg_generator().to_string()),
            timestamp: rcg.known_timestamp().map(Value::from),
            cha: Some(ChaDto::from(rcg.class_hierarchy())),
            graph: Some(GraphDto::from(rcg.graph())),
            nodes: Some(rcg.node_count()),
        }
    }
}

impl From<&ClassHierarchy> for ChaDto {
    fn from(cha: &ClassHierarchy) -> Self {
        let encode = |scope: Scope| -> Option<BTreeMap<String, TypeDto>> {
            Some(
                cha.get(scope)
                    .iter()
                    .map(|(uri, ty)| (uri.to_string(), TypeDto::from(ty)))
                    .collect(),
            )
        };
        ChaDto {
            internal_types: encode(Scope::InternalTypes),
            external_types: encode(Scope::ExternalTypes),
            resolved_types: encode(Scope::ResolvedTypes),
        }
    }
}

impl From<&Type> for TypeDto {
    fn from(ty: &Type) -> Self {
        TypeDto {
            source_file: Some(ty.source_file_name().to_string()),
            methods: Some(
                ty.methods()
                    .iter()
                    .map(|(id, node)| {
                        let dto = NodeDto {
                            uri: Some(node.uri().to_string()),
                            metadata: Some(node.metadata().clone()),
                        };
                        (id.to_string(), dto)
                    })
                    .collect(),
            ),
            super_classes: Some(ty.super_classes().iter().map(|u| u.to_string()).collect()),
            super_interfaces: Some(ty.super_interfaces().iter().map(|u| u.to_string()).collect()),
            access: Some(ty.access().as_str().to_string()),
            is_final: Some(ty.is_final()),
        }
    }
}

impl From<&Graph> for GraphDto {
    fn from(graph: &Graph) -> Self {
        let encode = |scope: CallScope| -> Option<Vec<CallDto>> {
            Some(
                graph
                    .calls(scope)
                    .iter()
                    .map(|((caller, callee), sites)| {
                        let sites = sites
                            .iter()
                            .map(|(site, metadata)| (site.to_string(), metadata.clone()))
                            .collect();
                        (caller.to_string(), callee.to_string(), sites)
                    })
                    .collect(),
            )
        };
        GraphDto {
            internal_calls: encode(CallScope::Internal),
            external_calls: encode(CallScope::External),
            resolved_calls: encode(CallScope::Resolved),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────

fn required<T>(value: Option<T>, path: &str) -> CallGraphResult<T> {
    value.ok_or_else(|| CallGraphError::MissingField(path.to_string()))
}

fn parse_id(raw: &str, field: &str) -> CallGraphResult<i64> {
    raw.parse::<i64>().map_err(|_| CallGraphError::InvalidId {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

impl TryFrom<RevisionDto> for Decoded<RevisionCallGraph> {
    type Error = CallGraphError;

    fn try_from(dto: RevisionDto) -> Result<Self, Self::Error> {
        let forge = required(dto.forge, "forge")?;
        let product = required(dto.product, "product")?;
        let version = required(dto.version, "version")?;
        let generator = required(dto.generator, "generator")?;
        let cha = decode_cha(required(dto.cha, "cha")?)?;
        let graph = decode_graph(required(dto.graph, "graph")?)?;
        let nodes = required(dto.nodes, "nodes")?;

        let mut warnings = Vec::new();
        let timestamp = match dto.timestamp {
            None | Some(Value::Null) => {
                warnings.push(DecodeWarning::MissingTimestamp);
                UNKNOWN_TIMESTAMP
            }
            Some(raw) => match raw.as_i64() {
                Some(ts) => ts,
                None => {
                    warnings.push(DecodeWarning::InvalidTimestamp(raw.to_string()));
                    UNKNOWN_TIMESTAMP
                }
            },
        };

        let rcg = RevisionCallGraph::new(forge, product, version, timestamp, nodes, generator, cha, graph)?;
        Ok(Decoded::new(rcg, warnings))
    }
}

fn decode_cha(dto: ChaDto) -> CallGraphResult<ClassHierarchy> {
    let internal = decode_types(required(dto.internal_types, "cha.internalTypes")?, Scope::InternalTypes)?;
    let external = decode_types(required(dto.external_types, "cha.externalTypes")?, Scope::ExternalTypes)?;
    let resolved = decode_types(required(dto.resolved_types, "cha.resolvedTypes")?, Scope::ResolvedTypes)?;
    ClassHierarchy::from_scopes(internal, external, resolved)
}

fn decode_types(types: BTreeMap<String, TypeDto>, scope: Scope) -> CallGraphResult<TypeMap> {
    types
        .into_iter()
        .map(|(uri, dto)| -> CallGraphResult<(EntityUri, Type)> {
            let path = format!("cha.{}[{}]", scope, uri);
            Ok((EntityUri::parse(&uri)?, decode_type(dto, &path)?))
        })
        .collect()
}

fn decode_type(dto: TypeDto, path: &str) -> CallGraphResult<Type> {
    let field = |name: &str| format!("{}.{}", path, name);

    let source_file = required(dto.source_file, &field("sourceFile"))?;
    let mut methods = MethodTable::new();
    for (raw_id, node) in required(dto.methods, &field("methods"))? {
        let node_path = format!("{}.methods[{}]", path, raw_id);
        let id: MethodId = parse_id(&raw_id, &field("methods"))?;
        let uri = EntityUri::parse(&required(node.uri, &format!("{}.uri", node_path))?)?;
        let metadata = required(node.metadata, &format!("{}.metadata", node_path))?;
        // "7" and "07" name the same id.
        if methods.contains_uri(&uri) || methods.contains_id(id) {
            return Err(CallGraphError::DuplicateMethod {
                path: node_path,
                uri: uri.to_string(),
            });
        }
        methods.insert(Node::new(uri, metadata), id);
    }
    let super_classes = parse_uris(required(dto.super_classes, &field("superClasses"))?)?;
    let super_interfaces = parse_uris(required(dto.super_interfaces, &field("superInterfaces"))?)?;
    let access: Access = required(dto.access, &field("access"))?.parse()?;
    let is_final = required(dto.is_final, &field("final"))?;

    Ok(Type::new(source_file, methods, super_classes, super_interfaces, access, is_final))
}

fn parse_uris(raw: Vec<String>) -> CallGraphResult<Vec<EntityUri>> {
    raw.iter().map(|s| EntityUri::parse(s)).collect()
}

fn decode_graph(dto: GraphDto) -> CallGraphResult<Graph> {
    let internal = decode_calls(required(dto.internal_calls, "graph.internalCalls")?, CallScope::Internal)?;
    let external = decode_calls(required(dto.external_calls, "graph.externalCalls")?, CallScope::External)?;
    let resolved = decode_calls(required(dto.resolved_calls, "graph.resolvedCalls")?, CallScope::Resolved)?;
    Ok(Graph::from_calls(internal, external, resolved))
}

fn decode_calls(calls: Vec<CallDto>, scope: CallScope) -> CallGraphResult<CallMap> {
    let field = format!("graph.{}", scope);
    let mut graph = Graph::new();
    for (caller, callee, sites) in calls {
        let caller = parse_id(&caller, &field)?;
        let callee = parse_id(&callee, &field)?;
        let sites = sites
            .into_iter()
            .map(|(site, metadata)| -> CallGraphResult<_> { Ok((parse_id(&site, &field)?, metadata)) })
            .collect::<CallGraphResult<CallSites>>()?;
        // A pair repeated in the array accumulates like repeated add_call.
        graph.add_call_sites(scope, (caller, callee), sites);
    }
    Ok(graph.calls(scope).clone())
}

// ─────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────

impl RevisionCallGraph {
    pub fn to_dto(&self) -> RevisionDto {
        RevisionDto::from(self)
    }

    pub fn to_json(&self) -> CallGraphResult<Value> {
        Ok(serde_json::to_value(self.to_dto())?)
    }

    pub fn to_json_string(&self) -> CallGraphResult<String> {
        Ok(serde_json::to_string(&self.to_dto())?)
    }

    pub fn to_json_string_pretty(&self) -> CallGraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_dto())?)
    }

    pub fn from_dto(dto: RevisionDto) -> CallGraphResult<Decoded<Self>> {
        Decoded::try_from(dto)
    }

    pub fn from_json(value: Value) -> CallGraphResult<Decoded<Self>> {
        Self::from_dto(serde_json::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> CallGraphResult<Decoded<Self>> {
        Self::from_dto(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> CallGraphResult<Decoded<Self>> {
        Self::from_dto(serde_json::from_slice(bytes)?)
    }
}
