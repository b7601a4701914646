use revcg::domain::{
    Access, CallScope, ClassHierarchy, DecodeWarning, EntityUri, Graph, Metadata, MethodTable, Node,
    RevisionCallGraph, RevisionConfig, Scope, Type, UNKNOWN_TIMESTAMP,
};
use serde_json::json;

fn virtual_call() -> Metadata {
    let mut m = Metadata::new();
    m.insert("type".to_string(), json!("virtual"));
    m
}

/// mvn org.example:lib 1.0.0 with one internal method and one external call.
fn scenario(timestamp: Option<i64>) -> RevisionCallGraph {
    let mut lib = Type::empty("Lib.java");
    let id = lib.add_method(Node::parse("/org/example/Lib.foo()%2Fjava.lang%2FVoid").unwrap(), 0);
    assert_eq!(id, 0);

    let mut cha = ClassHierarchy::new();
    cha.insert(Scope::InternalTypes, EntityUri::parse("/org/example/Lib").unwrap(), lib);

    let mut graph = Graph::new();
    graph.add_external_call(0, 100, 5, virtual_call());

    RevisionConfig {
        forge: "mvn".to_string(),
        product: "org.example:lib".to_string(),
        version: "1.0.0".to_string(),
        cg_generator: "testgen-1.0".to_string(),
        timestamp,
        node_count: 1,
        class_hierarchy: cha,
        graph,
    }
    .build()
    .unwrap()
}

#[test]
fn scenario_encodes_to_the_wire_format() {
    let value = scenario(Some(1_574_072_773)).to_json().unwrap();

    assert_eq!(value["forge"], json!("mvn"));
    assert_eq!(value["product"], json!("org.example:lib"));
    assert_eq!(value["version"], json!("1.0.0"));
    assert_eq!(value["generator"], json!("testgen-1.0"));
    assert_eq!(value["timestamp"], json!(1_574_072_773));
    assert_eq!(value["nodes"], json!(1));
    assert_eq!(
        value["cha"]["internalTypes"]["/org/example/Lib"]["methods"]["0"]["uri"],
        json!("/org/example/Lib.foo()%2Fjava.lang%2FVoid")
    );
    assert_eq!(
        value["graph"]["externalCalls"],
        json!([["0", "100", { "5": { "type": "virtual" } }]])
    );
    assert_eq!(value["graph"]["internalCalls"], json!([]));
}

#[test]
fn scenario_round_trips() {
    let original = scenario(Some(1_574_072_773));
    let decoded = RevisionCallGraph::from_json_str(&original.to_json_string().unwrap()).unwrap();

    assert!(!decoded.has_warnings());
    let back = decoded.into_value();
    assert_eq!(back, original);
    assert_eq!(back.uri().as_str(), "fasten://mvn!org.example:lib$1.0.0");
    assert_eq!(back.forgeless_uri().as_str(), "fasten://org.example:lib$1.0.0");
    assert_eq!(back.graph().external_calls().len(), 1);
    assert_eq!(back.graph().calls(CallScope::External)[&(0, 100)][&5], virtual_call());

    let internal = back.class_hierarchy().get(Scope::InternalTypes);
    assert_eq!(internal.len(), 1);
    assert_eq!(internal[&EntityUri::parse("/org/example/Lib").unwrap()].methods().len(), 1);
}

#[test]
fn unknown_timestamp_is_omitted_and_warned() {
    let original = scenario(None);
    let value = original.to_json().unwrap();
    assert!(value.get("timestamp").is_none());

    let decoded = RevisionCallGraph::from_json(value).unwrap();
    assert_eq!(decoded.warnings, vec![DecodeWarning::MissingTimestamp]);
    assert_eq!(decoded.value.timestamp(), UNKNOWN_TIMESTAMP);
    assert_eq!(decoded.value, original);
}

#[test]
fn stitching_moves_types_and_edges() {
    let mut rcg = scenario(Some(0));
    let dep = EntityUri::parse("/dep/Util").unwrap();
    let mut util = Type::empty("");
    util.add_method(Node::parse("/dep/Util.help()V").unwrap(), 100);
    rcg.class_hierarchy_mut().insert(Scope::ExternalTypes, dep.clone(), util);

    rcg.class_hierarchy_mut()
        .move_type(&dep, Scope::ExternalTypes, Scope::ResolvedTypes)
        .unwrap();
    assert!(rcg.graph_mut().move_call((0, 100), CallScope::External, CallScope::Resolved));

    assert_eq!(rcg.class_hierarchy().scope_of(&dep), Some(Scope::ResolvedTypes));
    assert!(rcg.validate().is_ok());

    let back = RevisionCallGraph::from_json_str(&rcg.to_json_string().unwrap())
        .unwrap()
        .into_value();
    assert_eq!(back, rcg);
    assert_eq!(back.graph().size(), 0);
    assert!(!back.is_call_graph_empty());
}

#[test]
fn missing_generator_fails_with_path() {
    let mut value = scenario(Some(0)).to_json().unwrap();
    value.as_object_mut().unwrap().remove("generator");
    let err = RevisionCallGraph::from_json(value).unwrap_err();
    assert!(err.to_string().contains("generator"), "{}", err);
}

#[test]
fn type_modifiers_and_supertype_order_round_trip() {
    let uris = |raw: &[&str]| -> Vec<EntityUri> { raw.iter().map(|u| EntityUri::parse(u).unwrap()).collect() };

    let mut metadata = Metadata::new();
    metadata.insert("first".to_string(), json!(12));
    metadata.insert("last".to_string(), json!(40));
    metadata.insert("defined".to_string(), json!(true));
    let mut methods = MethodTable::new();
    methods.insert(Node::new(EntityUri::parse("/ns/Impl.run()V").unwrap(), metadata.clone()), 3);

    let ty = Type::new(
        "Impl.java",
        methods,
        uris(&["/ns/Base", "/java.lang/Object"]),
        uris(&["/java.lang/Runnable", "/java.io/Closeable"]),
        Access::Protected,
        true,
    );
    let mut cha = ClassHierarchy::new();
    let impl_uri = EntityUri::parse("/ns/Impl").unwrap();
    cha.insert(Scope::InternalTypes, impl_uri.clone(), ty);

    let original = RevisionConfig {
        forge: "mvn".to_string(),
        product: "org.example:impl".to_string(),
        version: "0.3.1".to_string(),
        cg_generator: "testgen-1.0".to_string(),
        timestamp: Some(5),
        node_count: 1,
        class_hierarchy: cha,
        graph: Graph::new(),
    }
    .build()
    .unwrap();

    let value = original.to_json().unwrap();
    let wire = &value["cha"]["internalTypes"]["/ns/Impl"];
    assert_eq!(wire["superClasses"], json!(["/ns/Base", "/java.lang/Object"]));
    assert_eq!(wire["superInterfaces"], json!(["/java.lang/Runnable", "/java.io/Closeable"]));
    assert_eq!(wire["access"], json!("protected"));
    assert_eq!(wire["final"], json!(true));

    let back = RevisionCallGraph::from_json(value).unwrap().into_value();
    assert_eq!(back, original);

    let ty = &back.class_hierarchy().get(Scope::InternalTypes)[&impl_uri];
    assert_eq!(ty.super_classes(), uris(&["/ns/Base", "/java.lang/Object"]).as_slice());
    assert_eq!(ty.super_interfaces(), uris(&["/java.lang/Runnable", "/java.io/Closeable"]).as_slice());
    assert_eq!(ty.access(), Access::Protected);
    assert!(ty.is_final());
    assert_eq!(ty.methods().get(3).unwrap().metadata(), &metadata);
}
