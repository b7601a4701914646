use std::path::Path;
use std::process::Command;

use revcg::application::assembler::{RevisionAssembler, RevisionFacts};
use revcg::application::{AssembleUsecase, StoreUsecase};
use revcg::domain::{RevisionCallGraph, Scope};
use revcg::infrastructure::loader;
use revcg::infrastructure::store::DiskRevisionStore;
use revcg::infrastructure::JsonExporter;
use revcg::ports::RevisionStore;
use tempfile::tempdir;

const FACTS: &str = r#"{
    "forge": "mvn",
    "product": "org.example:app",
    "version": "2.1.0",
    "generator": "testgen-1.0",
    "timestamp": 1574072773,
    "types": [
        { "uri": "/org.example/App", "sourceFile": "App.java", "access": "public", "final": true },
        { "uri": "/org.example/Helper", "sourceFile": "Helper.java" }
    ],
    "methods": [
        { "uri": "/org.example/App.main(%2Fjava.lang%2FString%5B%5D)%2Fjava.lang%2FVoid" },
        { "uri": "/org.example/Helper.run()%2Fjava.lang%2FVoid" }
    ],
    "calls": [
        { "caller": "/org.example/App.main(%2Fjava.lang%2FString%5B%5D)%2Fjava.lang%2FVoid",
          "callee": "/org.example/Helper.run()%2Fjava.lang%2FVoid", "callSite": 3, "kind": "static" },
        { "caller": "/org.example/Helper.run()%2Fjava.lang%2FVoid",
          "callee": "/java.io/PrintStream.println()%2Fjava.lang%2FVoid", "callSite": 8, "kind": "virtual" }
    ]
}"#;

fn write_facts(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("facts.json");
    loader::write_string(&path, FACTS).unwrap();
    path
}

#[test]
fn assembled_revision_is_consistent() {
    let facts: RevisionFacts = serde_json::from_str(FACTS).unwrap();
    let rcg = RevisionAssembler::assemble(facts).unwrap();

    assert_eq!(rcg.uri().as_str(), "fasten://mvn!org.example:app$2.1.0");
    assert_eq!(rcg.class_hierarchy().get(Scope::InternalTypes).len(), 2);
    assert_eq!(rcg.class_hierarchy().get(Scope::ExternalTypes).len(), 1);
    assert_eq!(rcg.node_count(), 3);
    assert_eq!(rcg.graph().internal_calls().len(), 1);
    assert_eq!(rcg.graph().external_calls().len(), 1);
    assert!(rcg.validate().is_ok());
}

#[test]
fn assemble_then_store_on_disk() {
    let dir = tempdir().unwrap();
    let facts = write_facts(dir.path());
    let output = dir.path().join("app.json");

    let exporter = JsonExporter::default();
    let summary = AssembleUsecase { exporter: &exporter }
        .run(&facts, output.to_str().unwrap())
        .unwrap();
    assert_eq!(summary.internal_calls, 1);

    let store_dir = dir.path().join("store");
    let store = DiskRevisionStore::open(store_dir.to_str().unwrap()).unwrap();
    let keys = StoreUsecase { store: &store }.put_files(&[output.clone()]).unwrap();

    let stored = store.get(&keys[0]).unwrap().unwrap();
    let on_disk: RevisionCallGraph = loader::read_revision(&output).unwrap().into_value();
    assert_eq!(stored, on_disk);
    assert_eq!(store.list().unwrap()[0].timestamp, 1_574_072_773);
}

#[test]
fn cli_assemble_and_validate() {
    let dir = tempdir().unwrap();
    let facts = write_facts(dir.path());
    let output = dir.path().join("app.json");

    let status = Command::new(env!("CARGO_BIN_EXE_revcg"))
        .current_dir(dir.path())
        .args(["assemble", facts.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let validate = Command::new(env!("CARGO_BIN_EXE_revcg"))
        .current_dir(dir.path())
        .args(["validate", output.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(validate.status.success());
    assert!(String::from_utf8_lossy(&validate.stdout).contains("fasten://mvn!org.example:app$2.1.0"));

    let missing = Command::new(env!("CARGO_BIN_EXE_revcg"))
        .current_dir(dir.path())
        .args(["validate", "does-not-exist.json"])
        .output()
        .unwrap();
    assert!(!missing.status.success());
}
