/// Benchmarks for the revcg JSON codec.
///
/// Run with: `cargo bench`
///
/// - encode / decode throughput at several graph sizes
/// - mmap loading vs buffered read of the same file

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use tempfile::tempdir;

use revcg::application::assembler::{CallFact, MethodFact, RevisionAssembler, RevisionFacts, TypeFact};
use revcg::domain::RevisionCallGraph;

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// A revision with `num_types` internal types of `methods_per_type` methods;
/// every method calls its neighbour and one external method.
fn create_synthetic_revision(num_types: usize, methods_per_type: usize) -> RevisionCallGraph {
    let mut facts = RevisionFacts {
        forge: "mvn".to_string(),
        product: "bench:lib".to_string(),
        version: "1.0.0".to_string(),
        generator: "bench".to_string(),
        timestamp: Some(0),
        types: Vec::new(),
        methods: Vec::new(),
        calls: Vec::new(),
    };

    for t in 0..num_types {
        facts.types.push(TypeFact {
            uri: format!("/bench.pkg/Type{}", t),
            source_file: format!("Type{}.java", t),
            super_classes: vec!["/java.lang/Object".to_string()],
            super_interfaces: Vec::new(),
            access: "public".to_string(),
            is_final: false,
        });
        for m in 0..methods_per_type {
            facts.methods.push(MethodFact {
                uri: format!("/bench.pkg/Type{}.m{}()%2Fjava.lang%2FVoid", t, m),
                metadata: Default::default(),
            });
        }
    }

    for t in 0..num_types {
        for m in 0..methods_per_type {
            let caller = format!("/bench.pkg/Type{}.m{}()%2Fjava.lang%2FVoid", t, m);
            facts.calls.push(CallFact {
                caller: caller.clone(),
                callee: format!("/bench.pkg/Type{}.m{}()%2Fjava.lang%2FVoid", (t + 1) % num_types, m),
                call_site: 1,
                kind: "static".to_string(),
                metadata: Default::default(),
            });
            facts.calls.push(CallFact {
                caller,
                callee: format!("/java.util/List.get{}(I)%2Fjava.lang%2FObject", m),
                call_site: 2,
                kind: "interface".to_string(),
                metadata: Default::default(),
            });
        }
    }

    RevisionAssembler::assemble(facts).unwrap()
}

fn write_to_temp(rcg: &RevisionCallGraph) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(rcg.to_json_string().unwrap().as_bytes()).unwrap();
    (dir, path)
}

// ═══════════════════════════════════════════════════════════════════════════
// Codec Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/encode");

    for num_types in [10, 100, 500].iter() {
        let rcg = create_synthetic_revision(*num_types, 10);
        group.throughput(Throughput::Elements(rcg.node_count() as u64));

        group.bench_with_input(BenchmarkId::new("types", num_types), &rcg, |b, rcg| {
            b.iter(|| black_box(rcg).to_json_string().unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/decode");

    for num_types in [10, 100, 500].iter() {
        let json = create_synthetic_revision(*num_types, 10).to_json_string().unwrap();
        group.throughput(Throughput::Bytes(json.len() as u64));

        group.bench_with_input(BenchmarkId::new("types", num_types), &json, |b, json| {
            b.iter(|| RevisionCallGraph::from_json_str(black_box(json)).unwrap())
        });
    }

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Mmap vs Traditional Read Comparison
// ═══════════════════════════════════════════════════════════════════════════

fn bench_mmap_vs_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/mmap_vs_read");

    let rcg = create_synthetic_revision(500, 20);
    let (_dir, path) = write_to_temp(&rcg);

    let file_size = std::fs::metadata(&path).unwrap().len();
    group.throughput(Throughput::Bytes(file_size));

    group.bench_function("traditional_read", |b| {
        b.iter(|| {
            let mut file = File::open(&path).unwrap();
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer).unwrap();
            RevisionCallGraph::from_json_slice(black_box(&buffer)).unwrap()
        })
    });

    group.bench_function("mmap_read", |b| {
        b.iter(|| {
            let file = File::open(&path).unwrap();
            let mmap = unsafe { Mmap::map(&file) }.unwrap();
            RevisionCallGraph::from_json_slice(black_box(&mmap)).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_mmap_vs_read);
criterion_main!(benches);
