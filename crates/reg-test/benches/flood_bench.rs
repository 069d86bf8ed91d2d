//! Benchmarks for REG flood propagation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use reg_core::{Link, PartialValues, RegisterKey, SyncAcceptance};
use reg_sync::{reconcile, FloodPlan};
use reg_test::{MeshSimulator, Topology};

fn reports(n: usize) -> Vec<SyncAcceptance> {
    // Every link reported twice, once rejected and once accepted
    (0..n)
        .flat_map(|i| {
            let link = Link::new(format!("node-{}", i % (n / 2).max(1)), "shared");
            [SyncAcceptance::rejected(link.clone()), SyncAcceptance::accepted(link)]
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [10, 100, 1000] {
        let input = reports(size);
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| reconcile(black_box(input.clone())))
        });
    }

    group.finish();
}

fn bench_flood_plan(c: &mut Criterion) {
    let this = Link::new("node-0", "shared");
    let incoming: Vec<Link> = (1..50).map(|i| Link::new(format!("node-{i}"), "shared")).collect();
    let outgoing: Vec<Link> = (25..100).map(|i| Link::new(format!("node-{i}"), "shared")).collect();

    c.bench_function("flood_plan_new", |b| {
        b.iter(|| {
            FloodPlan::new(
                black_box(this.clone()),
                black_box(incoming.clone()),
                black_box(&outgoing),
            )
        })
    });
}

fn bench_mesh_flood(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("mesh_flood");
    group.sample_size(20);

    for (name, topology) in [
        ("ring_32", Topology::ring(32)),
        ("tree_63", Topology::tree(63)),
        ("full_12", Topology::full(12)),
    ] {
        let mesh = MeshSimulator::default();
        topology.install(&mesh).unwrap();
        let origin = topology.node(0).clone();

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut values = PartialValues::new();
                values.insert(RegisterKey::A, Some("x".into()));
                let result = runtime.block_on(mesh.push(&origin, values)).unwrap();
                mesh.reset_calls();
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_flood_plan, bench_mesh_flood);
criterion_main!(benches);
