use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nat_core::rng::RngHandle;
use nat_core::GraphKind;
use nat_graph::gen_random_graph;

fn build_graph_bench(c: &mut Criterion) {
    c.bench_function("build_undirected_5k", |b| {
        b.iter(|| {
            let mut rng = RngHandle::from_seed(42);
            let graph = gen_random_graph(GraphKind::Undirected, 5_000, 20_000, &mut rng).unwrap();
            black_box(graph);
        });
    });

    c.bench_function("build_directed_5k", |b| {
        b.iter(|| {
            let mut rng = RngHandle::from_seed(42);
            let graph = gen_random_graph(GraphKind::Directed, 5_000, 20_000, &mut rng).unwrap();
            black_box(graph);
        });
    });
}

criterion_group!(benches, build_graph_bench);
criterion_main!(benches);
