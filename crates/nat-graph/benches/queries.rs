use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nat_core::rng::RngHandle;
use nat_core::{Graph, GraphKind};
use nat_graph::gen_random_graph;

fn queries_bench(c: &mut Criterion) {
    let mut rng = RngHandle::from_seed(7);
    let graph = gen_random_graph(GraphKind::Undirected, 2_000, 8_000, &mut rng).unwrap();
    let nodes = graph.node_ids().to_vec();

    c.bench_function("node_lookup", |b| {
        b.iter(|| {
            for node in &nodes {
                black_box(graph.find(*node));
            }
        });
    });

    c.bench_function("edge_weight_lookup", |b| {
        b.iter(|| {
            for pair in nodes.windows(2) {
                black_box(graph.edge_weight(pair[0], pair[1]));
            }
        });
    });

    c.bench_function("edge_count", |b| {
        b.iter(|| black_box(graph.edge_count()));
    });
}

criterion_group!(benches, queries_bench);
criterion_main!(benches);
