use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use det_k_decomp::{DetKDecomp, Hypergraph};

/// Cyclic band of ternary hyperedges, `n` cells wide.
fn band(n: usize) -> Vec<(String, Vec<String>)> {
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            (
                format!("E{i}"),
                vec![format!("t{i}"), format!("t{j}"), format!("b{i}")],
            )
        })
        .collect()
}

fn bench_decompose_band(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose band");
    group.sample_size(20);
    for n in [8usize, 16, 24] {
        group.bench_function(format!("n = {n}"), |b| {
            b.iter(|| {
                let mut g = Hypergraph::from_edges(band(n));
                let ht = DetKDecomp::new(&mut g, 2, 0).run();
                assert!(black_box(ht).is_some());
            })
        });
    }
    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    c.bench_function("reduce band with duplicates", |b| {
        b.iter(|| {
            let mut edges = band(24);
            edges.extend(band(24).into_iter().map(|(n, vs)| (format!("{n}'"), vs)));
            let mut g = Hypergraph::from_edges(edges);
            g.reduce(false);
            g.update_comp_sizes();
            g.update_neighbourhood();
            assert_eq!(black_box(&g).nr_edges(), 24);
        })
    });
}

criterion_group!(benches, bench_decompose_band, bench_reduce);
criterion_main!(benches);
