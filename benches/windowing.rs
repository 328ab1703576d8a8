//! Benchmarks for the windowing math: visible-window computation must
//! stay O(1) in the row count and cheap enough to run on every scroll
//! event.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use syncview::layout::{GridConfig, GridLayout, Viewport};
use syncview::types::ColumnSpec;

fn columns(n: usize) -> Vec<ColumnSpec> {
    (0..n)
        .map(|i| ColumnSpec {
            name: format!("col{i}"),
            title: format!("Column {i}"),
            width: 120.0,
            format: None,
        })
        .collect()
}

fn bench_visible_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_window");

    for rows in [1_000usize, 100_000, 10_000_000] {
        let layout = GridLayout::new(&columns(8), rows, &GridConfig::default());
        let total = layout.total_height();
        group.bench_function(format!("{rows}_rows"), |b| {
            let mut viewport = Viewport::new();
            let mut scroll = 0.0f32;
            b.iter(|| {
                scroll = (scroll + 97.0) % total.max(1.0);
                viewport.scroll_y = scroll;
                black_box(viewport.visible_window(black_box(&layout)))
            });
        });
    }

    group.finish();
}

fn bench_layout_build(c: &mut Criterion) {
    let specs = columns(32);
    c.bench_function("layout_build_32_cols", |b| {
        b.iter(|| {
            black_box(GridLayout::new(
                black_box(&specs),
                black_box(250_000),
                &GridConfig::default(),
            ))
        })
    });
}

criterion_group!(benches, bench_visible_window, bench_layout_build);
criterion_main!(benches);
