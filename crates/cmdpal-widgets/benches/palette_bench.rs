//! Benchmarks for palette scoring and filtering.
//!
//! Run with: cargo bench -p cmdpal-widgets

use cmdpal_widgets::command_palette::{Command, CommandPalette, default_filter, score};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const VERBS: &[&str] = &["Open", "Save", "Close", "Toggle", "Reload", "Format", "Rename"];
const NOUNS: &[&str] = &["File", "Window", "Panel", "Terminal", "Sidebar", "Selection"];

fn corpus(n: usize) -> Vec<Command> {
    (0..n)
        .map(|i| {
            let verb = VERBS[i % VERBS.len()];
            let noun = NOUNS[(i / VERBS.len()) % NOUNS.len()];
            Command::new(format!("cmd-{i}"), format!("{verb} {noun} {i}"))
                .with_keywords(&[noun, "workspace"])
        })
        .collect()
}

// ============================================================================
// Scorer
// ============================================================================

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette/score");

    for (name, query) in [("substring", "term"), ("fuzzy", "tgsb"), ("miss", "zzz")] {
        group.bench_with_input(BenchmarkId::new(name, query), &query, |b, q| {
            b.iter(|| black_box(score(black_box("Toggle Sidebar Terminal"), q)))
        });
    }

    group.finish();
}

// ============================================================================
// Default filter
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette/filter");

    for n in [100, 1_000, 10_000] {
        let items = corpus(n);
        for query in ["", "fi", "open win", "xq"] {
            group.bench_with_input(
                BenchmarkId::new(format!("{n}"), format!("{query:?}")),
                &query,
                |b, q| b.iter(|| black_box(default_filter(&items, q))),
            );
        }
    }

    group.finish();
}

// ============================================================================
// Controller typing
// ============================================================================

fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette/typing");

    for n in [1_000, 10_000] {
        let mut palette = CommandPalette::new(corpus(n), |_| {});
        palette.open();
        group.bench_function(BenchmarkId::new("type_query", n), |b| {
            b.iter(|| {
                for prefix in ["t", "to", "tog", "togg", "toggle"] {
                    palette.set_query(prefix);
                }
                palette.set_query("");
                black_box(palette.results().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_score, bench_filter, bench_typing);
criterion_main!(benches);
