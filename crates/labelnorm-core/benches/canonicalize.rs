use criterion::{black_box, criterion_group, criterion_main, Criterion};
use labelnorm_core::{canonicalize, rewrite};

fn population(n: usize) -> Vec<String> {
    let spellings = ["Needs Triage", "needs-triage", "NEEDSTRIAGE", "Bug", "bug", "UI/UX", "ui ux"];
    (0..n)
        .map(|i| format!("{}{}", spellings[i % spellings.len()], i % 97))
        .collect()
}

fn bench_canonicalize(c: &mut Criterion) {
    let labels = population(10_000);
    c.bench_function("canonicalize_10k", |b| {
        b.iter(|| canonicalize(black_box(&labels)))
    });

    let mapping = canonicalize(&labels);
    let issue: Vec<&String> = labels.iter().take(12).collect();
    c.bench_function("rewrite_12_labels", |b| {
        b.iter(|| rewrite(black_box(&issue), &mapping))
    });
}

criterion_group!(benches, bench_canonicalize);
criterion_main!(benches);
