//! Benchmarks for ruleac rule matching

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruleac::{Accumulator, RuleMatcher};

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
];

/// Roughly 4 KiB of prose-like text built from `WORDS`.
fn sample_text() -> String {
    let mut text = String::new();
    let mut i = 7usize;
    while text.len() < 4096 {
        text.push_str(WORDS[i % WORDS.len()]);
        text.push(' ');
        i = i.wrapping_mul(31).wrapping_add(17);
    }
    text
}

fn rules_matcher(count: usize) -> RuleMatcher {
    let mut m = RuleMatcher::new();
    let n = WORDS.len();
    m.register_rules((0..count).map(|i| {
        let a = WORDS[i % n];
        let b = WORDS[(i / n + 1) % n];
        let c = WORDS[(i * 7 + 3) % n];
        match i % 4 {
            0 => format!("{}{} & {}", a, i, b),
            1 => format!("({} | {}) & {} !", a, b, c),
            2 => format!("{} & {} | {}{}", a, b, c, i),
            _ => format!("{} {}", a, b),
        }
    }));
    m
}

fn bench_single_literal(c: &mut Criterion) {
    let mut m = RuleMatcher::new();
    m.register_rule("tango").unwrap();
    let text = sample_text();

    c.bench_function("single_literal_4k", |b| {
        b.iter(|| m.match_text(black_box(text.as_bytes())).unwrap())
    });
}

fn bench_composite_rules(c: &mut Criterion) {
    let m = rules_matcher(100);
    let text = sample_text();

    c.bench_function("100_rules_4k", |b| {
        b.iter(|| m.match_text(black_box(text.as_bytes())).unwrap())
    });
}

fn bench_many_rules(c: &mut Criterion) {
    let m = rules_matcher(10_000);
    let text = sample_text();

    c.bench_function("10k_rules_4k", |b| {
        b.iter(|| m.match_text(black_box(text.as_bytes())).unwrap())
    });
}

/// Reusing one accumulator avoids reallocating the per-call maps.
fn bench_reused_accumulator(c: &mut Criterion) {
    let m = rules_matcher(1_000);
    let text = sample_text();
    let mut acc = Accumulator::new();

    c.bench_function("1k_rules_reused_accumulator", |b| {
        b.iter(|| m.match_ids(black_box(text.as_bytes()), &mut acc).unwrap())
    });
}

fn bench_no_match(c: &mut Criterion) {
    let m = rules_matcher(1_000);
    let text = "z".repeat(4096);

    c.bench_function("1k_rules_no_match", |b| {
        b.iter(|| m.match_text(black_box(text.as_bytes())).unwrap())
    });
}

fn bench_multibyte_text(c: &mut Criterion) {
    let mut m = RuleMatcher::new();
    m.register_rules(["日本 & 東京", "café | naïve", "Ünïcödé !"]);
    let text = "日本の首都は東京です。 café naïve ".repeat(64);

    c.bench_function("multibyte_text", |b| {
        b.iter(|| m.match_text(black_box(text.as_bytes())).unwrap())
    });
}

fn bench_register(c: &mut Criterion) {
    c.bench_function("register_1k_rules", |b| {
        b.iter(|| black_box(rules_matcher(1_000)))
    });
}

criterion_group!(
    benches,
    bench_single_literal,
    bench_composite_rules,
    bench_many_rules,
    bench_reused_accumulator,
    bench_no_match,
    bench_multibyte_text,
    bench_register,
);
criterion_main!(benches);
