//! Benchmark harness for the skiff pipeline.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p skiff_compiler

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use skiff_binder::Binder;
use skiff_compiler::Compilation;
use skiff_eval::Variables;
use skiff_symbols::HostRegistry;
use skiff_syntax::SyntaxTree;

/// Small source for micro-benchmarks.
const SMALL_SOURCE: &str = "\
x := 42
greeting := \"hello\"
func add(a: int, b: int): int {
    return a + b
}
add(1, 2)
";

/// Medium source with loops and calls.
const MEDIUM_SOURCE: &str = "\
package bench

func fib(n: int): int {
    a := 0
    b := 1
    for i := 1 ... n {
        next := a + b
        a = b
        b = next
    }
    return a
}

func is_prime(n: int): bool {
    if n < 2 {
        return false
    }
    d := 2
    for {
        if d * d > n {
            return true
        }
        if n % d == 0 {
            return false
        }
        d = d + 1
    }
}

total := 0
for n := 2 ... 30 {
    if is_prime(n) {
        total = total + fib(n)
    }
}
total
";

/// Generate a large source with many functions and call sites.
fn generate_large_source(num_functions: usize) -> String {
    let mut source = String::from("package bench\n\n");
    for i in 0..num_functions {
        source.push_str(&format!(
            "func func{i}(x: int, y: int): int {{
    if x > y {{
        return x - y + {i}
    }}
    return y - x + {i}
}}\n\n"
        ));
    }
    source.push_str("total := 0\n");
    for i in 0..num_functions {
        source.push_str(&format!("total = total + func{i}({i}, {})\n", i / 2));
    }
    source.push_str("total\n");
    source
}

// ============================================================================
// Parse Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("small", |b| {
        b.iter(|| black_box(SyntaxTree::parse(black_box(SMALL_SOURCE))));
    });

    group.bench_function("medium", |b| {
        b.iter(|| black_box(SyntaxTree::parse(black_box(MEDIUM_SOURCE))));
    });

    let large = generate_large_source(100);
    group.bench_function("large", |b| {
        b.iter(|| black_box(SyntaxTree::parse(black_box(large.as_str()))));
    });

    group.finish();
}

// ============================================================================
// Bind Benchmarks
// ============================================================================

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");
    let host = HostRegistry::new();

    group.bench_function("medium", |b| {
        let tree = SyntaxTree::parse(MEDIUM_SOURCE);
        b.iter(|| {
            black_box(Binder::bind_global_scope(
                None,
                std::slice::from_ref(black_box(&tree)),
                &host,
            ))
        });
    });

    let large = SyntaxTree::parse(generate_large_source(100));
    group.bench_function("large", |b| {
        b.iter(|| {
            black_box(Binder::bind_global_scope(
                None,
                std::slice::from_ref(black_box(&large)),
                &host,
            ))
        });
    });

    group.finish();
}

// ============================================================================
// Full Pipeline Benchmarks
// ============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    group.bench_function("small", |b| {
        b.iter(|| {
            let compilation = Compilation::new(vec![SyntaxTree::parse(black_box(SMALL_SOURCE))]);
            let mut variables = Variables::default();
            black_box(compilation.evaluate(&mut variables))
        });
    });

    group.bench_function("medium", |b| {
        b.iter(|| {
            let compilation = Compilation::new(vec![SyntaxTree::parse(black_box(MEDIUM_SOURCE))]);
            let mut variables = Variables::default();
            black_box(compilation.evaluate(&mut variables))
        });
    });

    group.finish();
}

// ============================================================================
// Scaling Benchmarks
// ============================================================================

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [10, 50, 100, 200] {
        let source = generate_large_source(size);
        group.bench_with_input(BenchmarkId::new("functions", size), &source, |b, source| {
            b.iter(|| {
                let compilation =
                    Compilation::new(vec![SyntaxTree::parse(black_box(source.as_str()))]);
                let mut variables = Variables::default();
                black_box(compilation.evaluate(&mut variables))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_bind, bench_evaluate, bench_scaling);
criterion_main!(benches);
