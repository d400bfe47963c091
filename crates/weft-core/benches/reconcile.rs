use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weft_core::{host, text, Element, Props};
use weft_testing::TestHarness;

const LIST_SIZES: &[usize] = &[16, 64, 256];

fn keyed_list(n: usize, reversed: bool) -> Element {
    let mut order: Vec<usize> = (0..n).collect();
    if reversed {
        order.reverse();
    }
    host(
        "ul",
        Props::new().children(order.into_iter().map(|i| {
            host(
                "li",
                Props::new().key(i as u64).child(text(format!("item {i}"))),
            )
        })),
    )
}

fn bench_initial_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_mount");
    for &n in LIST_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut harness = TestHarness::new();
                harness.mount(keyed_list(n, false));
                harness.settle();
                black_box(harness.surface().len())
            });
        });
    }
    group.finish();
}

fn bench_keyed_reversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_reversal");
    for &n in LIST_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut harness = TestHarness::new();
            harness.mount(keyed_list(n, false));
            harness.settle();
            let mut reversed = true;
            b.iter(|| {
                harness.mount(keyed_list(n, reversed));
                harness.settle();
                reversed = !reversed;
                black_box(harness.surface().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_initial_mount, bench_keyed_reversal);
criterion_main!(benches);
