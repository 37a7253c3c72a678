use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vigil_power::{calculate_power, max_power, PowerState};
use vigil_types::params::MIN_STAKE;

fn bench_calculate_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_power");

    for units in [1u128, 100, 10_000, 1_000_000] {
        let balance = units * MIN_STAKE;
        group.bench_with_input(BenchmarkId::new("one_block", units), &balance, |b, balance| {
            b.iter(|| calculate_power(black_box(100), black_box(101), black_box(0), *balance));
        });
    }

    group.finish();
}

fn bench_max_power(c: &mut Criterion) {
    c.bench_function("max_power", |b| {
        b.iter(|| max_power(black_box(12_345 * MIN_STAKE)));
    });
}

fn bench_settle(c: &mut Criterion) {
    c.bench_function("power_state_settle_1000_steps", |b| {
        b.iter(|| {
            let mut state = PowerState::new(100 * MIN_STAKE, 0);
            for block in 1..=1000u64 {
                let _ = state.settle(block, 100 * MIN_STAKE);
            }
            black_box(state.power)
        });
    });
}

criterion_group!(benches, bench_calculate_power, bench_max_power, bench_settle);
criterion_main!(benches);
