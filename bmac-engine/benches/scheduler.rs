// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Benchmark full runs of the reference-size array.

use bmac_engine::config::{KernelKind, MacConfig};
use bmac_engine::generate::{Pattern, generate};
use bmac_engine::scheduler::simulate;
use bmac_engine::sram::SramBuffer;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn setup_buffers(config: &MacConfig) -> (SramBuffer, SramBuffer) {
    let a = generate(config, &Pattern::Random { seed: 1 }).unwrap();
    let b = generate(config, &Pattern::Random { seed: 2 }).unwrap();
    (a, b)
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");

    for kernel in [KernelKind::Direct, KernelKind::Vsq] {
        let config = MacConfig {
            kernel,
            ..MacConfig::default()
        };
        group.bench_function(kernel.to_string(), |b| {
            b.iter_batched(
                || setup_buffers(&config),
                |(a_buf, b_buf)| simulate(&config, &a_buf, &b_buf).unwrap(),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_kernels
}
criterion_main!(benches);
