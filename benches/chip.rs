//! Benchmarks for the SID cycle loop and the samplers
//!
//! Run with: cargo bench --bench chip

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use sid6581::{ChipModel, Sampler, SamplingMethod, Sid, SidBackend};

/// Three voices playing a chord through the low-pass filter
fn chord(chip: &mut Sid) {
    let frame_regs: [(u8, u8); 20] = [
        (0x00, 0x25), (0x01, 0x11), // Voice 1 C4
        (0x05, 0x09), (0x06, 0xf0),
        (0x04, 0x21),               // Sawtooth + gate
        (0x07, 0x8a), (0x08, 0x15), // Voice 2 E4
        (0x09, 0x00), (0x0a, 0x08),
        (0x0c, 0x09), (0x0d, 0xf0),
        (0x0b, 0x41),               // Pulse + gate
        (0x0e, 0xed), (0x0f, 0x19), // Voice 3 G4
        (0x13, 0x09), (0x14, 0xf0),
        (0x12, 0x11),               // Triangle + gate
        (0x16, 0x40), (0x17, 0xf7), // Cutoff, resonance, route 1-3
        (0x18, 0x1f),               // Low-pass, volume 15
    ];
    for (addr, value) in frame_regs {
        chip.write_register(addr, value);
    }
}

fn bench_clock_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock");

    let mut chip = Sid::new(ChipModel::MOS6581);
    chord(&mut chip);

    for iterations in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            iterations,
            |b, &iterations| {
                b.iter(|| {
                    for _ in 0..iterations {
                        chip.clock();
                        black_box(chip.output());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_sampling_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_20ms");

    // One PAL frame
    let cycles = 19_705;
    for method in [
        SamplingMethod::Decimate,
        SamplingMethod::Interpolate,
        SamplingMethod::Resample,
    ] {
        let mut chip = Sid::new(ChipModel::MOS8580);
        chord(&mut chip);
        let Ok(mut sampler) = Sampler::new(method, 985_248.0, 48_000.0) else {
            continue;
        };
        group.bench_function(BenchmarkId::from_parameter(method), |b| {
            b.iter(|| black_box(sampler.clock(&mut chip, black_box(cycles))));
        });
    }

    group.finish();
}

fn bench_register_updates(c: &mut Criterion) {
    let mut chip = Sid::new(ChipModel::MOS6581);

    c.bench_function("write_register", |b| {
        b.iter(|| {
            chip.write_register(black_box(0x00), black_box(0x25));
            chip.write_register(black_box(0x01), black_box(0x11));
            chip.write_register(black_box(0x04), black_box(0x41));
            chip.write_register(black_box(0x18), black_box(0x0f));
        });
    });
}

fn bench_noise_voices(c: &mut Criterion) {
    let mut chip = Sid::new(ChipModel::MOS6581);
    for base in [0x00u8, 0x07, 0x0e] {
        chip.write_register(base + 1, 0x40);
        chip.write_register(base + 6, 0xf0);
        chip.write_register(base + 4, 0x81);
    }
    chip.write_register(0x18, 0x0f);

    c.bench_function("noise_three_voices", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                chip.clock();
                black_box(chip.output());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_clock_iterations,
    bench_sampling_methods,
    bench_register_updates,
    bench_noise_voices
);
criterion_main!(benches);
