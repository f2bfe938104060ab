// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ep_core::{
    Animation, FourierAnimation, FourierData, MemoryScene, PeriodicFunction, PhasorChain,
    SampleGrid,
};
use epicycle_config::AnimationSettings;

const SAMPLE_COUNTS: [usize; 3] = [128, 256, 1024];

fn chain_for(samples: usize) -> PhasorChain {
    let function = PeriodicFunction::parse("rect(t) + t/8").expect("bench function parses");
    let data = FourierData::new(function, SampleGrid::default().with_len(samples))
        .expect("bench function samples");
    PhasorChain::new(data, 50)
}

fn bench_chain_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_update");
    for &samples in &SAMPLE_COUNTS {
        let mut chain = chain_for(samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, _| {
            b.iter(|| {
                chain.advance(black_box(4));
                black_box(chain.end_point())
            })
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for &samples in &SAMPLE_COUNTS {
        let settings = AnimationSettings {
            function: "a*sin(10*k*(t - phi))".to_string(),
            samples,
            ..AnimationSettings::default()
        };
        let mut scene = MemoryScene::new();
        let mut animation =
            FourierAnimation::new(&mut scene, &settings).expect("bench animation builds");
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, _| {
            b.iter(|| {
                animation.update(&mut scene, Duration::from_millis(15));
                black_box(animation.counter())
            })
        });
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    for &samples in &SAMPLE_COUNTS {
        let function = PeriodicFunction::parse("a*sin(t) + rect(t)/4").expect("bench function parses");
        let data = FourierData::new(function, SampleGrid::default().with_len(samples))
            .expect("bench function samples");
        let mut chain = PhasorChain::new(data, 50);
        let mut amplitude = 0.5;
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, _| {
            b.iter(|| {
                amplitude = 0.75 - amplitude;
                chain
                    .set_params(black_box(&[amplitude]))
                    .expect("parameter update succeeds");
                black_box(chain.end_point())
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_chain_update, bench_frame, bench_resample
}
criterion_main!(benches);
