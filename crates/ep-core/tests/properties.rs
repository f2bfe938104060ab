// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use ep_core::{
    ControlEvent, EpicycleError, FourierAnimation, FourierData, MemoryScene, PeriodicFunction,
    PhasorChain, SampleGrid, VerticalRescaler,
};
use epicycle_config::AnimationSettings;
use ndarray::Array1;

fn chain(src: &str, n: usize) -> PhasorChain {
    let function = PeriodicFunction::parse(src).unwrap();
    let data = FourierData::new(function, SampleGrid::default().with_len(n)).unwrap();
    PhasorChain::new(data, 16)
}

/// `2/π · Σ sin(i t) / i` over the first `terms` odd harmonics: a square
/// wave of height ±0.5 that stays inside the default range.
fn square_wave(terms: usize) -> String {
    let series: Vec<String> = (0..terms)
        .map(|k| {
            let i = 2 * k + 1;
            format!("sin({i}*t)/{i}")
        })
        .collect();
    format!("2/pi*({})", series.join(" + "))
}

#[test]
fn full_chain_reproduces_every_sample() {
    for src in ["sin(t)", "rect(t) + t/10", "abs(t)/4 - 1/2", "exp(-t**2)"] {
        let mut c = chain(src, 64);
        let samples = c.data().samples().to_owned();
        let n = samples.len() as i64;

        c.update(0);
        assert!((c.end_point().re - samples[0]).abs() < 1e-9, "{src} at phase 0");

        for counter in [1, 5, -7, 63, 130] {
            c.update(counter);
            let expected = samples[counter.wrapping_neg().rem_euclid(n) as usize];
            assert!(
                (c.end_point().re - expected).abs() < 1e-9,
                "{src} at counter {counter}: {} vs {expected}",
                c.end_point().re
            );
        }
    }
}

#[test]
fn truncation_keeps_vertex_prefixes() {
    let mut c = chain("rect(t) + t/8", 64);
    c.update(11);
    let full = c.active_vertices().to_vec();
    for resolution in [1, 3, 10, 20] {
        c.set_resolution(resolution);
        assert_eq!(c.active_vertices(), &full[..resolution]);
    }
}

#[test]
fn rescaling_twice_changes_nothing() {
    let mut samples = Array1::from(vec![-4.0, 0.5, 2.0, 3.3]);
    assert!(VerticalRescaler::fit(&mut samples, [-1.0, 1.0]));
    let once = samples.clone();
    assert!(!VerticalRescaler::fit(&mut samples, [-1.0, 1.0]));
    assert_eq!(samples, once);
    assert_eq!(samples[0], -1.0);
    assert!((samples[3] - 1.0).abs() < 1e-12);
}

#[test]
fn opposite_counters_give_conjugate_tips_for_a_real_spectrum() {
    // Sampled from 0, the cosines are even in the sample index and every bin
    // is real.
    let function = PeriodicFunction::parse("cos(t)/2 + cos(3*t)/4").unwrap();
    let grid = SampleGrid::new(0.0, 2.0 * PI, 64);
    let mut c = PhasorChain::new(FourierData::new(function, grid).unwrap(), 8);
    for s in [1, 4, 9] {
        c.update(s);
        let forward = c.end_point();
        c.update(-s);
        let backward = c.end_point();
        assert!((forward.re - backward.re).abs() < 1e-9);
        assert!((forward.im + backward.im).abs() < 1e-9);
    }
}

#[test]
fn positive_and_negative_speeds_trace_the_same_waveform() {
    let mut c = chain("rect(t) + t/8", 32);
    let samples = c.data().samples().to_owned();
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    for step in 0..32 {
        c.update(step);
        forward.push(c.end_point().re);
        c.update(-step);
        backward.push(c.end_point().re);
    }
    forward.sort_by(f64::total_cmp);
    backward.sort_by(f64::total_cmp);
    let mut expected = samples.to_vec();
    expected.sort_by(f64::total_cmp);
    for ((a, b), e) in forward.iter().zip(&backward).zip(&expected) {
        assert!((a - e).abs() < 1e-9);
        assert!((b - e).abs() < 1e-9);
    }
}

#[test]
fn foreign_variable_is_rejected_without_side_effects() {
    let settings = AnimationSettings {
        function: "sin(t)".to_string(),
        samples: 64,
        ..AnimationSettings::default()
    };
    let mut scene = MemoryScene::new();
    let mut anim = FourierAnimation::new(&mut scene, &settings).unwrap();
    let amplitudes = anim.chain().data().amplitudes().to_owned();
    let samples = anim.chain().data().samples().to_owned();

    let err = anim
        .apply(ControlEvent::SetFunction("5*x".to_string()))
        .unwrap_err();
    assert!(err.is_variable_not_found());
    assert_eq!(anim.chain().data().amplitudes(), amplitudes.view());
    assert_eq!(anim.chain().data().samples(), samples.view());
    assert_eq!(anim.function().label(), "sin(t)");
}

#[test]
fn sine_spectrum_has_a_single_unit_harmonic() {
    let table = chain("sin(t)", 256).data().table();
    assert_eq!(table.len(), 129);
    assert!(table[0].magnitude < 1e-12);
    assert!((table[1].magnitude - 1.0).abs() < 1e-9);
    assert!((table[1].frequency - 1.0 / 256.0).abs() < 1e-15);
    assert!(table[2..].iter().all(|h| h.magnitude < 1e-9));
}

#[test]
fn truncated_square_wave_tracks_its_fundamental() {
    let mut c = chain(&square_wave(40), 256);
    assert!(!c.data().was_rescaled());
    c.set_resolution(3);
    assert_eq!(c.active_vertices().len(), 3);

    // Counter -64 reproduces sample 64, which sits at t = -π/2.
    c.update(-64);
    let t = -PI / 2.0;
    let tip = c.end_point().re;
    // Bin 2 is an even harmonic, so only the fundamental survives.
    assert!((tip - 2.0 / PI * t.sin()).abs() < 1e-9);
    assert!((tip - (-0.5)).abs() < 0.2);

    // With every harmonic the tip lands on the sample itself.
    c.set_resolution(c.harmonics());
    c.update(-64);
    let sample = c.data().samples()[64];
    assert!((c.end_point().re - sample).abs() < 1e-9);
}

#[test]
fn advancing_and_rewinding_restores_the_chain() {
    let mut c = chain("rect(t) + t/8", 64);
    c.update(7);
    let vertices = c.vertices().to_vec();
    let outline = c.outline().to_vec();
    for s in [1, 13, 64, 1 << 40] {
        c.advance(s);
        c.advance(-s);
        assert_eq!(c.counter(), 7);
        for (a, b) in c.vertices().iter().zip(&vertices) {
            assert!((a - b).norm() < 1e-9, "vertex drifted after step {s}");
        }
        for (a, b) in c.outline().iter().zip(&outline) {
            assert!((a - b).norm() < 1e-9, "outline drifted after step {s}");
        }
    }
}

#[test]
fn repeated_integration_stays_cheap() {
    let settings = AnimationSettings {
        function: "exp(-t**2)".to_string(),
        samples: 256,
        ..AnimationSettings::default()
    };
    let mut scene = MemoryScene::new();
    let mut anim = FourierAnimation::new(&mut scene, &settings).unwrap();
    let started = Instant::now();
    for _ in 0..3 {
        anim.apply(ControlEvent::Integrate).unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(anim.function().label().matches("(t, 0, t)").count(), 3);
    assert!(anim.chain().data().samples().iter().all(|v| v.is_finite()));
}

#[test]
fn deeply_nested_text_is_a_parse_error() {
    for src in ["(".repeat(100_000), format!("{}t{}", "(".repeat(300), ")".repeat(300))] {
        let err = PeriodicFunction::parse(&src).unwrap_err();
        assert!(matches!(err, EpicycleError::Parse(_)), "{err}");
    }
}
