// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_epicycle-cli"))
        .args(args)
        .env_remove("EPICYCLE_FUNCTION")
        .env_remove("EPICYCLE_SAMPLES")
        .env_remove("EPICYCLE_SPEED")
        .env_remove("EPICYCLE_INTERVAL_MS")
        .env_remove("EPICYCLE_TRACE_CHROME")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn run_ok(args: &[&str]) -> Output {
    let output = cli(args);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn run_writes_a_frame_trace() {
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("out").join("trace.json");

    run_ok(&[
        "run",
        "--function",
        "sin(t)",
        "--samples",
        "64",
        "--speed",
        "1",
        "--frames",
        "5",
        "--output",
        trace_path.to_str().unwrap(),
    ]);

    let trace: Value = serde_json::from_str(&fs::read_to_string(&trace_path).unwrap()).unwrap();
    assert_eq!(trace["function"]["label"], "sin(t)");
    assert_eq!(trace["function"]["samples"], 64);
    assert_eq!(trace["resolution"], 33);
    let frames = trace["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 5);
    let counters: Vec<i64> = frames
        .iter()
        .map(|f| f["counter"].as_i64().unwrap())
        .collect();
    assert_eq!(counters, [-1, 0, 1, 2, 3]);
    // Counter 0 reproduces the first sample, sin(-π).
    let tip = frames[1]["tip"][0].as_f64().unwrap();
    assert!(tip.abs() < 1e-9, "tip at counter 0 was {tip}");
    assert!(frames[0].get("vertices").is_none());
}

#[test]
fn presets_and_resolution_shape_the_chain() {
    let output = run_ok(&[
        "run",
        "--preset",
        "Rectangle",
        "--samples",
        "32",
        "--resolution",
        "3",
        "--frames",
        "2",
        "--vertices",
    ]);
    let trace = stdout_json(&output);
    assert_eq!(trace["function"]["label"], "3*rect(t)/2");
    assert_eq!(trace["resolution"], 3);
    for frame in trace["frames"].as_array().unwrap() {
        let vertices = frame["vertices"].as_array().unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2], frame["tip"]);
    }
}

#[test]
fn foreign_variables_fail_the_run() {
    let output = cli(&["run", "--function", "5*x", "--frames", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not depend on 't'"), "stderr: {stderr}");
}

#[test]
fn out_of_range_resolution_is_refused() {
    let output = cli(&[
        "run",
        "--function",
        "sin(t)",
        "--samples",
        "16",
        "--resolution",
        "10",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("between 1 and 9"), "stderr: {stderr}");
}

#[test]
fn coefficients_print_the_harmonic_table() {
    let output = run_ok(&[
        "coefficients",
        "--function",
        "sin(t)",
        "--samples",
        "256",
        "--limit",
        "4",
    ]);
    let table = stdout_json(&output);
    let harmonics = table["harmonics"].as_array().unwrap();
    assert_eq!(harmonics.len(), 4);
    assert!(harmonics[0]["magnitude"].as_f64().unwrap() < 1e-12);
    assert!((harmonics[1]["magnitude"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert!((harmonics[1]["frequency"].as_f64().unwrap() - 1.0 / 256.0).abs() < 1e-15);
    assert_eq!(table["function"]["rescaled"], false);
}

#[test]
fn parameter_values_follow_alphabetical_order() {
    let output = run_ok(&[
        "coefficients",
        "--function",
        "b + a*sin(t)",
        "--samples",
        "64",
        "--param",
        "0.5",
        "--param",
        "-0.25",
    ]);
    let table = stdout_json(&output);
    assert_eq!(table["function"]["parameters"], serde_json::json!(["a", "b"]));
    let harmonics = table["harmonics"].as_array().unwrap();
    assert!((harmonics[0]["magnitude"].as_f64().unwrap() - 0.25).abs() < 1e-9);
    assert!((harmonics[1]["magnitude"].as_f64().unwrap() - 0.5).abs() < 1e-9);

    let output = cli(&["coefficients", "--function", "a*sin(t)", "--param", "1", "--param", "2"]);
    assert!(!output.status.success());
}

#[test]
fn settings_file_supplies_defaults() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("settings.json");
    fs::write(&config_path, r#"{"function": "cos(t)/2", "samples": 16}"#).unwrap();

    let output = run_ok(&["--config", config_path.to_str().unwrap(), "coefficients"]);
    let table = stdout_json(&output);
    assert_eq!(table["function"]["label"], "cos(t)/2");
    assert_eq!(table["function"]["samples"], 16);
    assert_eq!(table["harmonics"].as_array().unwrap().len(), 9);
}

#[test]
fn presets_are_listed() {
    let output = run_ok(&["presets"]);
    let listing = String::from_utf8_lossy(&output.stdout);
    for name in ["sine", "gaussian", "sinc", "triangle"] {
        assert!(listing.contains(name), "missing {name}");
    }
}

#[test]
fn frame_counts_beyond_u32_are_refused() {
    let output = cli(&["run", "--function", "sin(t)", "--frames", "5000000000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--frames must be at most"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}
