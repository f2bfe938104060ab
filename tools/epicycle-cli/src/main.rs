// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use ep_core::presets;
use ep_core::{
    AnimationDriver, ControlEvent, FourierAnimation, FourierData, Harmonic, MemoryScene,
    PeriodicFunction, SampleGrid,
};
use epicycle_config::AnimationSettings;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

type DynError = Box<dyn Error>;

type Result<T> = std::result::Result<T, DynError>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Headless driver for the Fourier series epicycle engine"
)]
struct Cli {
    /// JSON settings file; missing fields keep their defaults
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the animation for a number of frames and record the chain tip
    Run(RunArgs),

    /// Print the harmonic table of a function
    Coefficients(CoefficientArgs),

    /// List the named preset waveforms
    Presets,
}

#[derive(Args)]
struct SourceArgs {
    /// Function text in the variable `t`
    #[arg(long, conflicts_with = "preset")]
    function: Option<String>,

    /// Name of a preset waveform
    #[arg(long)]
    preset: Option<String>,

    /// Parameter values in alphabetical parameter order
    #[arg(long = "param", action = ArgAction::Append, allow_negative_numbers = true)]
    params: Vec<f64>,

    /// Number of samples over one period
    #[arg(long)]
    samples: Option<usize>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of summed harmonics, between 1 and samples / 2 + 1
    #[arg(long)]
    resolution: Option<usize>,

    /// Rotation-counter increment per frame
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<i64>,

    /// Frames to produce
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Frame interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Hold the frame interval on the wall clock instead of stepping a virtual one
    #[arg(long)]
    realtime: bool,

    /// Record every chain vertex, not only the tip
    #[arg(long)]
    vertices: bool,

    /// Destination for the JSON trace; standard output when omitted
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct CoefficientArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Keep only the first `limit` harmonics
    #[arg(long)]
    limit: Option<usize>,

    /// Destination for the JSON table; standard output when omitted
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct FunctionSummary {
    label: String,
    latex: String,
    parameters: Vec<String>,
    values: Vec<f64>,
    samples: usize,
    rescaled: bool,
}

#[derive(Serialize)]
struct FrameRecord {
    frame: u64,
    counter: i64,
    /// `[real, imaginary]`; the real part approximates the signal value.
    tip: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    vertices: Option<Vec<[f64; 2]>>,
}

#[derive(Serialize)]
struct RunTrace {
    function: FunctionSummary,
    resolution: usize,
    speed: i64,
    interval_ms: u64,
    frames: Vec<FrameRecord>,
}

#[derive(Serialize)]
struct CoefficientTable {
    function: FunctionSummary,
    harmonics: Vec<Harmonic>,
}

fn main() {
    ep_core::telemetry::init_tracing();
    let outcome = try_main();
    ep_core::telemetry::finish();
    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Run(args) => {
            let settings = load_settings(&cli, &args.source)?;
            let trace = run(args, settings)?;
            emit(&trace, args.output.as_deref())
        }
        Command::Coefficients(args) => {
            let settings = load_settings(&cli, &args.source)?;
            let table = coefficients(args, &settings)?;
            emit(&table, args.output.as_deref())
        }
        Command::Presets => {
            let mut stdout = io::stdout().lock();
            for (name, text) in presets::PRESETS {
                writeln!(stdout, "{name:<10} {text}")?;
            }
            Ok(())
        }
    }
}

/// Defaults, then the settings file, then `EPICYCLE_*` variables, then flags.
fn load_settings(cli: &Cli, source: &SourceArgs) -> Result<AnimationSettings> {
    let settings = match &cli.config {
        Some(path) => AnimationSettings::from_path(path)?,
        None => AnimationSettings::default(),
    };
    let mut settings = settings.with_env_overrides();
    if let Some(text) = function_text(source)? {
        settings.function = text;
    }
    if let Some(samples) = source.samples {
        settings.samples = samples;
    }
    Ok(settings.validated())
}

fn function_text(source: &SourceArgs) -> Result<Option<String>> {
    if let Some(name) = &source.preset {
        let text = presets::preset(name).ok_or_else(|| {
            invalid_input(format!(
                "unknown preset `{name}`; expected one of: {}",
                presets::names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        return Ok(Some(text.to_string()));
    }
    Ok(source.function.clone())
}

fn run(args: &RunArgs, mut settings: AnimationSettings) -> Result<RunTrace> {
    if let Some(speed) = args.speed {
        settings.speed = speed;
    }
    if let Some(interval) = args.interval_ms {
        settings.interval_ms = interval.max(1);
    }

    let mut scene = MemoryScene::new();
    let mut animation = FourierAnimation::new(&mut scene, &settings)?;
    if !args.source.params.is_empty() {
        check_arity(animation.function(), &args.source.params)?;
        animation.apply(ControlEvent::SetParams(args.source.params.clone()))?;
    }
    if let Some(resolution) = args.resolution {
        let harmonics = animation.chain().harmonics();
        if !(1..=harmonics).contains(&resolution) {
            return Err(invalid_input(format!(
                "--resolution must lie between 1 and {harmonics}"
            )));
        }
        animation.apply(ControlEvent::SetResolution(resolution))?;
    }

    let frame_count = u32::try_from(args.frames).map_err(|_| {
        invalid_input(format!("--frames must be at most {}", u32::MAX))
    })?;
    let interval = Duration::from_millis(settings.interval_ms);
    let mut driver = AnimationDriver::new(animation, scene, interval);
    let mut frames = Vec::new();
    driver.start();
    let origin = Instant::now();
    for frame in 0..frame_count {
        if args.realtime {
            driver.run_frames(1);
        } else {
            // A virtual clock keeps the trace independent of scheduling.
            let now = origin
                .checked_add(interval.saturating_mul(frame))
                .ok_or_else(|| invalid_input(format!("frame {frame} lies beyond the clock")))?;
            driver.tick_at(now);
        }
        frames.push(record(driver.animation(), driver.frames(), args.vertices));
    }
    driver.stop();

    let animation = driver.animation();
    info!(frames = frames.len(), counter = animation.counter(), "run finished");
    Ok(RunTrace {
        function: summary(animation.chain().data()),
        resolution: animation.chain().resolution(),
        speed: animation.speed(),
        interval_ms: settings.interval_ms,
        frames,
    })
}

fn record(animation: &FourierAnimation, frame: u64, with_vertices: bool) -> FrameRecord {
    let chain = animation.chain();
    let tip = chain.end_point();
    let vertices = with_vertices.then(|| {
        chain
            .active_vertices()
            .iter()
            .map(|v| [v.re, v.im])
            .collect()
    });
    FrameRecord {
        frame,
        counter: chain.counter(),
        tip: [tip.re, tip.im],
        vertices,
    }
}

fn coefficients(args: &CoefficientArgs, settings: &AnimationSettings) -> Result<CoefficientTable> {
    let function = PeriodicFunction::parse(&settings.function)?;
    let grid = SampleGrid::new(settings.start, settings.period, settings.samples);
    let data = if args.source.params.is_empty() {
        FourierData::with_y_range(function, grid, settings.y_range)?
    } else {
        check_arity(&function, &args.source.params)?;
        let mut data = FourierData::with_y_range(function, grid, settings.y_range)?;
        data.set_params(&args.source.params)?;
        data
    };
    let mut harmonics = data.table();
    if let Some(limit) = args.limit {
        harmonics.truncate(limit);
    }
    Ok(CoefficientTable {
        function: summary(&data),
        harmonics,
    })
}

fn summary(data: &FourierData) -> FunctionSummary {
    let function = data.function();
    FunctionSummary {
        label: function.label(),
        latex: function.latex(),
        parameters: function.parameters().to_vec(),
        values: data.params().to_vec(),
        samples: data.grid().len(),
        rescaled: data.was_rescaled(),
    }
}

fn check_arity(function: &PeriodicFunction, params: &[f64]) -> Result<()> {
    let expected = function.parameters().len();
    if params.len() != expected {
        return Err(invalid_input(format!(
            "`{}` takes {expected} parameter(s) ({}), got {}",
            function.label(),
            function.parameters().join(", "),
            params.len()
        )));
    }
    Ok(())
}

fn invalid_input(message: String) -> DynError {
    Box::new(io::Error::new(ErrorKind::InvalidInput, message))
}

fn emit<T: Serialize>(payload: &T, destination: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(payload)?;
    match destination {
        Some(path) => {
            ensure_parent_dir(path)?;
            fs::write(path, rendered)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
        }
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
