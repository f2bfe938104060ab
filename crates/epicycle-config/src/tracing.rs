// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Global subscriber: an `EnvFilter`, a stderr fmt layer and an optional
//! Chrome trace recorder.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INSTALLED: AtomicBool = AtomicBool::new(false);
static CHROME_GUARD: Mutex<Option<FlushGuard>> = Mutex::new(None);

/// Environment variable naming a Chrome trace file to record into.
pub const CHROME_TRACE_ENV: &str = "EPICYCLE_TRACE_CHROME";

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// What the subscriber records and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingOptions {
    /// `EnvFilter` directives, e.g. `warn,ep_core=debug`.
    pub directives: String,
    pub chrome_trace: Option<PathBuf>,
    pub ansi: bool,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            directives: DEFAULT_DIRECTIVES.to_string(),
            chrome_trace: None,
            ansi: false,
        }
    }
}

impl TracingOptions {
    /// Reads `RUST_LOG` and [`CHROME_TRACE_ENV`]; colours follow whether
    /// stderr is a terminal.
    pub fn from_env() -> Result<Self, InitError> {
        Ok(Self {
            directives: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_DIRECTIVES.into()),
            chrome_trace: chrome_trace_path()?,
            ansi: std::io::stderr().is_terminal(),
        })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    }
}

/// Installs the global subscriber configured from the environment.
pub fn init_tracing() -> Result<(), InitError> {
    install(TracingOptions::from_env()?)
}

/// Installs the global subscriber described by `options`.
///
/// Only the first successful call in a process takes effect; later calls,
/// or a subscriber installed by someone else, yield
/// [`InitError::AlreadyInitialised`].
pub fn install(options: TracingOptions) -> Result<(), InitError> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Err(InitError::AlreadyInitialised);
    }

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(options.ansi);
    let mut guard = None;
    let chrome_layer = options.chrome_trace.as_ref().map(|path| {
        let (layer, flush) = ChromeLayerBuilder::new()
            .file(path)
            .include_args(true)
            .build();
        guard = Some(flush);
        layer
    });

    Registry::default()
        .with(options.filter())
        .with(fmt_layer)
        .with(chrome_layer)
        .try_init()
        .map_err(|_| InitError::AlreadyInitialised)?;

    if let Ok(mut slot) = CHROME_GUARD.lock() {
        *slot = guard;
    }
    Ok(())
}

/// Finishes the Chrome trace file, if one is being recorded. Events after
/// this call are no longer written to it.
pub fn flush_chrome_trace() {
    let guard = CHROME_GUARD.lock().ok().and_then(|mut slot| slot.take());
    drop(guard);
}

fn chrome_trace_path() -> Result<Option<PathBuf>, InitError> {
    match std::env::var(CHROME_TRACE_ENV) {
        Ok(raw) if !raw.trim().is_empty() => Ok(Some(PathBuf::from(raw))),
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(InitError::Env(err)),
    }
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    #[error("failed to read {CHROME_TRACE_ENV}: {0}")]
    Env(std::env::VarError),
}
