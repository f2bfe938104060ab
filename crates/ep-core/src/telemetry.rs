// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Logging setup for processes that embed the engine.

use std::sync::OnceLock;

use epicycle_config::tracing::{self as config_tracing, InitError, CHROME_TRACE_ENV};
use tracing::{debug, warn};

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs the `epicycle-config` subscriber once per process.
///
/// Returns whether that subscriber is active. A subscriber the host set up
/// earlier is left in place and yields `false`; repeated calls return the
/// first answer.
pub fn init_tracing() -> bool {
    *INSTALLED.get_or_init(|| match config_tracing::init_tracing() {
        Ok(()) => {
            debug!(
                chrome = std::env::var_os(CHROME_TRACE_ENV).is_some(),
                "tracing initialised"
            );
            true
        }
        Err(InitError::AlreadyInitialised) => false,
        Err(err) => {
            warn!(%err, "tracing subscriber not installed");
            false
        }
    })
}

/// Completes the Chrome trace file before the process exits.
pub fn finish() {
    config_tracing::flush_chrome_trace();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_calls_agree() {
        let first = init_tracing();
        assert_eq!(init_tracing(), first);
        finish();
        finish();
    }
}
