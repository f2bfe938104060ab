// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use rand::{rngs::StdRng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Deterministic runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterminismConfig {
    /// Whether deterministic execution is enabled globally.
    pub enabled: bool,
    /// Base seed used to derive per-component seeds.
    pub base_seed: u64,
}

impl Default for DeterminismConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_seed: 42,
        }
    }
}

impl DeterminismConfig {
    /// Builds a configuration snapshot from environment variables.
    fn from_env() -> Self {
        let enabled = std::env::var("EPICYCLE_DETERMINISTIC")
            .ok()
            .map(|v| !matches!(v.as_str(), "0" | "false" | "False" | "off" | "OFF"))
            .unwrap_or(false);

        let base_seed = std::env::var("EPICYCLE_DETERMINISTIC_SEED")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(42);

        Self { enabled, base_seed }
    }

    /// Derives a deterministic seed for a given component label.
    pub fn seed_for<L: Hash>(&self, label: L) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.base_seed.hash(&mut hasher);
        label.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns an RNG for `label`: seeded when enabled, entropy otherwise.
    pub fn rng_for(&self, label: &str) -> StdRng {
        if self.enabled {
            StdRng::seed_from_u64(self.seed_for(label))
        } else {
            StdRng::from_entropy()
        }
    }
}

static CONFIG: OnceLock<DeterminismConfig> = OnceLock::new();

/// Returns the lazily initialised deterministic configuration.
pub fn config() -> &'static DeterminismConfig {
    CONFIG.get_or_init(DeterminismConfig::from_env)
}

/// Overrides the deterministic configuration. Intended for tests and hosts
/// that configure the process before the first RNG is drawn; once a
/// configuration is installed later calls return the existing one.
pub fn configure(cfg: DeterminismConfig) -> &'static DeterminismConfig {
    CONFIG.get_or_init(|| cfg)
}

/// Returns a RNG derived from the provided label. When determinism is disabled
/// this falls back to a random seed from the operating system.
pub fn rng_from_label(label: &str) -> StdRng {
    config().rng_for(label)
}

/// Returns a RNG seeded from an optional explicit seed, respecting deterministic
/// overrides when the seed is not provided.
pub fn rng_from_optional(seed: Option<u64>, label: &str) -> StdRng {
    match seed {
        Some(value) => StdRng::seed_from_u64(value),
        None => rng_from_label(label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
    use std::sync::{Mutex, OnceLock};

    fn with_env(vars: &[(&str, Option<&str>)], test: impl FnOnce()) {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let _lock = GUARD.get_or_init(|| Mutex::new(())).lock().unwrap();

        let snapshot: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var(key).ok();
                match value {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
                ((*key).to_string(), previous)
            })
            .collect();

        let result = catch_unwind(AssertUnwindSafe(test));

        for (key, value) in snapshot {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }

        if let Err(err) = result {
            resume_unwind(err);
        }
    }

    #[test]
    fn defaults_disable_determinism() {
        with_env(
            &[
                ("EPICYCLE_DETERMINISTIC", None),
                ("EPICYCLE_DETERMINISTIC_SEED", None),
            ],
            || {
                let cfg = DeterminismConfig::from_env();
                assert!(!cfg.enabled);
                assert_eq!(cfg.base_seed, 42);
            },
        );
    }

    #[test]
    fn explicit_enables_override_defaults() {
        with_env(
            &[
                ("EPICYCLE_DETERMINISTIC", Some("1")),
                ("EPICYCLE_DETERMINISTIC_SEED", Some("1337")),
            ],
            || {
                let cfg = DeterminismConfig::from_env();
                assert!(cfg.enabled);
                assert_eq!(cfg.base_seed, 1337);
            },
        );
    }

    #[test]
    fn textual_false_values_disable_flags() {
        with_env(&[("EPICYCLE_DETERMINISTIC", Some("off"))], || {
            let cfg = DeterminismConfig::from_env();
            assert!(!cfg.enabled);
        });
    }

    #[test]
    fn derived_seeds_are_stable_per_label() {
        let cfg = DeterminismConfig {
            enabled: true,
            base_seed: 99,
        };
        assert_eq!(cfg.seed_for("alpha"), cfg.seed_for("alpha"));
        assert_ne!(cfg.seed_for("alpha"), cfg.seed_for("beta"));
    }

    #[test]
    fn enabled_config_replays_the_same_stream() {
        let cfg = DeterminismConfig {
            enabled: true,
            base_seed: 7,
        };
        let mut a = cfg.rng_for("noise");
        let mut b = cfg.rng_for("noise");
        let first: Vec<f64> = (0..4).map(|_| a.gen::<f64>()).collect();
        let second: Vec<f64> = (0..4).map(|_| b.gen::<f64>()).collect();
        assert_eq!(first, second);
    }
}
