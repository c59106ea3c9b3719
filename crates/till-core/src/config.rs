//! # Configuration
//!
//! Settings read once when a host initializes the core.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after initialization, so no lock is needed.

use serde::{Deserialize, Serialize};

use crate::json::{JsonLimits, DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};

/// Fallback tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,till_core=debug,till_ffi=debug";

/// Environment variable overriding [`CoreConfig::max_json_depth`].
pub const ENV_JSON_MAX_DEPTH: &str = "TILL_JSON_MAX_DEPTH";

/// Environment variable overriding [`CoreConfig::log_filter`].
pub const ENV_LOG_FILTER: &str = "TILL_LOG_FILTER";

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Maximum nesting of arrays/objects accepted in JSON input.
    /// Default: 128, capped at [`MAX_DEPTH_CEILING`]
    pub max_json_depth: usize,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            max_json_depth: DEFAULT_MAX_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CoreConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Environment Variables
    /// - `TILL_JSON_MAX_DEPTH`: positive integer, values above 512 are capped
    /// - `TILL_LOG_FILTER`: tracing filter directive
    ///
    /// Unset or invalid values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CoreConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CoreConfig::default();

        if let Some(depth) = lookup(ENV_JSON_MAX_DEPTH) {
            match depth.trim().parse::<usize>() {
                Ok(depth) if depth > MAX_DEPTH_CEILING => {
                    tracing::warn!(
                        value = depth,
                        ceiling = MAX_DEPTH_CEILING,
                        "Capping {}",
                        ENV_JSON_MAX_DEPTH
                    );
                    config.max_json_depth = MAX_DEPTH_CEILING;
                }
                Ok(depth) if depth > 0 => config.max_json_depth = depth,
                _ => tracing::warn!(value = %depth, "Ignoring invalid {}", ENV_JSON_MAX_DEPTH),
            }
        }

        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        config
    }

    /// Parser limits derived from this configuration.
    pub fn json_limits(&self) -> JsonLimits {
        JsonLimits::new(self.max_json_depth)
    }
}
