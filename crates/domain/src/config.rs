//! Ambient configuration layer: a minimal, optional TOML-backed `Config`
//! covering the resolvers list for the simple-query family, the default
//! query timeout, and trust-anchor overrides for testing.
//!
//! One struct per concern, `serde(default = ...)` per field, a `Default`
//! impl, and a single `load` entry point — collapsed to one file since
//! this tool's config surface is far smaller than a full recursive
//! resolver's (upstream/health/blocking/...).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A single DS-record trust anchor override, for pointing the walker at
/// a synthetic zone's KSK digest instead of the bundled IANA root
/// anchors (§4.5's "trust-anchor overrides for testing").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrustAnchorEntry {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest_hex: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Extra fixed resolvers for the simple-query battery (§4.9), in
    /// addition to the host's own default resolver, which is always
    /// probed regardless of this list.
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// When non-empty, replaces the bundled IANA root KSK anchors
    /// (§4.5/§6) entirely — for validating a test-only zone whose chain
    /// does not descend from the real root.
    #[serde(default)]
    pub trust_anchors: Vec<TrustAnchorEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolvers: default_resolvers(),
            query_timeout_ms: default_query_timeout_ms(),
            trust_anchors: Vec::new(),
        }
    }
}

impl Config {
    /// Loads from `path` if given; falls back to [`Config::default`]
    /// when `path` is `None` — the config file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn default_resolvers() -> Vec<String> {
    vec!["8.8.8.8".to_string(), "9.9.9.9".to_string(), "1.1.1.1".to_string()]
}

fn default_query_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_trust_anchor_overrides() {
        let config = Config::default();
        assert!(config.trust_anchors.is_empty());
        assert_eq!(config.resolvers.len(), 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_path_falls_back_to_default() {
        let config = Config::load(None).expect("no path is not an error");
        assert_eq!(config.query_timeout_ms, default_query_timeout_ms());
    }

    #[test]
    fn parses_trust_anchor_overrides_from_toml() {
        let toml_src = r#"
            query_timeout_ms = 2000

            [[trust_anchors]]
            key_tag = 12345
            algorithm = 8
            digest_type = 2
            digest_hex = "AA"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.query_timeout_ms, 2000);
        assert_eq!(config.trust_anchors.len(), 1);
        assert_eq!(config.trust_anchors[0].key_tag, 12345);
    }
}
