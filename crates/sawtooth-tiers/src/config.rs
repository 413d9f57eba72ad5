//! Configuration for the filesystem tier.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable                   | Default                      |
//! |----------------------------|------------------------------|
//! | `SAWTOOTH_CACHE_DIR`       | `<platform cache>/sawtooth`  |
//! | `SAWTOOTH_CACHE_NAMESPACE` | `default`                    |
//! | `SAWTOOTH_SHARD_DEPTH`     | `2`                          |
//! | `SAWTOOTH_TIER_METRICS`    | off                          |
//!
//! Values are trimmed; a variable that is unset, blank or unparsable falls
//! back to its default.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CACHE_DIR_ENV: &str = "SAWTOOTH_CACHE_DIR";
pub const NAMESPACE_ENV: &str = "SAWTOOTH_CACHE_NAMESPACE";
pub const SHARD_DEPTH_ENV: &str = "SAWTOOTH_SHARD_DEPTH";
pub const METRICS_ENV: &str = "SAWTOOTH_TIER_METRICS";

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_SHARD_DEPTH: usize = 2;
/// Each shard level consumes two hex characters of a 64-character digest.
pub const MAX_SHARD_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsTierConfig {
    /// Cache root shared by all namespaces.
    pub root: PathBuf,
    /// Subdirectory of `root` this tier reads and writes.
    pub namespace: String,
    /// Number of two-character directory levels above each value file.
    pub shard_depth: usize,
    /// Attach hit/miss/write counters to the tier.
    pub metrics: bool,
}

impl Default for FsTierConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            shard_depth: DEFAULT_SHARD_DEPTH,
            metrics: false,
        }
    }
}

impl FsTierConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Build a config from `SAWTOOTH_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            root: env_value(CACHE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_root),
            namespace: env_value(NAMESPACE_ENV).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            shard_depth: env_parsed(SHARD_DEPTH_ENV)
                .unwrap_or(DEFAULT_SHARD_DEPTH)
                .min(MAX_SHARD_DEPTH),
            metrics: env_flag(METRICS_ENV),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_shard_depth(mut self, depth: usize) -> Self {
        self.shard_depth = depth.min(MAX_SHARD_DEPTH);
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Directory holding this namespace's values.
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.namespace)
    }
}

fn default_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sawtooth")
}

// ==================== Environment ====================

/// Trimmed value of `key`, or `None` when unset or blank.
fn env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    env_value(key)?.parse().ok()
}

/// `1`, `true`, `yes` or `on`, case-insensitive.
fn env_flag(key: &str) -> bool {
    env_value(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FsTierConfig::new("/tmp/cache");
        assert_eq!(config.namespace, "default");
        assert_eq!(config.shard_depth, 2);
        assert!(!config.metrics);
        assert_eq!(config.dir(), PathBuf::from("/tmp/cache/default"));
    }

    #[test]
    fn test_builder_clamps_shard_depth() {
        let config = FsTierConfig::new("/tmp/cache")
            .with_namespace("users")
            .with_shard_depth(40)
            .with_metrics(true);
        assert_eq!(config.shard_depth, MAX_SHARD_DEPTH);
        assert!(config.metrics);
        assert_eq!(config.dir(), PathBuf::from("/tmp/cache/users"));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(CACHE_DIR_ENV, "/var/cache/sawtooth-test");
        std::env::set_var(NAMESPACE_ENV, "orders");
        std::env::set_var(SHARD_DEPTH_ENV, "1");
        std::env::set_var(METRICS_ENV, "true");

        let config = FsTierConfig::from_env();
        assert_eq!(config.root, PathBuf::from("/var/cache/sawtooth-test"));
        assert_eq!(config.namespace, "orders");
        assert_eq!(config.shard_depth, 1);
        assert!(config.metrics);

        std::env::remove_var(CACHE_DIR_ENV);
        std::env::remove_var(NAMESPACE_ENV);
        std::env::remove_var(SHARD_DEPTH_ENV);
        std::env::remove_var(METRICS_ENV);
    }

    #[test]
    fn test_env_values_are_trimmed_and_blank_is_unset() {
        std::env::set_var("SAWTOOTH_TEST_BLANK", "   ");
        std::env::set_var("SAWTOOTH_TEST_PADDED", "  users \t");
        std::env::set_var("SAWTOOTH_TEST_DEPTH", " 3 ");
        std::env::set_var("SAWTOOTH_TEST_BAD_DEPTH", "deep");

        assert_eq!(env_value("SAWTOOTH_TEST_BLANK"), None);
        assert_eq!(env_value("SAWTOOTH_TEST_PADDED").as_deref(), Some("users"));
        assert_eq!(env_parsed::<usize>("SAWTOOTH_TEST_DEPTH"), Some(3));
        assert_eq!(env_parsed::<usize>("SAWTOOTH_TEST_BAD_DEPTH"), None);
        assert_eq!(env_parsed::<usize>("SAWTOOTH_TEST_UNSET_DEPTH"), None);

        std::env::remove_var("SAWTOOTH_TEST_BLANK");
        std::env::remove_var("SAWTOOTH_TEST_PADDED");
        std::env::remove_var("SAWTOOTH_TEST_DEPTH");
        std::env::remove_var("SAWTOOTH_TEST_BAD_DEPTH");
    }

    #[test]
    fn test_env_flag() {
        std::env::set_var("SAWTOOTH_TEST_FLAG_ON", " YES ");
        std::env::set_var("SAWTOOTH_TEST_FLAG_OFF", "off");

        assert!(env_flag("SAWTOOTH_TEST_FLAG_ON"));
        assert!(!env_flag("SAWTOOTH_TEST_FLAG_OFF"));
        assert!(!env_flag("SAWTOOTH_TEST_FLAG_UNSET"));

        std::env::remove_var("SAWTOOTH_TEST_FLAG_ON");
        std::env::remove_var("SAWTOOTH_TEST_FLAG_OFF");
    }
}
