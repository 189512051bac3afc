use deaddrop_core::MAX_CONTENT_LEN;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_RETENTION_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_PUSH_TIMEOUT_MS: u64 = 5_000;

/// Relay tuning knobs, loadable from TOML.
///
/// Every field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// How long an undelivered message stays staged before the sweeper
    /// purges it.
    pub retention_secs: u64,
    /// How often the sweeper runs. Zero disables it.
    pub sweep_interval_secs: u64,
    /// Upper bound on a single transport push.
    pub push_timeout_ms: u64,
    /// Largest accepted message body, in bytes.
    pub max_content_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            retention_secs: DEFAULT_RETENTION_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            push_timeout_ms: DEFAULT_PUSH_TIMEOUT_MS,
            max_content_len: MAX_CONTENT_LEN,
        }
    }
}

impl RelayConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RelayConfig::from_toml("").expect("parse empty config");
        assert_eq!(config.retention_secs, DEFAULT_RETENTION_SECS);
        assert_eq!(config.sweep_interval_secs, DEFAULT_SWEEP_INTERVAL_SECS);
        assert_eq!(config.push_timeout_ms, DEFAULT_PUSH_TIMEOUT_MS);
        assert_eq!(config.max_content_len, MAX_CONTENT_LEN);
    }

    #[test]
    fn overrides_apply() {
        let config = RelayConfig::from_toml(
            "retention_secs = 3600\nsweep_interval_secs = 0\npush_timeout_ms = 250\n",
        )
        .expect("parse overrides");
        assert_eq!(config.retention(), Duration::from_secs(3600));
        assert_eq!(config.sweep_interval(), Duration::ZERO);
        assert_eq!(config.push_timeout(), Duration::from_millis(250));
        assert_eq!(config.max_content_len, MAX_CONTENT_LEN);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(RelayConfig::from_toml("retention_secs = \"forever\"").is_err());
    }
}
