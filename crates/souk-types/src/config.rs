use serde::{Deserialize, Serialize};

/// Process-wide configuration, immutable after startup.
///
/// Threaded explicitly through component constructors -- there is no
/// ambient global state. Loaded from `{data_dir}/config.toml` with
/// environment overrides by the infra layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// HMAC signing secret for session tokens. An empty value makes the
    /// loader generate an ephemeral random secret (tokens then die with
    /// the process).
    pub token_secret: String,
    /// Token validity window in days.
    pub token_ttl_days: i64,
    /// Argon2id memory cost in KiB.
    pub argon_memory_kib: u32,
    /// Argon2id pass count.
    pub argon_passes: u32,
    /// Argon2id parallelism degree.
    pub argon_lanes: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_days: 60,
            // OWASP-recommended Argon2id parameters.
            argon_memory_kib: 19_456,
            argon_passes: 2,
            argon_lanes: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.token_ttl_days, 60);
        assert_eq!(config.argon_memory_kib, 19_456);
        assert!(config.token_secret.is_empty());
    }
}
