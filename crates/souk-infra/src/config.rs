//! Configuration loader for Souk.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`CoreConfig`], falling back to defaults when the file is missing or
//! malformed. `SOUK_TOKEN_SECRET` overrides the file; when no secret is
//! configured at all, an ephemeral random one is generated and a
//! warning logged (tokens then die with the process).

use std::path::{Path, PathBuf};

use rand::RngCore;
use rand::rngs::OsRng;

use souk_types::config::CoreConfig;

use crate::crypto::hex_encode;

/// Resolve the data directory: `SOUK_DATA_DIR` env var, falling back to
/// `~/.souk`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SOUK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".souk")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unparseable file: warn and use defaults.
/// - `SOUK_TOKEN_SECRET` set: overrides the file's secret.
/// - No secret from any source: generate an ephemeral random secret.
pub async fn load_config(data_dir: &Path) -> CoreConfig {
    let config_path = data_dir.join("config.toml");

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<CoreConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                CoreConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            CoreConfig::default()
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            CoreConfig::default()
        }
    };

    if let Ok(secret) = std::env::var("SOUK_TOKEN_SECRET") {
        if !secret.is_empty() {
            config.token_secret = secret;
        }
    }

    if config.token_secret.is_empty() {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        config.token_secret = hex_encode(&bytes);
        tracing::warn!(
            "no token secret configured; generated an ephemeral one -- \
             sessions will not survive a restart"
        );
    }

    config
}
