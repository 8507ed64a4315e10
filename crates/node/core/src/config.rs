//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments given explicitly (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`VESTA_` prefix, `__` separates sections)
//! 4. Defaults

use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vesta_discovery::DiscoveryArgs;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VESTA_";

/// Complete process configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VestaConfig {
    /// Discovery timeouts and report layer.
    pub discovery: DiscoveryArgs,

    /// Wallet address of this node, used for the "this SP" section of reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_address: Option<String>,
}

impl VestaConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(VestaConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Overwrite discovery settings the user passed explicitly on the command line.
    ///
    /// `explicit` reports whether the argument with the given id was supplied
    /// by the user rather than defaulted by clap.
    pub fn apply_cli(&mut self, cli: &DiscoveryArgs, explicit: impl Fn(&str) -> bool) {
        if explicit("url_timeout_ms") {
            self.discovery.url_timeout_ms = cli.url_timeout_ms;
        }
        if explicit("shard_timeout_ms") {
            self.discovery.shard_timeout_ms = cli.shard_timeout_ms;
        }
        if explicit("request_timeout_ms") {
            self.discovery.request_timeout_ms = cli.request_timeout_ms;
        }
        if explicit("report_layer") {
            self.discovery.report_layer = cli.report_layer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vesta_discovery::api::PermissionLayerId;

    #[test]
    fn test_default_config() {
        let config = VestaConfig::default();
        assert_eq!(config.discovery.url_timeout_ms, 2000);
        assert_eq!(config.discovery.report_layer, PermissionLayerId::Eth);
        assert!(config.own_address.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("vesta.toml");

        fs::write(
            &config_path,
            r#"
own_address = "0xabc"

[discovery]
url_timeout_ms = 750
report_layer = "neo"
"#,
        )
        .unwrap();

        let config = VestaConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.discovery.url_timeout_ms, 750);
        assert_eq!(config.discovery.report_layer, PermissionLayerId::Neo);
        assert_eq!(config.discovery.shard_timeout_ms, 5000);
        assert_eq!(config.own_address.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = VestaConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.discovery.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_unknown_report_layer_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("vesta.toml");
        fs::write(&config_path, "[discovery]\nreport_layer = \"dogecoin\"\n").unwrap();

        assert!(VestaConfig::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_only_explicit_cli_values_override() {
        let mut config = VestaConfig::default();
        config.discovery.url_timeout_ms = 750;

        let cli = DiscoveryArgs {
            url_timeout_ms: 2000,
            shard_timeout_ms: 100,
            ..Default::default()
        };
        config.apply_cli(&cli, |id| id == "shard_timeout_ms");

        assert_eq!(config.discovery.url_timeout_ms, 750);
        assert_eq!(config.discovery.shard_timeout_ms, 100);
    }
}
