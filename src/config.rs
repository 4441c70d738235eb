// Engine and service configuration, read from the environment (.env honoured).

use std::net::SocketAddr;

pub const DEFAULT_STAKE_AMOUNT: u64 = 100;
pub const DEFAULT_ADMIN_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_STATE_FILE: &str = "voting_state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Exact deposit required per vote
    pub stake_amount: u64,
    /// Only identity allowed to create and close questions
    pub admin_address: String,
    /// Account the vault sweeps into
    pub vault_address: String,
    pub bind_addr: SocketAddr,
    pub state_file: String,
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "Invalid {}={:?}: {}", key, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stake_amount: DEFAULT_STAKE_AMOUNT,
            admin_address: DEFAULT_ADMIN_ADDRESS.to_string(),
            vault_address: DEFAULT_ADMIN_ADDRESS.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            state_file: DEFAULT_STATE_FILE.to_string(),
            log_level: tracing::Level::INFO,
        }
    }
}

impl EngineConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stake_amount = match lookup("STAKE_AMOUNT") {
            Some(raw) => {
                let amount: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    key: "STAKE_AMOUNT",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if amount == 0 {
                    return Err(ConfigError::Invalid {
                        key: "STAKE_AMOUNT",
                        value: raw,
                        reason: "must be greater than zero".into(),
                    });
                }
                amount
            }
            None => DEFAULT_STAKE_AMOUNT,
        };

        let admin_address = non_empty(lookup("ADMIN_ADDRESS"), "ADMIN_ADDRESS")?
            .unwrap_or_else(|| DEFAULT_ADMIN_ADDRESS.to_string());
        let vault_address = non_empty(lookup("VAULT_ADDRESS"), "VAULT_ADDRESS")?
            .unwrap_or_else(|| admin_address.clone());

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let state_file = lookup("STATE_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());

        let level_raw = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = level_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "LOG_LEVEL",
            value: level_raw.clone(),
            reason: "expected trace, debug, info, warn or error".into(),
        })?;

        Ok(Self {
            stake_amount,
            admin_address,
            vault_address,
            bind_addr,
            state_file,
            log_level,
        })
    }
}

fn non_empty(value: Option<String>, key: &'static str) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Invalid {
            key,
            value: v,
            reason: "must not be empty".into(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.vault_address, config.admin_address);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("STAKE_AMOUNT", "250"),
            ("ADMIN_ADDRESS", "0xADMIN"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.stake_amount, 250);
        assert_eq!(config.admin_address, "0xADMIN");
        assert_eq!(config.vault_address, "0xADMIN");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::from_lookup(lookup_from(&[("STAKE_AMOUNT", "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[("STAKE_AMOUNT", "lots")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[("BIND_ADDR", "nowhere")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[("LOG_LEVEL", "loud")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[("VAULT_ADDRESS", " ")])).is_err());
    }
}
