//! TOML configuration with environment fallbacks.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BankPanelError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BankPanelConfig {
    pub gateway: GatewayConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub provisioning: ProvisioningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8787 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded SQLite database.
    #[default]
    Local,
    /// Hosted auth + REST backend.
    Supabase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Project URL of the hosted backend (e.g. https://xyz.supabase.co)
    #[serde(default)]
    pub url: String,
    /// Service-role key; never sent to browsers.
    #[serde(default)]
    pub service_role_key: String,
    /// SQLite file for the local backend. `~` is expanded.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String { "~/.bankpanel/bankpanel.db".into() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Local,
            url: String::new(),
            service_role_key: String::new(),
            db_path: default_db_path(),
        }
    }
}

impl BackendConfig {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.db_path).into_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl() -> i64 { 24 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl() }
    }
}

/// How the profile row of a new staff member comes into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    /// The provisioner inserts the profile itself.
    #[default]
    Insert,
    /// A backend trigger inserts it; the provisioner waits and re-reads.
    Trigger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    #[serde(default)]
    pub profile_mode: ProfileMode,
    #[serde(default = "default_verify_delay")]
    pub verify_delay_ms: u64,
}

fn default_verify_delay() -> u64 { 100 }

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self { profile_mode: ProfileMode::Insert, verify_delay_ms: default_verify_delay() }
    }
}

impl BankPanelConfig {
    /// `~/.bankpanel/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bankpanel")
            .join("config.toml")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BankPanelError::config(format!("Read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BankPanelError::config(format!("Parse error: {e}")))
    }

    /// Load `path` when it exists, defaults otherwise, then apply env fallbacks.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            Self::load_from(path)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Fill empty secrets from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.backend.url.is_empty() {
            if let Some(v) = lookup("SUPABASE_URL") {
                self.backend.url = v;
            }
        }
        if self.backend.service_role_key.is_empty() {
            if let Some(v) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
                self.backend.service_role_key = v;
            }
        }
        if self.auth.jwt_secret.is_empty() {
            if let Some(v) = lookup("BANKPANEL_JWT_SECRET") {
                self.auth.jwt_secret = v;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(BankPanelError::config("auth.jwt_secret is empty (set BANKPANEL_JWT_SECRET)"));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(BankPanelError::config("auth.token_ttl_hours must be positive"));
        }
        if self.backend.kind == BackendKind::Supabase {
            if self.backend.url.trim().is_empty() {
                return Err(BankPanelError::config("backend.url is required for the supabase backend"));
            }
            if self.backend.service_role_key.trim().is_empty() {
                return Err(BankPanelError::config(
                    "backend.service_role_key is required for the supabase backend",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BankPanelConfig::default();
        assert_eq!(cfg.gateway.port, 8787);
        assert_eq!(cfg.backend.kind, BackendKind::Local);
        assert_eq!(cfg.provisioning.profile_mode, ProfileMode::Insert);
        assert_eq!(cfg.provisioning.verify_delay_ms, 100);
        assert!(cfg.backend.db_path().ends_with("bankpanel.db"));
    }

    #[test]
    fn test_parse_toml() {
        let cfg = BankPanelConfig::from_toml(
            r#"
[gateway]
port = 9000

[backend]
kind = "supabase"
url = "https://demo.supabase.co"
service_role_key = "service-key"

[provisioning]
profile_mode = "trigger"
"#,
        )
        .unwrap();
        assert_eq!(cfg.gateway.port, 9000);
        assert_eq!(cfg.gateway.host, "127.0.0.1");
        assert_eq!(cfg.backend.kind, BackendKind::Supabase);
        assert_eq!(cfg.provisioning.profile_mode, ProfileMode::Trigger);
        assert_eq!(cfg.auth.token_ttl_hours, 24);
    }

    #[test]
    fn test_env_fallbacks_only_fill_empty() {
        let mut cfg = BankPanelConfig::default();
        cfg.backend.url = "https://configured".into();
        cfg.apply_env(|key| match key {
            "SUPABASE_URL" => Some("https://from-env".into()),
            "BANKPANEL_JWT_SECRET" => Some("env-secret".into()),
            _ => None,
        });
        assert_eq!(cfg.backend.url, "https://configured");
        assert_eq!(cfg.auth.jwt_secret, "env-secret");
        assert!(cfg.backend.service_role_key.is_empty());
    }

    #[test]
    fn test_validate() {
        let mut cfg = BankPanelConfig::default();
        assert!(cfg.validate().is_err());

        cfg.auth.jwt_secret = "secret".into();
        assert!(cfg.validate().is_ok());

        cfg.backend.kind = BackendKind::Supabase;
        assert!(cfg.validate().is_err());
        cfg.backend.url = "https://demo.supabase.co".into();
        cfg.backend.service_role_key = "key".into();
        assert!(cfg.validate().is_ok());
    }
}
