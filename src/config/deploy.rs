//! Deployment configuration (quicksilver.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name at the deployment root
pub const CONFIG_FILE: &str = "quicksilver.yml";

/// Main deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Content directory, relative to the deployment root
    pub content_dir: String,
    /// Settings document name inside the content directory
    pub settings_file: String,

    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            settings_file: "site-settings.json".to_string(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl DeployConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
        let config: DeployConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Load `quicksilver.yml` from a deployment root, or use defaults if absent
    pub fn load_from_root<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if path.exists() {
            tracing::debug!("Loading configuration from {:?}", path);
            Self::load(&path)
        } else {
            tracing::debug!("No {} found, using default configuration", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Path of the settings document under a deployment root
    pub fn settings_path<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref()
            .join(&self.content_dir)
            .join(&self.settings_file)
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

/// Bearer tokens accepted by the CMS API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenConfig>,
}

/// One accepted token and the user it signs in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub token: String,
    pub id: String,
    pub name: String,
    pub image: String,
}

/// Request security checks for mutating API calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Origins allowed besides the server's own host
    pub allowed_origins: Vec<String>,
}
