//! Initialize a new deployment

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{DeployConfig, CONFIG_FILE};

/// Default quicksilver.yml content
const DEFAULT_CONFIG: &str = r#"# Quicksilver deployment configuration

# Content
content_dir: content
settings_file: site-settings.json

# API server
server:
  ip: localhost
  port: 3000

# Bearer tokens accepted for settings updates
auth:
  tokens: []
  #  - token: change-me
  #    id: "1"
  #    name: Admin
  #    image: ""

# Origins allowed to call the API besides the server itself
security:
  allowed_origins: []
"#;

/// Create quicksilver.yml and the content directory
pub fn init_deployment(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("File already exists: {:?}", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::info!("Created: {:?}", config_path);

    let config = DeployConfig::load(&config_path)?;
    let content_dir = target_dir.join(&config.content_dir);
    fs::create_dir_all(&content_dir)?;
    tracing::info!("Created: {:?}", content_dir);

    Ok(())
}
