//! quicksilver: site settings for the Quicksilver blog and CMS
//!
//! This crate owns the site-wide settings document shared by the public
//! blog and the CMS: a file-backed store with partial-update merging, and
//! the HTTP API the CMS edits it through.

pub mod auth;
pub mod commands;
pub mod config;
pub mod server;
pub mod settings;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A Quicksilver deployment
#[derive(Clone)]
pub struct Quicksilver {
    /// Deployment configuration
    pub config: config::DeployConfig,
    /// Deployment root
    pub base_dir: PathBuf,
}

impl Quicksilver {
    /// Open the deployment rooted at a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::DeployConfig::load_from_root(&base_dir)?;

        Ok(Self { config, base_dir })
    }

    /// Path of the site settings document
    pub fn settings_path(&self) -> PathBuf {
        self.config.settings_path(&self.base_dir)
    }

    /// A store handle for the site settings document
    pub fn settings_store(&self) -> settings::SettingsStore {
        settings::SettingsStore::new(self.settings_path())
    }
}
