//! File-backed settings store

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{SettingsPatch, SiteSettings};

/// Default location of the settings document, relative to the deployment root
pub const SETTINGS_FILE: &str = "content/site-settings.json";

/// Errors raised while persisting settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to create settings directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write settings file {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes the single site settings document.
///
/// Reads never fail: a missing or unusable file yields the defaults.
/// Writes are read-modify-write and are serialized within one store;
/// separate processes writing the same file can still lose updates.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Create a store backed by the given file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store at the default location under a deployment root
    pub fn for_deployment<P: AsRef<Path>>(root: P) -> Self {
        Self::new(root.as_ref().join(SETTINGS_FILE))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current settings, falling back to defaults
    pub fn read(&self) -> SiteSettings {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {:?}, using defaults", self.path);
                return SiteSettings::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read site settings {:?}: {}", self.path, e);
                return SiteSettings::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(stored)) => {
                SiteSettings::default().apply(SettingsPatch::from_stored(&stored))
            }
            Ok(_) => {
                tracing::warn!("Site settings {:?} is not a JSON object", self.path);
                SiteSettings::default()
            }
            Err(e) => {
                tracing::warn!("Failed to parse site settings {:?}: {}", self.path, e);
                SiteSettings::default()
            }
        }
    }

    /// Merge a partial update onto the persisted settings and save the result
    pub fn write(&self, patch: SettingsPatch) -> Result<SiteSettings, SettingsError> {
        // A poisoned lock only means another writer panicked; the file is still whole.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let settings = self.read().apply(patch);

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|source| SettingsError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
                tracing::debug!("Created settings directory {:?}", dir);
            }
        }

        let content = serde_json::to_string_pretty(&settings)?;
        self.replace_file(&content)?;
        tracing::info!("Saved site settings to {:?}", self.path);

        Ok(settings)
    }

    /// Write to a sibling file and rename it over the backing file
    fn replace_file(&self, content: &str) -> Result<(), SettingsError> {
        let tmp_path = self.path.with_extension("json.tmp");
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };

        fs::write(&tmp_path, content).map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Language, LocalizedText};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn patch(json: &str) -> SettingsPatch {
        serde_json::from_str(json).unwrap()
    }

    fn store_with_subtitle(dir: &TempDir) -> SettingsStore {
        let store = SettingsStore::for_deployment(dir.path());
        store
            .write(patch(r#"{"subtitle": {"zh": "A", "en": "B"}}"#))
            .unwrap();
        store
    }

    #[test]
    fn test_missing_file_reads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::for_deployment(dir.path());
        assert_eq!(store.read(), SiteSettings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_reads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::for_deployment(dir.path());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.read(), SiteSettings::default());
    }

    #[test]
    fn test_read_backfills_nested_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"title": "Stored", "subtitle": {"en": "Only English"}, "description": "flat", "extra": 1}"#,
        )
        .unwrap();

        let settings = SettingsStore::new(&path).read();
        let defaults = SiteSettings::default();
        assert_eq!(settings.title, "Stored");
        assert_eq!(settings.subtitle.en, "Only English");
        assert_eq!(settings.subtitle.zh, defaults.subtitle.zh);
        assert_eq!(settings.description, defaults.description);
        assert_eq!(settings.footer, defaults.footer);
    }

    #[test]
    fn test_invalid_field_does_not_discard_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-settings.json");
        fs::write(
            &path,
            r#"{"title": "My Blog", "author": "Ada", "footer": "F", "language": "ja", "logo": 5}"#,
        )
        .unwrap();
        let store = SettingsStore::new(&path);

        let settings = store.read();
        assert_eq!(settings.title, "My Blog");
        assert_eq!(settings.author, "Ada");
        assert_eq!(settings.footer, "F");
        assert_eq!(settings.language, Language::Zh);
        assert_eq!(settings.logo, "");

        store.write(patch(r#"{"logo": "x.png"}"#)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["title"], "My Blog");
        assert_eq!(raw["author"], "Ada");
        assert_eq!(raw["logo"], "x.png");
        assert_eq!(raw["language"], "zh");
    }

    #[test]
    fn test_wrong_typed_stored_subfield_falls_back_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-settings.json");
        fs::write(&path, r#"{"subtitle": {"zh": 5, "en": "Kept"}}"#).unwrap();

        let settings = SettingsStore::new(&path).read();
        assert_eq!(settings.subtitle.zh, SiteSettings::default().subtitle.zh);
        assert_eq!(settings.subtitle.en, "Kept");
    }

    #[test]
    fn test_non_object_file_reads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-settings.json");
        fs::write(&path, r#"["title"]"#).unwrap();
        assert_eq!(SettingsStore::new(&path).read(), SiteSettings::default());
    }

    #[test]
    fn test_write_back_read_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_with_subtitle(&dir);
        let before = fs::read_to_string(store.path()).unwrap();

        store.write(store.read().into()).unwrap();

        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_partial_subtitle_keeps_other_language() {
        let dir = TempDir::new().unwrap();
        let store = store_with_subtitle(&dir);

        let saved = store.write(patch(r#"{"subtitle": {"zh": "C"}}"#)).unwrap();
        assert_eq!(saved.subtitle, LocalizedText::new("C", "B"));
        assert_eq!(store.read().subtitle, LocalizedText::new("C", "B"));
    }

    #[test]
    fn test_malformed_subtitle_keeps_current() {
        let dir = TempDir::new().unwrap();
        let store = store_with_subtitle(&dir);

        let saved = store
            .write(patch(r#"{"subtitle": "not-an-object"}"#))
            .unwrap();
        assert_eq!(saved.subtitle, LocalizedText::new("A", "B"));
    }

    #[test]
    fn test_empty_patch_returns_prior_state() {
        let dir = TempDir::new().unwrap();
        let store = store_with_subtitle(&dir);
        let prior = store.read();

        assert_eq!(store.write(SettingsPatch::default()).unwrap(), prior);
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep").join("nested").join("site-settings.json");
        let store = SettingsStore::new(&path);

        store.write(patch(r#"{"author": "Ada"}"#)).unwrap();

        assert!(path.exists());
        assert_eq!(store.read().author, "Ada");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_unknown_fields_are_not_written_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site-settings.json");
        fs::write(&path, r#"{"title": "Old", "legacy": true}"#).unwrap();

        let store = SettingsStore::new(&path);
        store.write(SettingsPatch::default()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["title"], "Old");
        assert!(raw.get("legacy").is_none());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("content");
        fs::write(&blocker, "a file, not a directory").unwrap();

        let store = SettingsStore::for_deployment(dir.path());
        let err = store.write(patch(r#"{"title": "X"}"#)).unwrap_err();
        assert!(matches!(err, SettingsError::Write { .. }));
    }

    #[test]
    fn test_first_write_end_to_end() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::for_deployment(dir.path());

        let initial = store.read();
        assert_eq!(initial.title, "Quicksilver");
        assert_eq!(initial.language, Language::Zh);

        store
            .write(patch(r#"{"title": "My Blog", "footer": "© 2024"}"#))
            .unwrap();

        let settings = store.read();
        assert_eq!(settings.title, "My Blog");
        assert_eq!(settings.footer, "© 2024");
        assert_eq!(
            settings,
            SiteSettings {
                title: "My Blog".to_string(),
                footer: "© 2024".to_string(),
                ..SiteSettings::default()
            }
        );
    }

    #[test]
    fn test_concurrent_writes_keep_both_fields() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SettingsStore::for_deployment(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let body = if i % 2 == 0 {
                        r#"{"title": "T"}"#
                    } else {
                        r#"{"author": "A"}"#
                    };
                    store.write(patch(body)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let settings = store.read();
        assert_eq!(settings.title, "T");
        assert_eq!(settings.author, "A");
    }
}
