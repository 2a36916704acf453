//! Inspect and edit site settings from the command line

use anyhow::Result;

use crate::settings::{Language, SettingsPatch};
use crate::Quicksilver;

/// Print the current settings, optionally resolved for one language
pub fn show(app: &Quicksilver, lang: Option<Language>) -> Result<()> {
    let settings = app.settings_store().read();
    let output = match lang {
        Some(lang) => serde_json::to_string_pretty(&settings.localized(lang))?,
        None => serde_json::to_string_pretty(&settings)?,
    };
    println!("{}", output);
    Ok(())
}

/// Apply a partial update and print the saved settings
pub fn set(app: &Quicksilver, patch: SettingsPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field, see --help");
    }

    let store = app.settings_store();
    let settings = store.write(patch)?;
    println!("Saved: {:?}", store.path());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LocalizedFields, LocalizedPatch};

    #[test]
    fn test_set_writes_to_deployment() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = Quicksilver::new(dir.path()).unwrap();

        let patch = SettingsPatch {
            title: Some("CLI Blog".to_string()),
            description: Some(LocalizedPatch::Fields(LocalizedFields {
                en: Some("Written from a shell".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        set(&app, patch).unwrap();

        let settings = app.settings_store().read();
        assert_eq!(settings.title, "CLI Blog");
        assert_eq!(settings.description.en, "Written from a shell");
        assert!(dir.path().join("content/site-settings.json").exists());
    }

    #[test]
    fn test_set_rejects_empty_patch() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = Quicksilver::new(dir.path()).unwrap();
        assert!(set(&app, SettingsPatch::default()).is_err());
        assert!(!app.settings_path().exists());
    }
}
