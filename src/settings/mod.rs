//! Site settings module - the settings record and its file-backed store

mod model;
mod store;

pub use model::{
    Language, LocalizedFields, LocalizedPatch, LocalizedSettings, LocalizedText, SettingsPatch,
    SiteSettings,
};
pub use store::{SettingsError, SettingsStore, SETTINGS_FILE};
