//! Site settings record and its partial-update form

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Site languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zh" => Ok(Language::Zh),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language: {} (expected zh or en)", other)),
        }
    }
}

/// A string with one value per site language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub zh: String,
    pub en: String,
}

impl LocalizedText {
    pub fn new(zh: &str, en: &str) -> Self {
        Self {
            zh: zh.to_string(),
            en: en.to_string(),
        }
    }

    /// Get the value for a language
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::Zh => &self.zh,
            Language::En => &self.en,
        }
    }

    /// Overlay the sub-fields present in a patch, keeping the rest.
    fn apply(self, patch: Option<LocalizedPatch>) -> Self {
        match patch {
            Some(LocalizedPatch::Fields(fields)) => Self {
                zh: fields.zh.unwrap_or(self.zh),
                en: fields.en.unwrap_or(self.en),
            },
            Some(LocalizedPatch::Malformed(value)) => {
                tracing::debug!("Ignoring non-object localized value: {}", value);
                self
            }
            None => self,
        }
    }
}

/// The site-wide settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub title: String,
    pub subtitle: LocalizedText,
    pub description: LocalizedText,
    pub logo: String,
    pub favicon: String,
    pub author: String,
    pub language: Language,
    pub footer: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Quicksilver".to_string(),
            subtitle: LocalizedText::new("灵感，塑你所想", "Shape your story, your way."),
            description: LocalizedText::new(
                "由 Quicksilver Core 驱动的博客",
                "A blog powered by Quicksilver Core",
            ),
            logo: String::new(),
            favicon: String::new(),
            author: String::new(),
            language: Language::Zh,
            footer: "Powered by Quicksilver Core".to_string(),
        }
    }
}

impl SiteSettings {
    /// Merge a partial update onto this record.
    ///
    /// Scalars are replaced when the patch carries them. `subtitle` and
    /// `description` are merged per language; a nested value that is not an
    /// object leaves the current pair untouched.
    pub fn apply(self, patch: SettingsPatch) -> Self {
        Self {
            title: patch.title.unwrap_or(self.title),
            subtitle: self.subtitle.apply(patch.subtitle),
            description: self.description.apply(patch.description),
            logo: patch.logo.unwrap_or(self.logo),
            favicon: patch.favicon.unwrap_or(self.favicon),
            author: patch.author.unwrap_or(self.author),
            language: patch.language.unwrap_or(self.language),
            footer: patch.footer.unwrap_or(self.footer),
        }
    }

    /// Resolve the bilingual fields for one language
    pub fn localized(&self, lang: Language) -> LocalizedSettings {
        LocalizedSettings {
            language: lang,
            title: self.title.clone(),
            subtitle: self.subtitle.get(lang).to_string(),
            description: self.description.get(lang).to_string(),
            logo: self.logo.clone(),
            favicon: self.favicon.clone(),
            author: self.author.clone(),
            footer: self.footer.clone(),
        }
    }
}

/// Settings as seen by a reader of one language (footer, about metadata)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedSettings {
    pub language: Language,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub logo: String,
    pub favicon: String,
    pub author: String,
    pub footer: String,
}

/// Sub-fields of a localized value in a partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedFields {
    pub zh: Option<String>,
    pub en: Option<String>,
}

/// A localized value as received: either an object or anything else
#[derive(Debug, Clone, PartialEq)]
pub enum LocalizedPatch {
    Fields(LocalizedFields),
    Malformed(Value),
}

impl LocalizedPatch {
    /// Only a JSON object is a localized value. Each sub-field that is not
    /// a string is dropped on its own.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => LocalizedPatch::Fields(LocalizedFields {
                zh: text_field(map, "zh"),
                en: text_field(map, "en"),
            }),
            other => LocalizedPatch::Malformed(other.clone()),
        }
    }
}

impl From<LocalizedFields> for LocalizedPatch {
    fn from(fields: LocalizedFields) -> Self {
        LocalizedPatch::Fields(fields)
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        None | Some(Value::Null) => None,
        Some(other) => {
            tracing::debug!("Ignoring non-string `{}`: {}", key, other);
            None
        }
    }
}

/// How wrong-typed scalar fields are treated when building a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
    /// Reject the document (request bodies)
    Strict,
    /// Skip the field (the stored file)
    Lenient,
}

/// A partial settings document. Absent and `null` fields keep their
/// current value; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub title: Option<String>,
    pub subtitle: Option<LocalizedPatch>,
    pub description: Option<LocalizedPatch>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub author: Option<String>,
    pub language: Option<Language>,
    pub footer: Option<String>,
}

impl SettingsPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    /// Build a patch from a stored document, field by field. A field with
    /// the wrong type is skipped so that it falls back on its own.
    pub fn from_stored(map: &Map<String, Value>) -> Self {
        // Lenient mode has no error path.
        Self::from_map(map, FieldMode::Lenient).unwrap_or_default()
    }

    fn from_map(map: &Map<String, Value>, mode: FieldMode) -> Result<Self, String> {
        Ok(Self {
            title: scalar(map, "title", mode)?,
            subtitle: nested(map, "subtitle"),
            description: nested(map, "description"),
            logo: scalar(map, "logo", mode)?,
            favicon: scalar(map, "favicon", mode)?,
            author: scalar(map, "author", mode)?,
            language: scalar(map, "language", mode)?,
            footer: scalar(map, "footer", mode)?,
        })
    }
}

fn scalar<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    mode: FieldMode,
) -> Result<Option<T>, String> {
    let value = match map.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match T::deserialize(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) if mode == FieldMode::Strict => Err(format!("invalid `{}`: {}", key, e)),
        Err(e) => {
            tracing::warn!("Ignoring stored `{}`: {}", key, e);
            Ok(None)
        }
    }
}

fn nested(map: &Map<String, Value>, key: &str) -> Option<LocalizedPatch> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(LocalizedPatch::from_value(value)),
    }
}

/// Request bodies must be JSON objects with correctly typed scalars.
impl<'de> Deserialize<'de> for SettingsPatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(&map, FieldMode::Strict).map_err(de::Error::custom)
    }
}

impl From<SiteSettings> for SettingsPatch {
    fn from(settings: SiteSettings) -> Self {
        Self {
            title: Some(settings.title),
            subtitle: Some(
                LocalizedFields {
                    zh: Some(settings.subtitle.zh),
                    en: Some(settings.subtitle.en),
                }
                .into(),
            ),
            description: Some(
                LocalizedFields {
                    zh: Some(settings.description.zh),
                    en: Some(settings.description.en),
                }
                .into(),
            ),
            logo: Some(settings.logo),
            favicon: Some(settings.favicon),
            author: Some(settings.author),
            language: Some(settings.language),
            footer: Some(settings.footer),
        }
    }
}
