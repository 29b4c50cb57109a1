// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Campaign draft types
//!
//! [`CampaignDraft`] is the JSON shape handed over by the draft persistence
//! layer. [`DraftValidator`] turns it into a [`ValidatedDraft`], the only form
//! the generators and the pipeline accept.

mod validation;

pub use validation::DraftValidator;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Locale-keyed content fields of one section (`locale -> field -> value`)
pub type LocalizedContent = BTreeMap<String, Map<String, Value>>;

/// Raw draft as received from the persistence layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    /// Stable draft identifier
    #[serde(default)]
    pub draft_id: Option<String>,

    /// Campaign this draft was derived from
    #[serde(default)]
    pub base_campaign_id: Option<String>,

    /// Draft revision
    #[serde(default)]
    pub version: Option<u32>,

    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Locale rendered by default
    #[serde(default)]
    pub default_locale: Option<String>,

    /// Header selection
    #[serde(default)]
    pub header: Option<ChromeSelection>,

    /// Footer selection
    #[serde(default)]
    pub footer: Option<ChromeSelection>,

    /// Ordered page sections
    #[serde(default)]
    pub sections: Vec<SectionEntry>,

    /// Theme presets and overrides
    #[serde(default)]
    pub theme_config: Option<ThemeSelection>,
}

impl CampaignDraft {
    /// Parse a draft from JSON
    pub fn from_json(json: &str) -> Result<Self, crate::ForjaError> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Load a draft from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::ForjaError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::ForjaError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        })?;

        Self::from_json(&content)
    }
}

/// Header or footer selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeSelection {
    #[serde(default)]
    pub enabled: bool,

    /// Component name inside the headers/footers directory
    #[serde(default)]
    pub component: Option<String>,
}

/// One section of the page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEntry {
    /// Section component name (e.g. `Hero`)
    pub section_name: String,

    /// Content per locale
    #[serde(default)]
    pub content: LocalizedContent,
}

/// Theme selection: three named presets plus raw token overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSelection {
    #[serde(default)]
    pub color_preset: Option<String>,

    #[serde(default)]
    pub font_preset: Option<String>,

    #[serde(default)]
    pub radius_preset: Option<String>,

    /// Token overrides applied after the presets
    #[serde(default)]
    pub overrides: BTreeMap<String, Value>,
}

/// A draft that passed contract validation
///
/// Every optional field of [`CampaignDraft`] has been defaulted, so consumers
/// never handle absent values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub id: String,
    pub base_campaign_id: Option<String>,
    pub version: Option<u32>,
    pub title: String,
    pub default_locale: String,
    /// Header component name, present only when the header is enabled
    pub header: Option<String>,
    /// Footer component name, present only when the footer is enabled
    pub footer: Option<String>,
    pub sections: Vec<Section>,
    pub theme: Theme,
}

impl ValidatedDraft {
    /// Section names in page order, duplicates removed
    pub fn section_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.sections
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

/// A validated section
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub content: LocalizedContent,
}

impl Section {
    /// Content for a locale, falling back to the first locale available
    pub fn content_for(&self, locale: &str) -> Map<String, Value> {
        self.content
            .get(locale)
            .or_else(|| self.content.values().next())
            .cloned()
            .unwrap_or_default()
    }
}

/// Validated theme selection
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub color_preset: String,
    pub font_preset: String,
    pub radius_preset: String,
    pub overrides: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_draft() {
        let json = r#"{
            "draftId": "abc123",
            "header": { "enabled": true, "component": "MinimalHeader" },
            "sections": [
                { "sectionName": "Hero", "content": { "en": { "title": "Hi" } } }
            ],
            "themeConfig": { "colorPreset": "ocean", "fontPreset": "modern", "radiusPreset": "soft" }
        }"#;

        let draft = CampaignDraft::from_json(json).unwrap();
        assert_eq!(draft.draft_id.as_deref(), Some("abc123"));
        assert!(draft.footer.is_none());
        assert_eq!(draft.sections[0].section_name, "Hero");
        assert_eq!(draft.sections[0].content["en"]["title"], "Hi");
        assert_eq!(
            draft.theme_config.unwrap().color_preset.as_deref(),
            Some("ocean")
        );
    }

    #[test]
    fn test_null_draft_id_parses() {
        let draft = CampaignDraft::from_json(r#"{ "draftId": null }"#).unwrap();
        assert!(draft.draft_id.is_none());
    }

    #[test]
    fn test_content_fallback() {
        let mut content = LocalizedContent::new();
        let mut es = Map::new();
        es.insert("title".into(), Value::String("Hola".into()));
        content.insert("es".into(), es);

        let section = Section {
            name: "Hero".into(),
            content,
        };

        assert_eq!(section.content_for("en")["title"], "Hola");
    }
}
