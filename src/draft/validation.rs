// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Draft contract validation
//!
//! Runs before the pipeline creates anything on disk.

use regex::Regex;
use std::sync::OnceLock;

use super::{CampaignDraft, ChromeSelection, Section, Theme, ValidatedDraft};
use crate::errors::{ForjaError, ForjaResult};

const MAX_ID_LEN: usize = 64;
const DEFAULT_PRESET: &str = "default";
const DEFAULT_LOCALE: &str = "en";

fn component_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid component regex"))
}

/// Draft validator
pub struct DraftValidator;

impl DraftValidator {
    /// Validate a raw draft, defaulting every optional field
    pub fn validate(draft: &CampaignDraft) -> ForjaResult<ValidatedDraft> {
        let id = Self::validate_id(draft.draft_id.as_deref())?;

        let mut sections = Vec::with_capacity(draft.sections.len());
        for entry in &draft.sections {
            let name = entry.section_name.trim();
            if !component_name().is_match(name) {
                return Err(invalid(format!(
                    "section name '{}' is not a component identifier",
                    entry.section_name
                )));
            }
            sections.push(Section {
                name: name.to_string(),
                content: entry.content.clone(),
            });
        }

        let header = Self::validate_chrome("header", draft.header.as_ref(), "Header")?;
        let footer = Self::validate_chrome("footer", draft.footer.as_ref(), "Footer")?;

        let theme_config = draft.theme_config.clone().unwrap_or_default();
        let preset = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_PRESET.to_string())
        };
        let theme = Theme {
            color_preset: preset(theme_config.color_preset),
            font_preset: preset(theme_config.font_preset),
            radius_preset: preset(theme_config.radius_preset),
            overrides: theme_config.overrides,
        };
        for name in [&theme.color_preset, &theme.font_preset, &theme.radius_preset] {
            if !is_path_safe(name) {
                return Err(invalid(format!("theme preset '{}' is not a valid name", name)));
            }
        }

        let default_locale = draft
            .default_locale
            .clone()
            .filter(|l| !l.trim().is_empty())
            // Alphabetically first locale, content maps are ordered
            .or_else(|| {
                sections
                    .iter()
                    .find_map(|s| s.content.keys().next().cloned())
            })
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let title = draft
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Campaign {}", id));

        Ok(ValidatedDraft {
            id,
            base_campaign_id: draft.base_campaign_id.clone(),
            version: draft.version,
            title,
            default_locale,
            header,
            footer,
            sections,
            theme,
        })
    }

    fn validate_id(id: Option<&str>) -> ForjaResult<String> {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        let Some(id) = id else {
            return Err(ForjaError::MissingDraftId);
        };

        if id.len() > MAX_ID_LEN || !is_path_safe(id) {
            return Err(invalid(format!(
                "draft id '{}' must be at most {} characters of [A-Za-z0-9_-]",
                id, MAX_ID_LEN
            )));
        }

        Ok(id.to_string())
    }

    fn validate_chrome(
        slot: &str,
        selection: Option<&ChromeSelection>,
        fallback: &str,
    ) -> ForjaResult<Option<String>> {
        let Some(selection) = selection.filter(|s| s.enabled) else {
            return Ok(None);
        };

        let name = selection
            .component
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(fallback);

        if !component_name().is_match(name) {
            return Err(invalid(format!(
                "{} component '{}' is not a component identifier",
                slot, name
            )));
        }

        Ok(Some(name.to_string()))
    }
}

fn is_path_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn invalid(reason: String) -> ForjaError {
    ForjaError::InvalidDraft { reason }
}
