// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Theme fragment store
//!
//! Theme presets live outside the engine as JSON fragments, one flat token map
//! per `(kind, preset)`. The engine only needs to look them up and merge them.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::draft::Theme;
use crate::errors::{ForjaError, ForjaResult};

const THEME_FILE: &str = "src/theme/index.ts";

/// Preset families a theme is built from, in merge order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Color,
    Font,
    Radius,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Font => "font",
            Self::Radius => "radius",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of theme fragments
#[async_trait]
pub trait ThemeStore: Send + Sync {
    /// Token map of one preset
    async fn fragment(&self, kind: FragmentKind, preset: &str) -> ForjaResult<Map<String, Value>>;
}

/// Theme store reading `<root>/<kind>/<preset>.json`
pub struct DirectoryThemeStore {
    root: PathBuf,
}

impl DirectoryThemeStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ThemeStore for DirectoryThemeStore {
    async fn fragment(&self, kind: FragmentKind, preset: &str) -> ForjaResult<Map<String, Value>> {
        let path = self
            .root
            .join(kind.as_str())
            .join(format!("{}.json", preset));

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForjaError::ThemeFragmentNotFound {
                    kind: kind.to_string(),
                    preset: preset.to_string(),
                });
            }
            Err(e) => {
                return Err(ForjaError::FileReadError {
                    path,
                    error: e.to_string(),
                })
            }
        };

        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(ForjaError::generation(
                "src/theme/index.ts",
                format!("fragment {}/{} is not a JSON object", kind, preset),
            )),
        }
    }
}

/// Theme with every preset merged into one token map
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    pub color_preset: String,
    pub font_preset: String,
    pub radius_preset: String,
    /// CSS custom property name (with `--`) to value
    pub tokens: BTreeMap<String, String>,
}

impl ResolvedTheme {
    /// Load the three presets and apply overrides on top
    ///
    /// Later fragments win over earlier ones: color, then font, then radius,
    /// then raw overrides.
    pub async fn load(store: &dyn ThemeStore, theme: &Theme) -> ForjaResult<Self> {
        let mut tokens = BTreeMap::new();

        for (kind, preset) in [
            (FragmentKind::Color, &theme.color_preset),
            (FragmentKind::Font, &theme.font_preset),
            (FragmentKind::Radius, &theme.radius_preset),
        ] {
            let fragment = store.fragment(kind, preset).await?;
            merge_tokens(&mut tokens, &fragment)?;
        }

        let overrides: Map<String, Value> = theme
            .overrides
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merge_tokens(&mut tokens, &overrides)?;

        Ok(Self {
            color_preset: theme.color_preset.clone(),
            font_preset: theme.font_preset.clone(),
            radius_preset: theme.radius_preset.clone(),
            tokens,
        })
    }

    /// Values of font tokens, used to detect which families are needed
    pub fn font_values(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|(k, _)| k.contains("font"))
            .map(|(_, v)| v.as_str())
    }
}

fn merge_tokens(tokens: &mut BTreeMap<String, String>, fragment: &Map<String, Value>) -> ForjaResult<()> {
    for (name, value) in fragment {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ForjaError::generation(
                    THEME_FILE,
                    format!("token '{}' has unsupported value {}", name, other),
                ))
            }
        };

        let variable = css_variable(name);
        if !is_token_name(&variable[2..]) {
            return Err(ForjaError::generation(
                THEME_FILE,
                format!("token name '{}' must be made of [A-Za-z0-9_-]", name),
            ));
        }
        if value.contains([';', '{', '}', '\n', '\r']) {
            return Err(ForjaError::generation(
                THEME_FILE,
                format!("token '{}' has a value that would break the stylesheet: {:?}", name, value),
            ));
        }

        tokens.insert(variable, value);
    }

    Ok(())
}

fn is_token_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Normalize a token name to a CSS custom property
fn css_variable(name: &str) -> String {
    let trimmed = name.trim_start_matches('-');
    format!("--{}", trimmed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    /// In-memory store for tests
    pub struct MemoryThemeStore {
        pub fragments: HashMap<(&'static str, String), Map<String, Value>>,
    }

    impl MemoryThemeStore {
        pub fn standard() -> Self {
            let mut fragments = HashMap::new();
            let obj = |v: Value| match v {
                Value::Object(m) => m,
                _ => unreachable!(),
            };
            fragments.insert(
                ("color", "ocean".to_string()),
                obj(json!({ "primary": "#0ea5e9", "background": "#ffffff" })),
            );
            fragments.insert(
                ("font", "modern".to_string()),
                obj(json!({ "font-sans": "'Inter', sans-serif", "font-heading": "'Playfair Display', serif" })),
            );
            fragments.insert(
                ("radius", "soft".to_string()),
                obj(json!({ "radius": "0.75rem" })),
            );
            Self { fragments }
        }
    }

    #[async_trait]
    impl ThemeStore for MemoryThemeStore {
        async fn fragment(&self, kind: FragmentKind, preset: &str) -> ForjaResult<Map<String, Value>> {
            self.fragments
                .get(&(kind.as_str(), preset.to_string()))
                .cloned()
                .ok_or_else(|| ForjaError::ThemeFragmentNotFound {
                    kind: kind.to_string(),
                    preset: preset.to_string(),
                })
        }
    }

    pub fn ocean_theme() -> Theme {
        Theme {
            color_preset: "ocean".into(),
            font_preset: "modern".into(),
            radius_preset: "soft".into(),
            overrides: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_overrides_win() {
        let store = MemoryThemeStore::standard();
        let mut theme = ocean_theme();
        theme.overrides.insert("--primary".into(), json!("#ff0000"));
        theme.overrides.insert("spacing".into(), json!(4));

        let resolved = ResolvedTheme::load(&store, &theme).await.unwrap();

        assert_eq!(resolved.tokens["--primary"], "#ff0000");
        assert_eq!(resolved.tokens["--spacing"], "4");
        assert_eq!(resolved.tokens["--radius"], "0.75rem");
    }

    #[tokio::test]
    async fn test_missing_preset() {
        let store = MemoryThemeStore::standard();
        let mut theme = ocean_theme();
        theme.radius_preset = "sharp".into();

        let err = ResolvedTheme::load(&store, &theme).await.unwrap_err();
        assert!(matches!(err, ForjaError::ThemeFragmentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_nested_values() {
        let store = MemoryThemeStore::standard();
        let mut theme = ocean_theme();
        theme.overrides.insert("primary".into(), json!({ "light": "#fff" }));

        let err = ResolvedTheme::load(&store, &theme).await.unwrap_err();
        assert!(matches!(err, ForjaError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_token_names() {
        let store = MemoryThemeStore::standard();
        for name in ["--bad\"name", "--", "accent color", "x}y"] {
            let mut theme = ocean_theme();
            theme.overrides.insert(name.into(), json!("#fff"));

            let err = ResolvedTheme::load(&store, &theme).await.unwrap_err();
            assert!(matches!(err, ForjaError::Generation { .. }), "{} accepted", name);
        }
    }

    #[tokio::test]
    async fn test_rejects_values_that_escape_the_declaration() {
        let store = MemoryThemeStore::standard();
        for value in ["red; } body { display: none", "red\n--x: 1", "{"] {
            let mut theme = ocean_theme();
            theme.overrides.insert("accent".into(), json!(value));

            let err = ResolvedTheme::load(&store, &theme).await.unwrap_err();
            assert!(matches!(err, ForjaError::Generation { .. }), "{:?} accepted", value);
        }

        let mut theme = ocean_theme();
        theme.overrides.insert("--font-sans".into(), json!("\"Inter\", sans-serif"));
        assert!(ResolvedTheme::load(&store, &theme).await.is_ok());
    }

    #[tokio::test]
    async fn test_directory_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("color")).unwrap();
        std::fs::write(
            dir.path().join("color/ocean.json"),
            r##"{ "primary": "#0ea5e9" }"##,
        )
        .unwrap();

        let store = DirectoryThemeStore::new(dir.path().to_path_buf());
        let fragment = store.fragment(FragmentKind::Color, "ocean").await.unwrap();
        assert_eq!(fragment["primary"], "#0ea5e9");

        let err = store.fragment(FragmentKind::Font, "ocean").await.unwrap_err();
        assert!(matches!(err, ForjaError::ThemeFragmentNotFound { .. }));
    }
}
