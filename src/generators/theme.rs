// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Theme entry point generation (`src/theme/index.ts`)

use std::fmt::Write;
use std::path::PathBuf;

use super::{banner, js_string, GeneratedFile};
use crate::config::LayoutConfig;
use crate::errors::{ForjaError, ForjaResult};
use crate::theme::ResolvedTheme;

/// Project path of the theme module, `<alias_root>/theme/index.ts`
pub fn theme_entrypoint_path(layout: &LayoutConfig) -> PathBuf {
    layout.alias_root.join("theme").join("index.ts")
}

/// Generate the theme module components import through the source alias
///
/// Written to [`theme_entrypoint_path`], so `@/theme` resolves to it.
pub fn generate_theme_entrypoint(
    draft_id: &str,
    theme: &ResolvedTheme,
    layout: &LayoutConfig,
) -> ForjaResult<GeneratedFile> {
    let path = theme_entrypoint_path(layout);

    for (kind, preset) in [
        ("color", &theme.color_preset),
        ("font", &theme.font_preset),
        ("radius", &theme.radius_preset),
    ] {
        if preset.is_empty() {
            return Err(ForjaError::generation(
                &path.to_string_lossy(),
                format!("{} preset is empty", kind),
            ));
        }
    }

    let mut out = banner(draft_id);
    out.push_str("export const themePresets = {\n");
    let _ = writeln!(out, "  color: {},", js_string(&theme.color_preset));
    let _ = writeln!(out, "  font: {},", js_string(&theme.font_preset));
    let _ = writeln!(out, "  radius: {},", js_string(&theme.radius_preset));
    out.push_str("} as const;\n\n");

    out.push_str("export const themeTokens: Record<string, string> = {\n");
    for (name, value) in &theme.tokens {
        let _ = writeln!(out, "  {}: {},", js_string(name), js_string(value));
    }
    out.push_str("};\n\n");

    out.push_str("export function token(name: string): string {\n");
    out.push_str("  return themeTokens[name.startsWith(\"--\") ? name : `--${name}`] ?? \"\";\n");
    out.push_str("}\n\n");
    out.push_str("export default themeTokens;\n");

    Ok(GeneratedFile::new(path, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::resolved_theme;

    #[test]
    fn test_entrypoint_exports_presets_and_tokens() {
        let file =
            generate_theme_entrypoint("abc123", &resolved_theme(), &LayoutConfig::default()).unwrap();

        assert_eq!(file.path.to_str(), Some("src/theme/index.ts"));
        assert!(file.contents.contains("  color: \"ocean\",\n"));
        assert!(file.contents.contains("  \"--primary\": \"#0ea5e9\",\n"));
        assert!(file.contents.contains("export default themeTokens;"));
    }

    #[test]
    fn test_empty_preset_is_a_generation_error() {
        let mut theme = resolved_theme();
        theme.font_preset.clear();

        let err = generate_theme_entrypoint("abc123", &theme, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, ForjaError::Generation { .. }));
    }

    #[test]
    fn test_entrypoint_is_deterministic() {
        let theme = resolved_theme();
        let layout = LayoutConfig::default();
        assert_eq!(
            generate_theme_entrypoint("abc123", &theme, &layout).unwrap(),
            generate_theme_entrypoint("abc123", &theme, &layout).unwrap()
        );
    }
}
