// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Global stylesheet generation (`app/globals.css`)

use std::fmt::Write;

use super::{required_fonts, GeneratedFile};
use crate::theme::ResolvedTheme;

pub const STYLESHEET_FILE: &str = "app/globals.css";

/// Generate the global stylesheet with the theme tokens as custom properties
///
/// Quoted references to a loaded font family are pointed at the variable the
/// font loader defines, so the self-hosted copy is used.
pub fn generate_stylesheet(theme: &ResolvedTheme) -> GeneratedFile {
    let fonts = required_fonts(theme);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "/* Theme: color={} font={} radius={} */",
        theme.color_preset, theme.font_preset, theme.radius_preset
    );
    out.push_str("@tailwind base;\n@tailwind components;\n@tailwind utilities;\n\n");

    out.push_str(":root {\n");
    for (name, value) in &theme.tokens {
        let mut value = value.clone();
        if name.contains("font") {
            for font in &fonts {
                let replacement = format!("var({})", font.variable);
                value = value
                    .replace(&format!("'{}'", font.name), &replacement)
                    .replace(&format!("\"{}\"", font.name), &replacement);
            }
        }
        let _ = writeln!(out, "  {}: {};", name, value);
    }
    out.push_str("}\n\n");

    out.push_str("body {\n");
    out.push_str("  margin: 0;\n");
    out.push_str("  background: var(--background, #ffffff);\n");
    out.push_str("  color: var(--foreground, #0f172a);\n");
    out.push_str("  font-family: var(--font-sans, system-ui, sans-serif);\n");
    out.push_str("}\n");

    GeneratedFile::new(STYLESHEET_FILE, out)
}
