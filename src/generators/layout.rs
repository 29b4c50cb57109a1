// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Root layout generation (`app/layout.tsx`)

use std::fmt::Write;

use super::{banner, js_string, required_fonts, GeneratedFile};
use crate::config::LayoutConfig;
use crate::draft::ValidatedDraft;
use crate::theme::ResolvedTheme;

pub const LAYOUT_FILE: &str = "app/layout.tsx";

/// Generate the root layout
///
/// Header and footer are imported only when the draft enables them. Fonts
/// are loaded only for families the theme asks for.
pub fn generate_root_layout(
    draft: &ValidatedDraft,
    theme: &ResolvedTheme,
    layout: &LayoutConfig,
) -> GeneratedFile {
    let fonts = required_fonts(theme);
    let alias = &layout.alias_prefix;
    let mut out = banner(&draft.id);

    out.push_str("import type { Metadata } from \"next\";\n");
    if !fonts.is_empty() {
        let imports: Vec<_> = fonts.iter().map(|f| f.import).collect();
        let _ = writeln!(out, "import {{ {} }} from \"next/font/google\";", imports.join(", "));
    }
    if let Some(header) = &draft.header {
        let _ = writeln!(
            out,
            "import {} from \"{}{}/{}\";",
            chrome_binding("Header", header),
            alias,
            layout.alias_path(&layout.headers_dir),
            header
        );
    }
    if let Some(footer) = &draft.footer {
        let _ = writeln!(
            out,
            "import {} from \"{}{}/{}\";",
            chrome_binding("Footer", footer),
            alias,
            layout.alias_path(&layout.footers_dir),
            footer
        );
    }
    out.push_str("import \"./globals.css\";\n\n");

    for font in &fonts {
        let _ = write!(
            out,
            "const {} = {}({{ subsets: [\"latin\"], variable: {}, display: \"swap\"",
            font.binding(),
            font.import,
            js_string(font.variable)
        );
        if let Some(weights) = font.weights {
            let quoted: Vec<_> = weights.iter().map(|w| js_string(w)).collect();
            let _ = write!(out, ", weight: [{}]", quoted.join(", "));
        }
        out.push_str(" });\n");
    }
    if !fonts.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "export const metadata: Metadata = {{");
    let _ = writeln!(out, "  title: {},", js_string(&draft.title));
    let _ = writeln!(out, "}};\n");

    out.push_str("export default function RootLayout({\n");
    out.push_str("  children,\n");
    out.push_str("}: Readonly<{ children: React.ReactNode }>) {\n");
    out.push_str("  return (\n");

    let lang = js_string(&draft.default_locale);
    if fonts.is_empty() {
        let _ = writeln!(out, "    <html lang={{{}}}>", lang);
    } else {
        let classes: Vec<_> = fonts
            .iter()
            .map(|f| format!("${{{}.variable}}", f.binding()))
            .collect();
        let _ = writeln!(
            out,
            "    <html lang={{{}}} className={{`{}`}}>",
            lang,
            classes.join(" ")
        );
    }

    out.push_str("      <body>\n");
    if let Some(header) = &draft.header {
        let _ = writeln!(out, "        <{} />", chrome_binding("Header", header));
    }
    out.push_str("        <main>{children}</main>\n");
    if let Some(footer) = &draft.footer {
        let _ = writeln!(out, "        <{} />", chrome_binding("Footer", footer));
    }
    out.push_str("      </body>\n");
    out.push_str("    </html>\n");
    out.push_str("  );\n");
    out.push_str("}\n");

    GeneratedFile::new(LAYOUT_FILE, out)
}

/// Local binding for a header or footer component, clear of `Metadata`,
/// `RootLayout`, `React` and the font loaders
fn chrome_binding(slot: &str, name: &str) -> String {
    format!("{}_{}", slot, name)
}
