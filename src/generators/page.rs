// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Root page generation (`app/page.tsx`)
//!
//! The page imports the section dispatcher and exactly the section components
//! the draft uses, then hands both the ordered section data and a component
//! registry to the dispatcher. The dispatcher itself never imports sections,
//! which keeps unused sections out of the dependency closure.

use serde_json::{json, Value};
use std::fmt::Write;

use super::{banner, js_string, GeneratedFile};
use crate::config::LayoutConfig;
use crate::draft::ValidatedDraft;
use crate::errors::{ForjaError, ForjaResult};

pub const PAGE_FILE: &str = "app/page.tsx";

/// Generate the root page
pub fn generate_root_page(draft: &ValidatedDraft, layout: &LayoutConfig) -> ForjaResult<GeneratedFile> {
    let alias = &layout.alias_prefix;
    let dispatcher = layout.alias_path(&layout.dispatcher.with_extension(""));
    let sections_dir = layout.alias_path(&layout.sections_dir);
    let names = draft.section_names();

    let mut out = banner(&draft.id);
    let _ = writeln!(out, "import SectionRenderer from \"{}{}\";", alias, dispatcher);
    for name in &names {
        let _ = writeln!(
            out,
            "import {} from \"{}{}/{}\";",
            section_binding(name),
            alias,
            sections_dir,
            name
        );
    }
    out.push('\n');

    out.push_str("const components = {\n");
    for name in &names {
        let _ = writeln!(out, "  {}: {},", name, section_binding(name));
    }
    out.push_str("};\n\n");

    let sections: Vec<Value> = draft
        .sections
        .iter()
        .map(|section| {
            json!({
                "name": section.name,
                "content": section.content_for(&draft.default_locale),
                "locales": section.content,
            })
        })
        .collect();
    let sections_json = serde_json::to_string_pretty(&sections)
        .map_err(|e| ForjaError::generation(PAGE_FILE, e.to_string()))?;

    let _ = writeln!(out, "const sections = {};\n", sections_json);

    out.push_str("export default function Page() {\n");
    out.push_str("  return (\n");
    let _ = writeln!(
        out,
        "    <SectionRenderer sections={{sections}} components={{components}} locale={{{}}} />",
        js_string(&draft.default_locale)
    );
    out.push_str("  );\n");
    out.push_str("}\n");

    Ok(GeneratedFile::new(PAGE_FILE, out))
}

/// Local binding for a section component
///
/// Component names never contain `_`, so the prefixed binding cannot clash
/// with the dispatcher, `Page` or another section.
fn section_binding(name: &str) -> String {
    format!("Section_{}", name)
}
