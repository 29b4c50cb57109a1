// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Build configuration generation
//!
//! `next.config.mjs`, `tsconfig.json`, `postcss.config.mjs` and
//! `tailwind.config.ts`.

use serde_json::json;
use std::fmt::Write;
use std::path::Path;

use super::{banner, js_string, GeneratedFile};
use crate::config::{BuildConfig, LayoutConfig};
use crate::errors::{ForjaError, ForjaResult};
use crate::theme::ResolvedTheme;

/// Generate every build configuration file
pub fn generate_build_configs(
    draft_id: &str,
    theme: &ResolvedTheme,
    layout: &LayoutConfig,
    build: &BuildConfig,
) -> ForjaResult<Vec<GeneratedFile>> {
    Ok(vec![
        next_config(draft_id, &build.output_dir),
        tsconfig(layout)?,
        postcss_config(draft_id),
        tailwind_config(draft_id, theme, layout),
    ])
}

fn next_config(draft_id: &str, output_dir: &Path) -> GeneratedFile {
    let mut out = banner(draft_id);
    out.push_str("/** @type {import('next').NextConfig} */\n");
    out.push_str("const nextConfig = {\n");
    out.push_str("  output: \"export\",\n");
    if output_dir != Path::new("out") {
        let _ = writeln!(out, "  distDir: {},", js_string(&output_dir.to_string_lossy()));
    }
    out.push_str("  trailingSlash: true,\n");
    out.push_str("  images: { unoptimized: true },\n");
    out.push_str("};\n\n");
    out.push_str("export default nextConfig;\n");

    GeneratedFile::new("next.config.mjs", out)
}

fn tsconfig(layout: &LayoutConfig) -> ForjaResult<GeneratedFile> {
    let alias_key = format!("{}*", layout.alias_prefix);
    let alias_root = layout
        .alias_root
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let alias_target = if alias_root.is_empty() {
        "./*".to_string()
    } else {
        format!("./{}/*", alias_root)
    };

    let config = json!({
        "compilerOptions": {
            "target": "ES2017",
            "lib": ["dom", "dom.iterable", "esnext"],
            "allowJs": true,
            "skipLibCheck": true,
            "strict": false,
            "noEmit": true,
            "esModuleInterop": true,
            "module": "esnext",
            "moduleResolution": "bundler",
            "resolveJsonModule": true,
            "isolatedModules": true,
            "jsx": "preserve",
            "incremental": true,
            "plugins": [{ "name": "next" }],
            "paths": { alias_key: [alias_target] }
        },
        "include": ["next-env.d.ts", "**/*.ts", "**/*.tsx", ".next/types/**/*.ts"],
        "exclude": ["node_modules"]
    });

    let mut contents = serde_json::to_string_pretty(&config)
        .map_err(|e| ForjaError::generation("tsconfig.json", e.to_string()))?;
    contents.push('\n');

    Ok(GeneratedFile::new("tsconfig.json", contents))
}

fn postcss_config(draft_id: &str) -> GeneratedFile {
    let mut out = banner(draft_id);
    out.push_str("const config = {\n");
    out.push_str("  plugins: {\n");
    out.push_str("    tailwindcss: {},\n");
    out.push_str("    autoprefixer: {},\n");
    out.push_str("  },\n");
    out.push_str("};\n\n");
    out.push_str("export default config;\n");

    GeneratedFile::new("postcss.config.mjs", out)
}

fn tailwind_config(draft_id: &str, theme: &ResolvedTheme, layout: &LayoutConfig) -> GeneratedFile {
    let source_glob = format!(
        "./{}/**/*.{{js,ts,jsx,tsx}}",
        layout.alias_root.to_string_lossy().trim_matches('/')
    );

    let mut colors = Vec::new();
    let mut radii = Vec::new();
    for (name, value) in &theme.tokens {
        let key = name.trim_start_matches('-');
        if key.contains("radius") {
            radii.push((key, name));
        } else if is_color(value) {
            colors.push((key, name));
        }
    }

    let mut out = banner(draft_id);
    out.push_str("import type { Config } from \"tailwindcss\";\n\n");
    out.push_str("const config: Config = {\n");
    out.push_str("  content: [\n");
    out.push_str("    \"./app/**/*.{js,ts,jsx,tsx}\",\n");
    let _ = writeln!(out, "    {},", js_string(&source_glob));
    out.push_str("  ],\n");
    out.push_str("  theme: {\n");
    out.push_str("    extend: {\n");
    out.push_str("      colors: {\n");
    for (key, name) in &colors {
        let _ = writeln!(out, "        {}: {},", js_string(key), js_string(&format!("var({})", name)));
    }
    out.push_str("      },\n");
    out.push_str("      borderRadius: {\n");
    for (key, name) in &radii {
        let _ = writeln!(out, "        {}: {},", js_string(key), js_string(&format!("var({})", name)));
    }
    out.push_str("      },\n");
    out.push_str("    },\n");
    out.push_str("  },\n");
    out.push_str("  plugins: [],\n");
    out.push_str("};\n\n");
    out.push_str("export default config;\n");

    GeneratedFile::new("tailwind.config.ts", out)
}

fn is_color(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value.starts_with('#')
        || value.starts_with("rgb")
        || value.starts_with("hsl")
        || value.starts_with("oklch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::resolved_theme;

    fn generate() -> Vec<GeneratedFile> {
        generate_build_configs(
            "abc123",
            &resolved_theme(),
            &LayoutConfig::default(),
            &BuildConfig::default(),
        )
        .unwrap()
    }

    fn find<'a>(files: &'a [GeneratedFile], name: &str) -> &'a GeneratedFile {
        files
            .iter()
            .find(|f| f.path.to_str() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_all_configs_generated() {
        let files = generate();
        let names: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().to_string()).collect();
        assert_eq!(
            names,
            vec!["next.config.mjs", "tsconfig.json", "postcss.config.mjs", "tailwind.config.ts"]
        );
    }

    #[test]
    fn test_static_export() {
        let files = generate();
        let next = find(&files, "next.config.mjs");
        assert!(next.contents.contains("output: \"export\""));
        assert!(!next.contents.contains("distDir"));
    }

    #[test]
    fn test_custom_output_dir() {
        let build = BuildConfig {
            output_dir: "dist".into(),
            ..Default::default()
        };
        let files = generate_build_configs("abc123", &resolved_theme(), &LayoutConfig::default(), &build)
            .unwrap();
        assert!(find(&files, "next.config.mjs").contents.contains("distDir: \"dist\""));
    }

    #[test]
    fn test_tsconfig_alias() {
        let files = generate();
        let json: serde_json::Value =
            serde_json::from_str(&find(&files, "tsconfig.json").contents).unwrap();
        assert_eq!(json["compilerOptions"]["paths"]["@/*"][0], "./src/*");
    }

    #[test]
    fn test_tailwind_maps_tokens() {
        let files = generate();
        let tailwind = &find(&files, "tailwind.config.ts").contents;
        assert!(tailwind.contains("\"primary\": \"var(--primary)\""));
        assert!(tailwind.contains("\"radius\": \"var(--radius)\""));
        assert!(!tailwind.contains("font-sans"));
    }

    #[test]
    fn test_tailwind_token_references_are_quoted() {
        let mut theme = resolved_theme();
        theme.tokens.insert("--odd\"accent".into(), "#123456".into());

        let files =
            generate_build_configs("abc123", &theme, &LayoutConfig::default(), &BuildConfig::default()).unwrap();
        let tailwind = &find(&files, "tailwind.config.ts").contents;
        assert!(tailwind.contains("\"odd\\\"accent\": \"var(--odd\\\"accent)\","));
    }

    #[test]
    fn test_configs_are_deterministic() {
        assert_eq!(generate(), generate());
    }
}
