// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Web font catalog
//!
//! Families the generated project can load through `next/font/google`. A
//! family is included only when the theme's font tokens mention it; anything
//! else is left to the browser's fallback stack.

use crate::theme::ResolvedTheme;

/// A loadable font family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFamily {
    /// Family name as written in CSS
    pub name: &'static str,
    /// Export name in `next/font/google`
    pub import: &'static str,
    /// CSS variable the loader exposes the family under
    pub variable: &'static str,
    /// Static weights; `None` for variable fonts
    pub weights: Option<&'static [&'static str]>,
}

impl FontFamily {
    /// Local binding name in the generated layout (`playfairDisplay`)
    pub fn binding(&self) -> String {
        let mut parts = self.import.split('_');
        let mut binding = parts.next().unwrap_or_default().to_lowercase();
        for part in parts {
            binding.push_str(part);
        }
        binding
    }
}

pub const FONT_CATALOG: &[FontFamily] = &[
    FontFamily {
        name: "Inter",
        import: "Inter",
        variable: "--font-inter",
        weights: None,
    },
    FontFamily {
        name: "Roboto",
        import: "Roboto",
        variable: "--font-roboto",
        weights: Some(&["400", "500", "700"]),
    },
    FontFamily {
        name: "Open Sans",
        import: "Open_Sans",
        variable: "--font-open-sans",
        weights: None,
    },
    FontFamily {
        name: "Lato",
        import: "Lato",
        variable: "--font-lato",
        weights: Some(&["400", "700"]),
    },
    FontFamily {
        name: "Montserrat",
        import: "Montserrat",
        variable: "--font-montserrat",
        weights: None,
    },
    FontFamily {
        name: "Poppins",
        import: "Poppins",
        variable: "--font-poppins",
        weights: Some(&["400", "500", "600", "700"]),
    },
    FontFamily {
        name: "Playfair Display",
        import: "Playfair_Display",
        variable: "--font-playfair-display",
        weights: None,
    },
    FontFamily {
        name: "Merriweather",
        import: "Merriweather",
        variable: "--font-merriweather",
        weights: Some(&["400", "700"]),
    },
];

/// Catalog families mentioned by the theme's font tokens, in catalog order
pub fn required_fonts(theme: &ResolvedTheme) -> Vec<&'static FontFamily> {
    let haystack = theme
        .font_values()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    FONT_CATALOG
        .iter()
        .filter(|family| haystack.contains(&family.name.to_lowercase()))
        .collect()
}
