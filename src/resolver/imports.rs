// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Lexical import scanning
//!
//! Specifiers are found with a regular expression over raw source text, not a
//! parser. Computed `import()` arguments are invisible to it, and a string
//! literal that merely looks like an import after `from`/`import`/`require`
//! is reported as one. Type-only imports are reported like value imports.

use regex::Regex;
use std::sync::OnceLock;

fn import_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:\bfrom|\bimport|\brequire)\s*\(?\s*['"]([^'"\r\n]+)['"]"#)
            .expect("valid import regex")
    })
}

fn package_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(@[a-z0-9][a-z0-9._~-]*/)?[a-z0-9][a-z0-9._~-]*$").expect("valid package regex")
    })
}

/// What an import specifier points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind<'a> {
    /// Aliased path into the shared source root, prefix stripped
    Alias(&'a str),
    /// `./` or `../` or absolute path
    Relative(&'a str),
    /// Third-party package, by package name
    Package(String),
    /// Runtime builtin or something that is not a package name
    Other(&'a str),
}

/// Every import specifier in `source`, in order of appearance
pub fn scan_imports(source: &str) -> Vec<&str> {
    import_pattern()
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Classify a specifier against the source alias prefix
pub fn classify<'a>(specifier: &'a str, alias_prefix: &str) -> ImportKind<'a> {
    if let Some(rest) = specifier.strip_prefix(alias_prefix) {
        return ImportKind::Alias(rest);
    }
    if specifier.starts_with('.') || specifier.starts_with('/') {
        return ImportKind::Relative(specifier);
    }
    if specifier.starts_with("node:") || specifier.contains("://") {
        return ImportKind::Other(specifier);
    }

    match package_name(specifier) {
        Some(name) => ImportKind::Package(name),
        None => ImportKind::Other(specifier),
    }
}

/// Package name of a bare specifier (`@scope/pkg/sub` gives `@scope/pkg`)
pub fn package_name(specifier: &str) -> Option<String> {
    let mut parts = specifier.split('/');
    let first = parts.next()?;
    let name = if first.starts_with('@') {
        format!("{}/{}", first, parts.next()?)
    } else {
        first.to_string()
    };

    package_pattern().is_match(&name).then_some(name)
}
