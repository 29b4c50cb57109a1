// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Archive packaging
//!
//! Compresses a directory tree into a single zip file. Entries are written in
//! sorted order with `/` separated names relative to the source root, so two
//! runs over the same tree produce the same entry list.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{ForjaError, ForjaResult};

/// Highest Deflate level
const COMPRESSION_LEVEL: i64 = 9;

/// Zip `source` into `dest`, returning the archive size in bytes
///
/// Top-level entries whose name appears in `exclude` are skipped along with
/// everything below them. The work runs on the blocking pool.
pub async fn package_directory(source: &Path, dest: &Path, exclude: &[String]) -> ForjaResult<u64> {
    let source = source.to_path_buf();
    let dest = dest.to_path_buf();
    let exclude = exclude.to_vec();

    tokio::task::spawn_blocking(move || write_archive(&source, &dest, &exclude).map_err(as_packaging))
        .await
        .map_err(|e| ForjaError::Packaging {
            message: format!("packaging task aborted: {}", e),
        })?
}

fn as_packaging(error: ForjaError) -> ForjaError {
    match error {
        ForjaError::Packaging { .. } => error,
        other => ForjaError::Packaging {
            message: other.to_string(),
        },
    }
}

fn write_archive(source: &Path, dest: &Path, exclude: &[String]) -> ForjaResult<u64> {
    if !source.is_dir() {
        return Err(ForjaError::Packaging {
            message: format!("'{}' is not a directory", source.display()),
        });
    }

    let file = File::create(dest).map_err(|e| ForjaError::Packaging {
        message: format!("cannot create '{}': {}", dest.display(), e),
    })?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && is_excluded(entry.file_name(), exclude)));

    let mut entries = 0usize;
    for entry in walker {
        let entry = entry?;
        let name = entry_name(source, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path())?;
            std::io::copy(&mut input, &mut zip)?;
        } else {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
            continue;
        }
        entries += 1;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| ForjaError::Packaging {
        message: e.to_string(),
    })?;
    file.sync_all()?;

    let size = file.metadata()?.len();
    tracing::info!(
        archive = %dest.display(),
        entries,
        size_bytes = size,
        "archive written"
    );

    Ok(size)
}

fn is_excluded(name: &std::ffi::OsStr, exclude: &[String]) -> bool {
    exclude.iter().any(|e| name == e.as_str())
}

/// Archive entry name: relative path joined with `/`
fn entry_name(root: &Path, path: &Path) -> ForjaResult<String> {
    let relative: PathBuf = path
        .strip_prefix(root)
        .map_err(|e| ForjaError::Packaging {
            message: e.to_string(),
        })?
        .to_path_buf();

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("app")).unwrap();
        fs::create_dir_all(root.join("src/components/sections")).unwrap();
        fs::create_dir_all(root.join("out/empty")).unwrap();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("app/page.tsx"), "export default function Page() {}").unwrap();
        fs::write(root.join("src/components/sections/Hero.tsx"), "export default 1").unwrap();
        fs::write(root.join("out/index.html"), "<html></html>").unwrap();
        fs::write(root.join("node_modules/react/index.js"), "module.exports = {}").unwrap();
        dir
    }

    fn names(archive: &Path) -> Vec<String> {
        let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        zip.file_names().map(String::from).collect::<Vec<_>>()
    }

    #[tokio::test]
    async fn test_package_lists_every_entry() {
        let project = project();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("bundle.zip");

        let size = package_directory(project.path(), &dest, &["node_modules".to_string()])
            .await
            .unwrap();

        assert_eq!(size, fs::metadata(&dest).unwrap().len());

        let mut entries = names(&dest);
        entries.sort();
        assert_eq!(
            entries,
            vec![
                "app/",
                "app/page.tsx",
                "out/",
                "out/empty/",
                "out/index.html",
                "package.json",
                "src/",
                "src/components/",
                "src/components/sections/",
                "src/components/sections/Hero.tsx",
            ]
        );
    }

    #[tokio::test]
    async fn test_package_preserves_contents() {
        let project = project();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("bundle.zip");

        package_directory(project.path(), &dest, &[]).await.unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut file = zip.by_name("out/index.html").unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "<html></html>");
        assert_eq!(file.compression(), CompressionMethod::Deflated);
    }

    #[tokio::test]
    async fn test_exclusion_is_top_level_only() {
        let project = project();
        fs::create_dir_all(project.path().join("src/node_modules")).unwrap();
        fs::write(project.path().join("src/node_modules/keep.txt"), "keep").unwrap();
        let out = TempDir::new().unwrap();
        let dest = out.path().join("bundle.zip");

        package_directory(project.path(), &dest, &["node_modules".to_string()])
            .await
            .unwrap();

        let entries = names(&dest);
        assert!(entries.contains(&"src/node_modules/keep.txt".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with("node_modules")));
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let out = TempDir::new().unwrap();
        let err = package_directory(&out.path().join("nope"), &out.path().join("a.zip"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ForjaError::Packaging { .. }));
        assert_eq!(err.user_message(), "packaging failed");
    }
}
