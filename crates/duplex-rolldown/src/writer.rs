//! Writing build output.
//!
//! Every emitted file name is joined to the output directory and checked to
//! still lie inside it. Files are written to a temporary name and renamed
//! into place once all of them are on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rolldown::BundleOutput;
use rolldown_common::Output;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{HostError, Result};

/// Write all chunks and assets of `output` under `dir`. Returns the written
/// paths.
pub fn write_bundle(output: &BundleOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = dir.clean();
    fs::create_dir_all(&dir).map_err(|e| {
        HostError::WriteFailure(format!(
            "failed to create output directory '{}': {e}",
            dir.display()
        ))
    })?;

    let mut operations = Vec::new();
    for item in &output.assets {
        match item {
            Output::Asset(asset) => {
                let target = validate_output_path(&dir, asset.filename.as_str())?;
                operations.push((target, asset.source.as_bytes()));
            }
            Output::Chunk(chunk) => {
                let target = validate_output_path(&dir, chunk.filename.as_str())?;
                operations.push((target, chunk.code.as_bytes()));
            }
        }
    }

    write_files_atomic(&operations)?;
    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

/// Entry chunk name -> emitted file name.
pub fn entry_files(output: &BundleOutput) -> HashMap<String, String> {
    output
        .assets
        .iter()
        .filter_map(|item| match item {
            Output::Chunk(chunk) if chunk.is_entry => {
                Some((chunk.name.to_string(), chunk.filename.to_string()))
            }
            _ => None,
        })
        .collect()
}

/// Write one file at `relative` under `dir`.
pub fn write_file(dir: &Path, relative: &Path, content: &[u8]) -> Result<PathBuf> {
    let target = validate_output_path(&dir.clean(), &relative.to_string_lossy())?;
    write_files_atomic(&[(target.clone(), content)])?;
    Ok(target)
}

/// Check that `out_dir` (relative to `root`, or absolute) is strictly inside
/// `root`, so emptying it cannot touch the project sources.
pub fn ensure_inside_root(root: &Path, out_dir: &Path) -> Result<PathBuf> {
    let target = root.join(out_dir).clean();
    let base = match root.clean() {
        dot if dot == Path::new(".") => PathBuf::new(),
        base => base,
    };
    let inside = target
        .strip_prefix(&base)
        .is_ok_and(|rest| rest.components().next().is_some() && !rest.starts_with(".."));
    if !inside {
        return Err(HostError::UnsafeOutDir {
            out_dir: target,
            root: root.to_path_buf(),
        });
    }
    Ok(target)
}

/// Remove everything inside `dir`, keeping the directory itself.
pub fn empty_dir(dir: &Path) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    debug!(dir = %dir.display(), "emptied output directory");
    Ok(())
}

/// Copy the files of `src` into `dest`. Files already present in `dest`
/// (emitted by the bundle) are kept. Returns the number of files copied.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| HostError::WriteFailure(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);
        if target.exists() {
            warn!(file = %target.display(), "not overwriting emitted file with public file");
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

/// Rejects names that escape `base_dir` once joined and cleaned.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(HostError::InvalidOutputPath(
            "file name contains a null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) {
        return Err(HostError::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            filename,
            base_dir.display()
        )));
    }
    Ok(full_path)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                HostError::WriteFailure(format!(
                    "failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let mut temp_name = target.clone().into_os_string();
        temp_name.push(".tmp");
        let temp = PathBuf::from(temp_name);
        fs::write(&temp, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            HostError::WriteFailure(format!("failed to write '{}': {e}", temp.display()))
        })?;
        temp_files.push((temp, target.clone()));
    }

    for (temp, target) in &temp_files {
        fs::rename(temp, target).map_err(|e| {
            cleanup_temp_files(&temp_files);
            HostError::WriteFailure(format!(
                "failed to rename '{}' to '{}': {e}",
                temp.display(),
                target.display()
            ))
        })?;
    }

    Ok(())
}

fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp, _) in temp_files {
        if !temp.exists() {
            continue;
        }
        if let Err(e) = fs::remove_file(temp) {
            warn!(file = %temp.display(), error = %e, "failed to remove temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_paths_stay_inside_dir() {
        let base = Path::new("/tmp/output");
        assert_eq!(
            validate_output_path(base, "assets/app-1234.js").unwrap(),
            Path::new("/tmp/output/assets/app-1234.js")
        );
        assert_eq!(
            validate_output_path(base, "./a/../app.js").unwrap(),
            Path::new("/tmp/output/app.js")
        );
        assert!(validate_output_path(base, "../../etc/passwd").is_err());
        assert!(validate_output_path(base, "a\0b").is_err());
    }

    #[test]
    fn out_dir_must_be_strictly_inside_root() {
        let root = Path::new("/work/app");
        assert_eq!(
            ensure_inside_root(root, Path::new("dist/public")).unwrap(),
            Path::new("/work/app/dist/public")
        );
        assert!(ensure_inside_root(root, Path::new("/work/app/build")).is_ok());

        for bad in [".", "./", "..", "../site", "dist/../..", "/work", "/elsewhere/dist", "/work/app"] {
            let err = ensure_inside_root(root, Path::new(bad)).unwrap_err();
            assert!(matches!(err, HostError::UnsafeOutDir { .. }), "{bad}");
        }
    }

    #[test]
    fn relative_root_is_handled() {
        assert!(ensure_inside_root(Path::new("."), Path::new("dist")).is_ok());
        assert!(ensure_inside_root(Path::new("."), Path::new(".")).is_err());
        assert!(ensure_inside_root(Path::new("."), Path::new("../dist")).is_err());
        assert!(ensure_inside_root(Path::new("app"), Path::new("..")).is_err());
    }

    #[test]
    fn empty_dir_keeps_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/old.js"), "old").unwrap();
        fs::write(dir.path().join("app.js"), "old").unwrap();

        empty_dir(dir.path()).unwrap();
        assert!(dir.path().is_dir());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        empty_dir(&dir.path().join("missing")).unwrap();
    }

    #[test]
    fn copy_dir_keeps_emitted_files() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("img")).unwrap();
        fs::write(src.path().join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(src.path().join("app.js"), "public").unwrap();
        fs::write(dest.path().join("app.js"), "bundled").unwrap();

        let copied = copy_dir(src.path(), dest.path()).unwrap();
        assert_eq!(copied, 1);
        assert_eq!(fs::read_to_string(dest.path().join("img/logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(dest.path().join("app.js")).unwrap(), "bundled");

        assert_eq!(copy_dir(&src.path().join("missing"), dest.path()).unwrap(), 0);
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), Path::new("pages/about.html"), b"<p>about</p>").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>about</p>");
        assert!(write_file(dir.path(), Path::new("../escape.html"), b"x").is_err());
    }
}
