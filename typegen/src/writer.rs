//! Writes rendered modules, leaving byte-identical files untouched.

use std::fs;
use std::path::Path;

use crate::emitter::RenderedModule;
use crate::errors::{Result, TypegenError};
use crate::report::{FileOutcome, FileStatus};

/// Write every module under `output_root`.
pub fn write_modules(output_root: &Path, modules: &[RenderedModule]) -> Result<Vec<FileOutcome>> {
    modules
        .iter()
        .map(|module| write_if_changed(&output_root.join(&module.path), &module.content))
        .collect()
}

/// Write `content` unless the file already holds exactly that.
pub fn write_if_changed(path: &Path, content: &str) -> Result<FileOutcome> {
    let unchanged = matches!(fs::read_to_string(path), Ok(existing) if existing == content);

    if unchanged {
        log::debug!("unchanged {}", path.display());
        return Ok(FileOutcome {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TypegenError::write(parent, e))?;
    }
    fs::write(path, content).map_err(|e| TypegenError::write(path, e))?;
    log::debug!("wrote {}", path.display());

    Ok(FileOutcome {
        path: path.to_path_buf(),
        status: FileStatus::Written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_second_write_is_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let modules = vec![RenderedModule {
            path: PathBuf::from("src/types/index.ts"),
            content: "export {};\n".to_string(),
        }];

        let first = write_modules(temp_dir.path(), &modules).unwrap();
        assert_eq!(first[0].status, FileStatus::Written);
        assert!(temp_dir.path().join("src/types/index.ts").exists());

        let second = write_modules(temp_dir.path(), &modules).unwrap();
        assert_eq!(second[0].status, FileStatus::Unchanged);
    }

    #[test]
    fn test_changed_content_is_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.ts");
        fs::write(&path, "stale\n").unwrap();

        let outcome = write_if_changed(&path, "fresh\n").unwrap();
        assert_eq!(outcome.status, FileStatus::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}
