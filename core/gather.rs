use crate::error::{AppError, Result};
use crate::keywords::KeywordSet;
use crate::step::extract_step_number;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SQL_EXTENSION_SUFFIX: &str = ".sql";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(skip)]
    pub path: PathBuf,
    pub basename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    pub polymorphic: bool,
    pub size: u64,
}

impl SourceFile {
    pub fn classify(path: PathBuf, basename: String, size: u64, keywords: &KeywordSet) -> Self {
        let step = extract_step_number(&basename);
        let polymorphic = keywords.is_polymorphic(&basename);
        log::trace!(
            "Classified {} (step: {:?}, polymorphic: {})",
            basename,
            step,
            polymorphic
        );
        Self {
            path,
            basename,
            step,
            polymorphic,
            size,
        }
    }
}

/// Lists the `.sql` files directly inside `directory`, sorted by basename.
pub fn list_sql_files(directory: &Path, keywords: &KeywordSet) -> Result<Vec<SourceFile>> {
    log::info!("Listing SQL modules in: {}", directory.display());
    if !directory.is_dir() {
        return Err(AppError::DirectoryNotFound {
            path: directory.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
        });
    }

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(AppError::directory_not_found(directory.to_path_buf(), e));
            }
            Err(e) => {
                // A listed script that cannot be stat'ed (e.g. a dangling symlink) aborts the run.
                let entry_path = e.path().map(Path::to_path_buf);
                let is_sql = entry_path
                    .as_deref()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(SQL_EXTENSION_SUFFIX));
                if is_sql {
                    let path = entry_path.unwrap_or_else(|| directory.to_path_buf());
                    log::error!("Cannot read SQL module {}: {}", path.display(), e);
                    return Err(AppError::unreadable_entry(path, e));
                }
                log::warn!(
                    "Skipping unreadable entry in {}: {}",
                    directory.display(),
                    e
                );
                continue;
            }
        };

        let Some(basename) = entry.file_name().to_str() else {
            log::warn!(
                "Skipping entry with non-UTF-8 name: {}",
                entry.path().display()
            );
            continue;
        };
        if !basename.ends_with(SQL_EXTENSION_SUFFIX) {
            log::trace!("Ignoring non-SQL entry: {}", basename);
            continue;
        }
        if !entry.file_type().is_file() {
            log::debug!("Ignoring non-file entry: {}", basename);
            continue;
        }

        // Size is only reported, never used for selection.
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                log::debug!("Could not read size of {}: {}", basename, e);
                0
            }
        };
        files.push(SourceFile::classify(
            entry.path().to_path_buf(),
            basename.to_string(),
            size,
            keywords,
        ));
    }

    files.sort_by(|a, b| a.basename.cmp(&b.basename));
    log::info!("Found {} SQL modules.", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn basenames(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.basename.as_str()).collect()
    }

    #[test]
    fn test_lists_only_sql_files_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in [
            "10_c.sql",
            "02_b.sql",
            "README.md",
            "01_a.sql",
            "notes.SQL",
            "schema.sql.bak",
            "Zeta.sql",
            "alpha.sql",
        ] {
            fs::write(tmp.path().join(name), "select 1;").unwrap();
        }

        let files = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap();
        assert_eq!(
            basenames(&files),
            vec!["01_a.sql", "02_b.sql", "10_c.sql", "Zeta.sql", "alpha.sql"]
        );
    }

    #[test]
    fn test_is_not_recursive_and_skips_sql_named_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("01_top.sql"), "").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("02_deep.sql"), "").unwrap();
        fs::create_dir(tmp.path().join("03_dir.sql")).unwrap();

        let files = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap();
        assert_eq!(basenames(&files), vec!["01_top.sql"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_sql_symlink_is_file_read_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("01_a.sql"), "select 1;").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("missing.sql"), tmp.path().join("02_b.sql"))
            .unwrap();

        let err = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap_err();
        match err {
            AppError::FileRead { path, .. } => assert_eq!(path, tmp.path().join("02_b.sql")),
            other => panic!("expected FileRead, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_non_sql_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("01_a.sql"), "select 1;").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("missing"), tmp.path().join("notes.txt"))
            .unwrap();

        let files = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap();
        assert_eq!(basenames(&files), vec!["01_a.sql"]);
    }

    #[test]
    fn test_classifies_step_polymorphic_and_size() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("02_polymorphic_validations_b.sql"), "abc").unwrap();
        fs::write(tmp.path().join("schema.sql"), "").unwrap();

        let files = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].step, Some(2));
        assert!(files[0].polymorphic);
        assert_eq!(files[0].size, 3);
        assert_eq!(files[0].path, tmp.path().join("02_polymorphic_validations_b.sql"));
        assert_eq!(files[1].step, None);
        assert!(!files[1].polymorphic);
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let files = list_sql_files(tmp.path(), &KeywordSet::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory_is_directory_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = list_sql_files(&tmp.path().join("missing"), &KeywordSet::default()).unwrap_err();
        assert!(matches!(err, AppError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_file_path_is_directory_not_found() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("01_a.sql");
        fs::write(&file, "").unwrap();
        let err = list_sql_files(&file, &KeywordSet::default()).unwrap_err();
        assert!(matches!(err, AppError::DirectoryNotFound { .. }));
    }
}
