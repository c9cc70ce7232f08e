use crate::error::{AppError, Result};
use crate::gather::SourceFile;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Concatenates `files`, in the order given, into `output_path`.
///
/// The output is created or truncated. Each script is wrapped as
///
/// ```text
/// -- START OF: <basename>
/// <content, byte for byte>
/// -- END OF: <basename>
///
/// ```
///
/// A failed pass leaves whatever was already written in place.
pub fn aggregate_sql_files(files: &[SourceFile], output_path: &Path) -> Result<usize> {
    log::debug!(
        "Aggregating {} files into {}",
        files.len(),
        output_path.display()
    );
    let write_err = |e: std::io::Error| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    };

    let file = File::create(output_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    for source in files {
        let content = fs::read(&source.path).map_err(|e| AppError::FileRead {
            path: source.path.clone(),
            source: e,
        })?;
        log::trace!("Appending {} ({} bytes)", source.basename, content.len());

        // Markers use the basename only; content is not re-encoded.
        writeln!(writer, "-- START OF: {}", source.basename).map_err(write_err)?;
        writer.write_all(&content).map_err(write_err)?;
        writeln!(writer, "\n-- END OF: {}\n", source.basename).map_err(write_err)?;
    }

    writer.flush().map_err(write_err)?;
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source(dir: &Path, name: &str, content: &[u8]) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        SourceFile::classify(
            path,
            name.to_string(),
            content.len() as u64,
            &KeywordSet::default(),
        )
    }

    #[test]
    fn test_wraps_each_file_with_markers() {
        let tmp = TempDir::new().unwrap();
        let files = vec![
            source(tmp.path(), "A.sql", b"x"),
            source(tmp.path(), "B.sql", b"y"),
        ];
        let out = tmp.path().join("out.sql");

        let written = aggregate_sql_files(&files, &out).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "-- START OF: A.sql\nx\n-- END OF: A.sql\n\n-- START OF: B.sql\ny\n-- END OF: B.sql\n\n"
        );
    }

    #[test]
    fn test_keeps_supplied_order_and_content_verbatim() {
        let tmp = TempDir::new().unwrap();
        let files = vec![
            source(tmp.path(), "02_b.sql", b"create table b();\n"),
            source(tmp.path(), "01_a.sql", b"-- comment\r\n\xef\xbb\xbfselect 1;"),
        ];
        let out = tmp.path().join("out.sql");

        aggregate_sql_files(&files, &out).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(b"-- START OF: 02_b.sql\ncreate table b();\n\n-- END OF: 02_b.sql\n\n");
        expected.extend_from_slice(b"-- START OF: 01_a.sql\n-- comment\r\n\xef\xbb\xbfselect 1;\n-- END OF: 01_a.sql\n\n");
        assert_eq!(fs::read(&out).unwrap(), expected);
    }

    #[test]
    fn test_empty_list_truncates_output() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out.sql");
        fs::write(&out, "stale content").unwrap();

        assert_eq!(aggregate_sql_files(&[], &out).unwrap(), 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn test_missing_input_is_file_read_error() {
        let tmp = TempDir::new().unwrap();
        let ghost = SourceFile::classify(
            tmp.path().join("ghost.sql"),
            "ghost.sql".to_string(),
            0,
            &KeywordSet::default(),
        );
        let err = aggregate_sql_files(&[ghost], &tmp.path().join("out.sql")).unwrap_err();
        match err {
            AppError::FileRead { path, .. } => assert_eq!(path, tmp.path().join("ghost.sql")),
            other => panic!("expected FileRead, got {:?}", other),
        }
    }

    #[test]
    fn test_unwritable_output_is_file_write_error() {
        let tmp = TempDir::new().unwrap();
        let out: PathBuf = tmp.path().join("no_such_dir").join("out.sql");
        let err = aggregate_sql_files(&[], &out).unwrap_err();
        assert!(matches!(err, AppError::FileWrite { .. }));
    }
}
