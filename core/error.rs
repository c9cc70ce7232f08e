use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Directory Not Found: Path '{path}', Error: {source}")]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Step Selection Parse Error: {0}")]
    StepParse(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory Creation Error: Path '{path}', Error: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("YAML Serialization Error: {0}")]
    YamlError(#[from] serde_yml::Error),
}

impl AppError {
    /// Builds a `DirectoryNotFound` from a walkdir failure, keeping the io cause when there is one.
    pub(crate) fn directory_not_found(path: PathBuf, err: walkdir::Error) -> Self {
        AppError::DirectoryNotFound {
            path,
            source: walk_io_error(err),
        }
    }

    /// Builds a `FileRead` for a listed script that walkdir could not stat.
    pub(crate) fn unreadable_entry(path: PathBuf, err: walkdir::Error) -> Self {
        AppError::FileRead {
            path,
            source: walk_io_error(err),
        }
    }
}

fn walk_io_error(err: walkdir::Error) -> std::io::Error {
    // Only symlink loops come without an io cause.
    match err.into_io_error() {
        Some(io_err) => io_err,
        None => std::io::Error::other("filesystem loop detected"),
    }
}
