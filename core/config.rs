use crate::error::{AppError, Result};
use crate::keywords::KeywordSet;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const ROOT_ENV_VAR: &str = "MONOTENANT_ROOT";
pub const DEFAULT_MODULES_SUBDIR: &str = "Modules/Sql";
pub const LEGACY_MODULES_SUBDIR: &str = "Modules";
pub const DEFAULT_OUTPUT_SUBDIR: &str = "Full";
pub const PHASES_SUBDIR: &str = "Phases";
pub const PRIMARY_OUTPUT_FILENAME: &str = "mono_tenant_template.sql";
pub const NO_POLYMORPHIC_OUTPUT_FILENAME: &str = "mono_tenant_template_no_polymorphic.sql";

/// Where module scripts are read from and where templates are written to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub project_root: PathBuf,
    pub modules_dir: PathBuf,
    pub output_dir: PathBuf,
    pub phases_dir: PathBuf,
    pub keywords: KeywordSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub primary: PathBuf,
    pub no_polymorphic: PathBuf,
}

impl OutputTarget {
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            primary: dir.join(PRIMARY_OUTPUT_FILENAME),
            no_polymorphic: dir.join(NO_POLYMORPHIC_OUTPUT_FILENAME),
            dir,
        }
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::DirCreation {
            path: self.dir.clone(),
            source: e,
        })
    }
}

impl Config {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            modules_dir: project_root.join(DEFAULT_MODULES_SUBDIR),
            output_dir: project_root.join(DEFAULT_OUTPUT_SUBDIR),
            phases_dir: project_root.join(PHASES_SUBDIR),
            keywords: KeywordSet::default(),
            project_root,
        }
    }

    /// Layout of the earlier tool, which read scripts straight from `Modules/`.
    pub fn legacy(project_root: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(project_root);
        config.modules_dir = config.project_root.join(LEGACY_MODULES_SUBDIR);
        config
    }

    pub fn with_modules_dir(mut self, modules_dir: &Path) -> Self {
        self.modules_dir = self.resolve_against_root(modules_dir);
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    fn resolve_against_root(&self, path: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
        if expanded.is_absolute() {
            expanded
        } else {
            self.project_root.join(expanded)
        }
    }

    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var(ROOT_ENV_VAR).ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Computes the output location without touching the filesystem.
    pub fn output_target(&self, phase: Option<&str>) -> Result<OutputTarget> {
        // An empty phase name means no phase, same as an empty step selection.
        let dir = match phase {
            Some(name) if !name.is_empty() => {
                validate_phase_name(name)?;
                self.phases_dir.join(name)
            }
            _ => self.output_dir.clone(),
        };
        log::debug!("Output directory resolved to: {}", dir.display());
        Ok(OutputTarget::in_dir(dir))
    }

    /// Path relative to the project root when it lives below it, for display.
    pub fn display_path(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.project_root)
            .filter(|rel| !rel.starts_with(".."))
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

fn validate_phase_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\']) {
        return Err(AppError::InvalidArgument(format!(
            "Phase name '{}' must be a single directory name under '{}'",
            name, PHASES_SUBDIR
        )));
    }
    Ok(())
}
