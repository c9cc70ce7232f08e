use crate::aggregate::aggregate_sql_files;
use crate::config::{Config, OutputTarget};
use crate::error::Result;
use crate::gather::{SourceFile, list_sql_files};
use crate::steps::StepSet;
use serde::Serialize;
use std::path::PathBuf;

/// What a single run should produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Step selection expression. `None` or an empty string disables step filtering.
    pub steps: Option<String>,
    /// Named output sub-directory under the phases directory.
    pub phase: Option<String>,
    /// Also write the template without polymorphic scripts.
    pub emit_no_polymorphic: bool,
    /// Leave polymorphic scripts out of the primary template.
    pub skip_polymorphic: bool,
}

impl GenerationOptions {
    /// Behaviour of the earlier tool: every script, both templates, default location.
    pub fn legacy() -> Self {
        Self {
            emit_no_polymorphic: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPlan {
    pub target: OutputTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_selection: Option<StepSet>,
    /// Listed scripts that survived the step filter.
    pub selected: Vec<SourceFile>,
    pub primary: Vec<SourceFile>,
    pub skip_polymorphic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_polymorphic: Option<Vec<SourceFile>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Primary,
    NoPolymorphic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSummary {
    pub kind: OutputKind,
    pub path: PathBuf,
    pub files: Vec<String>,
    pub polymorphic_excluded: bool,
}

impl OutputSummary {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub modules_dir: PathBuf,
    pub outputs: Vec<OutputSummary>,
}

pub struct Generator {
    config: Config,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves which scripts go where, without writing anything.
    pub fn plan(&self, options: &GenerationOptions) -> Result<GenerationPlan> {
        // Validate the selection and phase name before any file I/O.
        let step_selection = match options.steps.as_deref() {
            Some(expr) if !expr.is_empty() => Some(expr.parse::<StepSet>()?),
            _ => None,
        };
        let target = self.config.output_target(options.phase.as_deref())?;

        let listed = list_sql_files(&self.config.modules_dir, &self.config.keywords)?;
        let selected = match &step_selection {
            Some(wanted) => {
                if wanted.is_empty() {
                    log::warn!("Step selection selects no steps; templates will be empty.");
                }
                let kept = filter_by_steps(listed, wanted);
                log::info!(
                    "Step filter '{}' kept {} scripts.",
                    wanted,
                    kept.len()
                );
                kept
            }
            None => {
                log::debug!("No step selection; keeping all {} scripts.", listed.len());
                listed
            }
        };

        // Both templates derive from the step-filtered list, never from each other.
        let primary = if options.skip_polymorphic {
            without_polymorphic(&selected)
        } else {
            selected.clone()
        };
        let no_polymorphic = options
            .emit_no_polymorphic
            .then(|| without_polymorphic(&selected));

        Ok(GenerationPlan {
            target,
            step_selection,
            selected,
            primary,
            skip_polymorphic: options.skip_polymorphic,
            no_polymorphic,
        })
    }

    pub fn run(&self, options: &GenerationOptions) -> Result<GenerationReport> {
        let plan = self.plan(options)?;
        self.execute(&plan)
    }

    /// Writes the templates described by `plan`.
    pub fn execute(&self, plan: &GenerationPlan) -> Result<GenerationReport> {
        plan.target.ensure_dir()?;

        let mut outputs = Vec::with_capacity(2);

        // Primary template
        aggregate_sql_files(&plan.primary, &plan.target.primary)?;
        log::info!(
            "Primary template written: {} ({} scripts)",
            plan.target.primary.display(),
            plan.primary.len()
        );
        outputs.push(OutputSummary {
            kind: OutputKind::Primary,
            path: plan.target.primary.clone(),
            files: basenames(&plan.primary),
            polymorphic_excluded: plan.skip_polymorphic,
        });

        // Optional no-polymorphic template
        if let Some(files) = &plan.no_polymorphic {
            aggregate_sql_files(files, &plan.target.no_polymorphic)?;
            log::info!(
                "No-polymorphic template written: {} ({} scripts)",
                plan.target.no_polymorphic.display(),
                files.len()
            );
            outputs.push(OutputSummary {
                kind: OutputKind::NoPolymorphic,
                path: plan.target.no_polymorphic.clone(),
                files: basenames(files),
                polymorphic_excluded: true,
            });
        }

        Ok(GenerationReport {
            modules_dir: self.config.modules_dir.clone(),
            outputs,
        })
    }
}

/// Keeps scripts whose step is present and selected. Scripts without a step are dropped.
pub fn filter_by_steps(files: Vec<SourceFile>, wanted: &StepSet) -> Vec<SourceFile> {
    files
        .into_iter()
        .filter(|file| match file.step {
            Some(step) if wanted.contains(step) => true,
            Some(step) => {
                log::trace!("Dropping {} (step {} not selected)", file.basename, step);
                false
            }
            None => {
                log::trace!("Dropping {} (no step number)", file.basename);
                false
            }
        })
        .collect()
}

fn without_polymorphic(files: &[SourceFile]) -> Vec<SourceFile> {
    files
        .iter()
        .filter(|file| !file.polymorphic)
        .cloned()
        .collect()
}

fn basenames(files: &[SourceFile]) -> Vec<String> {
    files.iter().map(|f| f.basename.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordSet;
    use std::path::Path;

    fn file(name: &str) -> SourceFile {
        SourceFile::classify(
            Path::new("/m").join(name),
            name.to_string(),
            0,
            &KeywordSet::default(),
        )
    }

    #[test]
    fn test_filter_by_steps_drops_absent_steps() {
        let files = vec![
            file("00_init.sql"),
            file("01_a.sql"),
            file("02_03_b.sql"),
            file("10_c.sql"),
            file("schema.sql"),
        ];
        let wanted: StepSet = "0-2".parse().unwrap();
        let kept = filter_by_steps(files, &wanted);
        assert_eq!(
            basenames(&kept),
            vec!["00_init.sql", "01_a.sql", "02_03_b.sql"]
        );
    }

    #[test]
    fn test_without_polymorphic_keeps_order() {
        let files = vec![
            file("01_a.sql"),
            file("02_item_polymorphic_validations.sql"),
            file("03_b.sql"),
        ];
        let kept = without_polymorphic(&files);
        assert_eq!(basenames(&kept), vec!["01_a.sql", "03_b.sql"]);
    }

    #[test]
    fn test_legacy_options_emit_both_without_filters() {
        let options = GenerationOptions::legacy();
        assert!(options.emit_no_polymorphic);
        assert!(!options.skip_polymorphic);
        assert!(options.steps.is_none());
        assert!(options.phase.is_none());
    }
}
