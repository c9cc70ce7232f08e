use crate::cli_args::{ProjectOpts, ReportOpts, SelectionOpts};
use crate::output;
use anyhow::{Context, Result};
use monotenant_core::{Config, GenerationOptions, Generator};

pub fn handle_generate_command(
    selection: &SelectionOpts,
    project: &ProjectOpts,
    report: &ReportOpts,
    quiet: bool,
) -> Result<()> {
    let project_root = Config::determine_project_root(project.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = build_config(project_root, selection, project);
    log::debug!("Effective configuration: {:?}", config);
    let options = build_options(selection);
    log::debug!("Generation options: {:?}", options);

    let generator = Generator::new(config);
    let format = report.format.as_deref();

    // Dry run: resolve and print the plan, no files are written.
    if report.dry_run {
        log::debug!("Dry run requested; planning only.");
        let plan = generator
            .plan(&options)
            .context("Failed to plan template generation")?;
        return output::print_plan(&plan, generator.config(), format);
    }

    let generation_report = generator
        .run(&options)
        .context("Failed to generate mono-tenant templates")?;
    output::print_report(&generation_report, format, quiet)
}

fn build_config(
    project_root: std::path::PathBuf,
    selection: &SelectionOpts,
    project: &ProjectOpts,
) -> Config {
    // --legacy conflicts with --modules-dir at parse time.
    if selection.legacy {
        return Config::legacy(project_root);
    }
    let config = Config::new(project_root);
    match &project.modules_dir {
        Some(dir) => config.with_modules_dir(dir),
        None => config,
    }
}

fn build_options(selection: &SelectionOpts) -> GenerationOptions {
    if selection.legacy {
        return GenerationOptions::legacy();
    }
    GenerationOptions {
        steps: selection.steps.clone(),
        phase: selection.phase.clone(),
        emit_no_polymorphic: selection.no_polymorphic,
        skip_polymorphic: selection.skip_polymorphic,
    }
}
