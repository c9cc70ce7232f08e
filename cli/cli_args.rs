use clap::{Args, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectOpts {
    #[arg(
        long,
        help = "Schema project root containing Modules/, Full/ and Phases/ (default: $MONOTENANT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Read module scripts from this directory instead of Modules/Sql (relative to the project root).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub modules_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    #[arg(
        long,
        help = "Comma-separated step numbers or inclusive ranges, e.g. '1-5,7,10'. Omit to include every step.",
        value_name = "EXPR",
        help_heading = "Selection"
    )]
    pub steps: Option<String>,

    #[arg(
        long,
        help = "Write the template(s) to Phases/<NAME> instead of Full/.",
        value_name = "NAME",
        help_heading = "Selection"
    )]
    pub phase: Option<String>,

    #[arg(
        long,
        help = "Also generate a version without polymorphic scripts.",
        help_heading = "Selection"
    )]
    pub no_polymorphic: bool,

    #[arg(
        long,
        help = "Skip polymorphic scripts in the main output file.",
        help_heading = "Selection"
    )]
    pub skip_polymorphic: bool,

    #[arg(
        long,
        help = "Earlier fixed behaviour: read Modules/, write both templates to Full/.",
        conflicts_with_all = ["steps", "phase", "skip_polymorphic", "modules_dir"],
        help_heading = "Selection"
    )]
    pub legacy: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportOpts {
    #[arg(short = 'f', long, help = "Set the summary format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Control")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Show which scripts would be aggregated without writing any file.",
        help_heading = "Output Control"
    )]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "monotenant",
    author,
    version,
    about = "Aggregate module SQL files into mono-tenant templates.",
    long_about = "monotenant concatenates the SQL module scripts of a schema project, in filename order, \ninto mono_tenant_template.sql and optionally mono_tenant_template_no_polymorphic.sql.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  monotenant\n  monotenant --steps 1-5,7 --phase Phase1 --no-polymorphic\n  monotenant --skip-polymorphic --dry-run\n  monotenant --legacy"
)]
pub struct Cli {
    #[clap(flatten)]
    pub selection: SelectionOpts,
    #[clap(flatten)]
    pub project: ProjectOpts,
    #[clap(flatten)]
    pub report: ReportOpts,

    #[arg(
        long,
        value_name = "SHELL",
        value_enum,
        help = "Print a shell completion script and exit."
    )]
    pub completions: Option<Shell>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}
