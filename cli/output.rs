use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use monotenant_core::{AppError, Config, GenerationPlan, GenerationReport, OutputSummary};
use serde::Serialize;
use std::io::{self, Write};

pub fn print_report(
    report: &GenerationReport,
    format: Option<&str>,
    quiet: bool,
) -> Result<()> {
    match format.unwrap_or("text") {
        "text" => {
            if quiet {
                return Ok(());
            }
            for output in &report.outputs {
                println!("{}", summary_line(output));
            }
            Ok(())
        }
        other => write_to_stdout(&serialize_output(report, other)?),
    }
}

/// One line per written template, e.g. `Aggregated 3 files into Full/mono_tenant_template.sql`.
fn summary_line(output: &OutputSummary) -> String {
    format!(
        "Aggregated {} files into {}",
        output.file_count(),
        output.path.display()
    )
}

pub fn print_plan(plan: &GenerationPlan, config: &Config, format: Option<&str>) -> Result<()> {
    match format.unwrap_or("text") {
        "text" => print_plan_pretty_table(plan, config),
        other => write_to_stdout(&serialize_output(plan, other)?),
    }
}

fn print_plan_pretty_table(plan: &GenerationPlan, config: &Config) -> Result<()> {
    println!();
    println!("{}", " Generation Plan (dry run) ".green().bold().underline());
    println!(
        "{:<18} {}",
        "Modules:".green(),
        config.display_path(&config.modules_dir).cyan()
    );
    println!(
        "{:<18} {}",
        "Output Dir:".green(),
        config.display_path(&plan.target.dir).cyan()
    );
    let selection = plan
        .step_selection
        .as_ref()
        .map_or_else(|| "all".to_string(), ToString::to_string);
    println!("{:<18} {}", "Steps:".green(), selection.cyan());

    if plan.selected.is_empty() {
        println!("\n{}", "(No scripts selected)".yellow());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Script").fg(Color::Green),
        Cell::new("Step").fg(Color::Green),
        Cell::new("Polymorphic").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Primary").fg(Color::Green),
        Cell::new("No-Poly").fg(Color::Green),
    ]);

    let mark = |included: bool| if included { "x" } else { "" };
    for file in &plan.selected {
        let in_primary = plan.primary.iter().any(|f| f.basename == file.basename);
        let in_no_poly = plan
            .no_polymorphic
            .as_ref()
            .is_some_and(|files| files.iter().any(|f| f.basename == file.basename));
        let size = Byte::from_u64(file.size)
            .get_appropriate_unit(UnitType::Binary)
            .to_string();

        table.add_row(vec![
            Cell::new(&file.basename).fg(Color::Cyan),
            Cell::new(file.step.map(|s| s.to_string()).unwrap_or_default())
                .set_alignment(CellAlignment::Right),
            Cell::new(mark(file.polymorphic)).set_alignment(CellAlignment::Center),
            Cell::new(size)
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
            Cell::new(mark(in_primary)).set_alignment(CellAlignment::Center),
            Cell::new(mark(in_no_poly)).set_alignment(CellAlignment::Center),
        ]);
    }
    println!("{table}");

    println!(
        "{:<18} {}",
        "Primary:".green(),
        format!("{} scripts", plan.primary.len()).cyan()
    );
    if let Some(files) = &plan.no_polymorphic {
        println!(
            "{:<18} {}",
            "No-Polymorphic:".green(),
            format!("{} scripts", files.len()).cyan()
        );
    }
    println!();
    Ok(())
}

fn serialize_output<T: Serialize>(data: &T, format: &str) -> Result<String> {
    match format {
        "yaml" => serde_yml::to_string(data)
            .map_err(AppError::from)
            .map_err(anyhow::Error::from),
        _ => serde_json::to_string_pretty(data)
            .map_err(AppError::from)
            .map_err(anyhow::Error::from),
    }
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
