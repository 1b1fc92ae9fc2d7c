use crate::Format;
use colored::Colorize;
use envstate_cloud::InstanceInfo;
use envstate_engine::{EnvironmentView, Outcome, StepStatus, TransitionReport};

type Column = (&'static str, fn(&InstanceInfo) -> String);

/// Table columns, in display order
const COLUMNS: &[Column] = &[
    ("NAME", |i: &InstanceInfo| i.name.clone()),
    ("STATUS", |i: &InstanceInfo| i.status.clone()),
    ("INTERNAL IP", |i: &InstanceInfo| i.internal_ip.clone()),
    ("EXTERNAL IP", |i: &InstanceInfo| i.external_ip.clone()),
    ("TYPE", |i: &InstanceInfo| i.machine_type.clone()),
    ("PREEMPTIBLE", |i: &InstanceInfo| i.preemptible.to_string()),
];

pub fn print_banner(name: &str, label: &str) {
    let rule = "=".repeat(40);
    println!();
    println!("{}", rule.dimmed());
    println!("ENVIRONMENT: {}", name.cyan().bold());
    println!("LABEL: {}", label.cyan());
    println!("{}", rule.dimmed());
}

pub fn print_outcome(outcome: &Outcome, format: Format) -> anyhow::Result<()> {
    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        Outcome::Transition { report } => print_report(report),
        Outcome::Environments { environments } => {
            for env in environments {
                print_environment(env);
            }
        }
        Outcome::Instances { instances } => print_table(instances),
        Outcome::Status { name, status } => println!("{}: {}", name.cyan(), colored_status(status)),
    }
    Ok(())
}

fn print_report(report: &TransitionReport) {
    println!();
    for step in &report.steps {
        let marker = match step.status {
            StepStatus::Succeeded => "✓".green(),
            StepStatus::Skipped => "-".dimmed(),
            StepStatus::Warning => "⚠".yellow(),
            StepStatus::Failed => "✗".red(),
        };
        println!(
            "{} {:<24} {:<6} {}",
            marker,
            step.location.instance.cyan(),
            step.step,
            step.message
        );
        if let Some(output) = &step.output {
            for line in output.lines() {
                println!("    {}", line.dimmed());
            }
        }
    }

    println!();
    let summary = report.summary();
    let line = format!("{} {} ({} ms)", report.verb, summary, report.duration_ms);
    if summary.failed > 0 {
        println!("{}", line.red().bold());
    } else if summary.warnings > 0 {
        println!("{}", line.yellow().bold());
    } else {
        println!("{}", line.green().bold());
    }
}

fn print_environment(env: &EnvironmentView) {
    print_banner(&env.name, &env.label);
    for group in &env.groups {
        println!();
        println!(
            "GROUP: {} ({}/{})",
            group.name.bold(),
            group.project,
            group.zone
        );
        print_table(&group.instances);
        for error in &group.errors {
            println!("{} {}", "⚠".yellow(), error.yellow());
        }
    }
}

fn print_table(instances: &[InstanceInfo]) {
    if instances.is_empty() {
        println!("{}", "no instances".dimmed());
        return;
    }

    let rows: Vec<Vec<String>> = instances
        .iter()
        .map(|info| COLUMNS.iter().map(|(_, value)| value(info)).collect())
        .collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            rows.iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(label.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(&widths)
        .map(|((label, _), &width)| format!("{label:<width$}"))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", cells.join("  "));
    }
}

fn colored_status(status: &str) -> colored::ColoredString {
    if status == "RUNNING" {
        status.green()
    } else {
        status.red()
    }
}
