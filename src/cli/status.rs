use std::path::PathBuf;

use clap::Parser;
use gradplan::{
    Directory, Evaluator, Requirement, RequirementId,
    domain::{Assignment, Summary},
};
use serde_json::{Value, json};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow, marker, tally};

#[derive(Debug, Parser, Default)]
#[command(about = "Show every requirement with its status and credit counts")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// List only the courses counted toward each requirement
    #[arg(long)]
    only_registered: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root)?;
        let only_registered = self.only_registered || directory.config().only_registered;

        match self.output {
            OutputFormat::Table => Self::output_table(&directory, only_registered),
            OutputFormat::Json => Self::output_json(&directory, only_registered)?,
        }
        Ok(())
    }

    fn output_table(directory: &Directory, only_registered: bool) {
        let evaluator = directory.evaluator();
        let active = evaluator.active_nodes();
        let narrow = is_narrow();

        for (depth, node) in directory.tree().walk() {
            let indent = "  ".repeat(depth);
            let summary = evaluator.summary(node);
            let title = if active.contains(node.id()) {
                node.title().to_string()
            } else {
                format!("{} (not selected)", node.title()).dim()
            };

            let counts = counts(&summary);
            if narrow {
                println!("{indent}{} {title}", marker(summary.status));
                println!("{indent}  {}", counts.dim());
            } else {
                println!("{indent}{} {title}  {}", marker(summary.status), counts.dim());
            }

            if let Requirement::Courses(leaf) = node {
                for course in evaluator.listed_courses(leaf, only_registered) {
                    let status = directory.plan().status(&course.code);
                    let note = match evaluator.assignment(leaf, course) {
                        Assignment::Elsewhere(owner) => format!("  counts toward {owner}").warning(),
                        Assignment::Here | Assignment::Unassigned => String::new(),
                    };
                    println!(
                        "{indent}    {} {} {} ({}){note}",
                        marker(status),
                        course.code,
                        course.title,
                        course.credits
                    );
                }
                if let Some(others) = directory.plan().others_count(&leaf.id) {
                    println!(
                        "{indent}    {} {}",
                        "+".info(),
                        format!(
                            "other courses: {} acquired, {} registered",
                            others.acquired(),
                            others.registered()
                        )
                        .dim()
                    );
                }
            }
        }
    }

    fn output_json(directory: &Directory, only_registered: bool) -> anyhow::Result<()> {
        let evaluator = directory.evaluator();
        let active = evaluator.active_nodes();

        let nodes: Vec<Value> = directory
            .tree()
            .walk()
            .into_iter()
            .map(|(depth, node)| {
                node_json(
                    &evaluator,
                    directory,
                    node,
                    depth,
                    active.contains(node.id()),
                    only_registered,
                )
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json!({ "requirements": nodes }))?);
        Ok(())
    }
}

fn counts(summary: &Summary) -> String {
    format!(
        "acquired {}  registered {}",
        tally(summary.acquired, summary.required),
        tally(summary.registered, summary.required)
    )
}

fn node_json(
    evaluator: &Evaluator<'_>,
    directory: &Directory,
    node: &Requirement,
    depth: usize,
    active: bool,
    only_registered: bool,
) -> Value {
    let summary = evaluator.summary(node);
    let mut value = json!({
        "id": node.id(),
        "title": node.title(),
        "kind": node.kind(),
        "depth": depth,
        "active": active,
        "status": summary.status,
        "required": { "min": summary.required.min(), "max": summary.required.max() },
        "acquired": { "capped": summary.acquired.capped, "uncapped": summary.acquired.uncapped },
        "registered": { "capped": summary.registered.capped, "uncapped": summary.registered.uncapped },
    });

    match node {
        Requirement::Selection(selection) => {
            value["chosen"] = json!(evaluator.active_choice(selection).map(Requirement::id));
        }
        Requirement::Courses(leaf) => {
            let courses: Vec<Value> = evaluator
                .listed_courses(leaf, only_registered)
                .into_iter()
                .map(|course| {
                    json!({
                        "code": course.code,
                        "title": course.title,
                        "credits": course.credits,
                        "status": directory.plan().status(&course.code),
                        "countsToward": directory.plan().requirement_of(&course.code).map(RequirementId::as_str),
                    })
                })
                .collect();
            value["courses"] = json!(courses);
            if let Some(others) = directory.plan().others_count(&leaf.id) {
                value["others"] = json!(others);
            }
        }
        Requirement::Composite(_) => {}
    }
    value
}
