use std::{path::PathBuf, process};

use clap::Parser;
use gradplan::{
    Directory, Requirement, RequirementId, Threshold,
    domain::{Assignment, Evaluator},
};
use tracing::instrument;

use super::terminal::{Colorize, marker, tally};

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a requirement")]
pub struct Show {
    /// The id of the requirement to display
    #[clap(value_parser = super::parse_requirement)]
    id: RequirementId,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root)?;

        let Some(node) = directory.tree().get(&self.id) else {
            eprintln!("Requirement {} not found", self.id);
            process::exit(1);
        };

        let evaluator = directory.evaluator();
        let summary = evaluator.summary(node);

        println!("# {}", node.title());
        println!("{}\n", node.id().as_str().dim());
        if let Some(description) = node.description() {
            println!("{description}\n");
        }

        println!("{}", "Status".dim());
        println!("  {} {}", marker(summary.status), summary.status);
        println!("  Required:   {}", summary.required);
        for threshold in Threshold::ALL {
            let label = match threshold {
                Threshold::Registered => "Registered:",
                Threshold::Acquired => "Acquired:  ",
            };
            println!("  {label} {}", tally(summary.tally(threshold), summary.required));
        }
        if !evaluator.active_nodes().contains(node.id()) {
            println!(
                "  {}",
                "Not selected: this requirement does not count toward graduation.".warning()
            );
        }

        match node {
            Requirement::Composite(_) => Self::output_children(&evaluator, &directory, node),
            Requirement::Selection(selection) => {
                let chosen = evaluator.active_choice(selection).map(Requirement::id);
                println!("\n{}", "Choices".dim());
                for choice in directory.tree().children(node) {
                    let pointer = if Some(choice.id()) == chosen { "→" } else { " " };
                    println!(
                        "  {pointer} {} {} {}",
                        marker(evaluator.status(choice)),
                        choice.title(),
                        choice.id().as_str().dim()
                    );
                }
            }
            Requirement::Courses(leaf) => {
                println!("\n{}", "Courses".dim());
                for course in &leaf.courses {
                    let status = directory.plan().status(&course.code);
                    let place = match evaluator.assignment(leaf, course) {
                        Assignment::Here => "counted here".success(),
                        Assignment::Elsewhere(owner) => format!("counted toward {owner}").warning(),
                        Assignment::Unassigned => "not counted".dim(),
                    };
                    println!(
                        "  {} {:<10} {} ({} credits, {status}) {place}",
                        marker(status),
                        course.code.as_str(),
                        course.title,
                        course.credits,
                    );
                }
                if leaf.allows_others {
                    let others = directory.plan().others_count(&leaf.id).unwrap_or_default();
                    println!("\n{}", "Other courses".dim());
                    println!("  Acquired:   {}", others.acquired());
                    println!("  Registered: {}", others.registered());
                    println!(
                        "{}",
                        "  Used only while none of the listed courses count here.".dim()
                    );
                }
            }
        }

        Ok(())
    }

    fn output_children(evaluator: &Evaluator<'_>, directory: &Directory, node: &Requirement) {
        println!("\n{}", "Children".dim());
        for child in directory.tree().children(node) {
            let summary = evaluator.summary(child);
            println!(
                "  {} {} {}",
                marker(summary.status),
                child.title(),
                tally(summary.acquired, summary.required).dim()
            );
        }
    }
}
