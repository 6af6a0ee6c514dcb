use std::path::PathBuf;

use clap::Parser;
use gradplan::{
    Directory, RequirementId,
    domain::{OthersCountInput, apply_others_count_change},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Enter the credits earned from courses a requirement does not list")]
pub struct Others {
    /// A course requirement that accepts other courses
    #[clap(value_parser = super::parse_requirement)]
    requirement: RequirementId,

    /// Credits already earned
    #[arg(long)]
    acquired: Option<i64>,

    /// Credits planned on top of those earned
    #[arg(long, conflicts_with = "registered")]
    registered_excluding_acquired: Option<i64>,

    /// Credits earned or planned, in total
    #[arg(long)]
    registered: Option<i64>,
}

impl Others {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::open(root)?;
        let current = directory
            .plan()
            .others_count(&self.requirement)
            .unwrap_or_default();

        let input = OthersCountInput {
            acquired: self.acquired,
            registered_excluding_acquired: self.registered_excluding_acquired,
            registered_including_acquired: self.registered,
        };

        if input == OthersCountInput::default() {
            println!(
                "{}: {} acquired, {} registered",
                self.requirement,
                current.acquired(),
                current.registered()
            );
            return Ok(());
        }

        let counts = input.resolve(current)?;
        let plan = apply_others_count_change(
            directory.plan(),
            directory.tree(),
            &self.requirement,
            counts,
        )?;
        directory.save_plan(plan)?;

        println!(
            "{}",
            format!(
                "✅ {}: {} acquired, {} registered from other courses",
                self.requirement,
                counts.acquired(),
                counts.registered()
            )
            .success()
        );
        Ok(())
    }
}
