use std::{path::PathBuf, process};

use clap::Parser;
use gradplan::Directory;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Replace the plan with a JSON snapshot")]
pub struct Import {
    /// The snapshot to import
    file: PathBuf,

    /// Replace the current plan without asking
    #[arg(long, short)]
    yes: bool,
}

impl Import {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::open(root)?;

        // Resolve first: a snapshot that does not fit leaves the plan alone.
        let plan = directory.read_snapshot(&self.file)?;

        if !self.yes
            && !directory.plan().is_empty()
            && !super::confirm("Importing replaces the current plan, which will be lost. Continue?")?
        {
            println!("Cancelled");
            process::exit(130);
        }

        directory.save_plan(plan)?;
        println!(
            "{}",
            format!("✅ Imported plan from {}", self.file.display()).success()
        );
        Ok(())
    }
}
