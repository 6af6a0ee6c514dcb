use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use gradplan::{Directory, Snapshot};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Write the plan as a JSON snapshot")]
pub struct Export {
    /// Write to this file instead of standard output
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Export {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::open(root)?;
        let content = Snapshot::from_plan(directory.plan())
            .stamped()
            .to_string_pretty();

        match self.output {
            Some(path) => {
                fs::write(&path, content)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!(
                    "{}",
                    format!("✅ Exported plan to {}", path.display()).success()
                );
            }
            None => println!("{content}"),
        }
        Ok(())
    }
}
