use std::path::PathBuf;

use clap::Parser;
use gradplan::{Directory, RequirementId, domain::apply_selection_change};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Choose an alternative of a selection requirement")]
pub struct Select {
    /// The selection requirement
    #[clap(value_parser = super::parse_requirement)]
    selection: RequirementId,

    /// The alternative to make active
    #[clap(value_parser = super::parse_requirement)]
    choice: RequirementId,
}

impl Select {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::open(root)?;
        let plan =
            apply_selection_change(directory.plan(), directory.tree(), &self.selection, &self.choice)?;
        directory.save_plan(plan)?;

        let title = directory
            .tree()
            .get(&self.choice)
            .map_or_else(|| self.choice.to_string(), |choice| choice.title().to_string());
        println!("{}", format!("✅ {} now follows {title}", self.selection).success());
        Ok(())
    }
}
