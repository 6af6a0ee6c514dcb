use std::path::PathBuf;

mod export;
mod import;
mod mark;
mod others;
mod select;
mod show;
mod status;
mod terminal;

use clap::ArgAction;
use export::Export;
use gradplan::{CourseCode, RequirementId};
use import::Import;
use mark::Mark;
use others::Others;
use select::Select;
use show::Show;
use status::Status;

fn parse_course(s: &str) -> Result<CourseCode, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_requirement(s: &str) -> Result<RequirementId, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Ask a yes/no question on the terminal. Anything but yes is no.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the planner workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show every requirement with its status and credit counts (default)
    Status(Status),

    /// Show a single requirement in detail
    Show(Show),

    /// Mark a course and count it toward a requirement
    ///
    /// Without `--status`, each call advances the course from unregistered
    /// to registered to acquired and back to unregistered.
    Mark(Mark),

    /// Choose an alternative of a selection requirement
    Select(Select),

    /// Enter the credits earned from courses a requirement does not list
    Others(Others),

    /// Write the plan as a JSON snapshot
    Export(Export),

    /// Replace the plan with a JSON snapshot
    Import(Import),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Mark(command) => command.run(root)?,
            Self::Select(command) => command.run(root)?,
            Self::Others(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
            Self::Import(command) => command.run(root)?,
        }
        Ok(())
    }
}
