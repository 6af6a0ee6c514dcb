//! `grad`: check a course plan against graduation requirements from the
//! command line.

use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
