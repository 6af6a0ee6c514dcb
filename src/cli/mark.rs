use std::{path::PathBuf, process};

use clap::Parser;
use gradplan::{
    CourseCode, Directory, RegistrationStatus, RequirementId,
    domain::{
        Decision, Reassignment, apply_course_click, apply_course_reassignment,
        apply_course_status_change,
    },
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Mark a course and count it toward a requirement")]
pub struct Mark {
    /// The course code
    #[clap(value_parser = super::parse_course)]
    course: CourseCode,

    /// The course requirement to count it toward
    #[clap(value_parser = super::parse_requirement)]
    requirement: RequirementId,

    /// Set this status instead of advancing to the next one
    #[arg(long, value_name = "STATUS")]
    status: Option<StatusArg>,

    /// Move the course without asking if it already counts elsewhere
    #[arg(long, short)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StatusArg {
    Unregistered,
    Registered,
    Acquired,
}

impl From<StatusArg> for RegistrationStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Unregistered => Self::Unregistered,
            StatusArg::Registered => Self::Registered,
            StatusArg::Acquired => Self::Acquired,
        }
    }
}

impl Mark {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::open(root)?;
        let tree = directory.tree();

        let reassignment = match self.status {
            None => apply_course_click(directory.plan(), tree, &self.course, &self.requirement)?,
            Some(status) => {
                let plan =
                    apply_course_status_change(directory.plan(), tree, &self.course, status.into())?;
                apply_course_reassignment(&plan, tree, &self.course, &self.requirement)?
            }
        };

        let plan = match reassignment {
            Reassignment::Applied(plan) => plan,
            Reassignment::NeedsConfirmation(pending) => {
                let confirmed = self.yes
                    || super::confirm(&format!(
                        "{} already counts toward {}. Move it to {}?",
                        pending.course(),
                        pending.current_requirement(),
                        pending.target_requirement()
                    ))?;
                let Some(plan) = pending.resolve(Decision::from(confirmed)) else {
                    println!("Cancelled");
                    process::exit(130);
                };
                plan
            }
        };

        let status = plan.status(&self.course);
        directory.save_plan(plan)?;

        println!(
            "{}",
            format!(
                "✅ {} is {status} and counts toward {}",
                self.course, self.requirement
            )
            .success()
        );
        Ok(())
    }
}
