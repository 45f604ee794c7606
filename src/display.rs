use crate::commands::USAGE;
use crate::tracker::Outcome;
use std::fmt;

pub fn display_banner(out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "Welcome to the HBA Database!")?;
    display_commands(out)
}

pub fn display_commands(out: &mut impl fmt::Write) -> fmt::Result {
    writeln!(out, "Here are the available commands:")?;
    for usage in USAGE {
        writeln!(out, "  {usage}")?;
    }
    Ok(())
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::StudentFound(s) => write!(
                f,
                "Student: {} {}\nGitHub account: {}",
                s.first_name, s.last_name, s.github
            ),
            Outcome::StudentNotFound { github } => {
                write!(f, "No student with GitHub account {github}.")
            }
            Outcome::StudentAdded(s) => write!(
                f,
                "Successfully added student: {} {}.",
                s.first_name, s.last_name
            ),
            Outcome::ProjectFound(p) => write!(
                f,
                "Project Title: {}\nProject Description: {}\nMax Grade: {}",
                p.title, p.description, p.max_grade
            ),
            Outcome::ProjectNotFound { title } => write!(f, "No project titled {title}."),
            Outcome::ProjectAdded(p) => write!(f, "Successfully added project: {}.", p.title),
            Outcome::GradeFound(g) => {
                write!(f, "Grade received on {}: {}", g.project_title, g.grade)
            }
            Outcome::NoGradeRecorded => write!(f, "No grade recorded."),
            Outcome::GradeRecorded(g) => {
                write!(f, "Grade for {} has been recorded.", g.project_title)
            }
            Outcome::GradeRejected { max_grade } => {
                write!(f, "Invalid grade. Max grade is {max_grade}")
            }
            Outcome::GradeAlreadyRecorded(g) => write!(
                f,
                "A grade of {} is already recorded for {} on {}.",
                g.grade, g.student_github, g.project_title
            ),
            Outcome::Commands => display_commands(f),
        }
    }
}
