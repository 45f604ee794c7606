use eyre::{Error, bail, ensure};
use std::str::FromStr;

/// Usage line of every interactive command, in the order they are listed to the user.
pub const USAGE: &[&str] = &[
    "student <github>",
    "new_student <first_name> <last_name> <github>",
    "search_project <title>",
    "new_project <title> <max_grade> <description...>",
    "get_grade <github> <title>",
    "assign_grade <github> <title> <grade>",
    "help",
    "quit",
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Student {
        github: String,
    },
    NewStudent {
        first_name: String,
        last_name: String,
        github: String,
    },
    SearchProject {
        title: String,
    },
    NewProject {
        title: String,
        max_grade: i32,
        description: String,
    },
    GetGrade {
        github: String,
        title: String,
    },
    AssignGrade {
        github: String,
        title: String,
        grade: i32,
    },
    Help,
    Quit,
}

fn usage(command: &str) -> &'static str {
    USAGE
        .iter()
        .find(|u| u.split_whitespace().next() == Some(command))
        .copied()
        .unwrap_or_default()
}

fn arguments<'a, const N: usize>(command: &str, args: &[&'a str]) -> Result<[&'a str; N], Error> {
    match <[&str; N]>::try_from(args) {
        Ok(args) => Ok(args),
        Err(_) => bail!(
            "{command} expects {N} argument{}, got {} (usage: {})",
            if N == 1 { "" } else { "s" },
            args.len(),
            usage(command)
        ),
    }
}

fn integer(what: &str, value: &str) -> Result<i32, Error> {
    value
        .parse()
        .map_err(|_| eyre::eyre!("{what} must be an integer, got {value:?}"))
}

impl FromStr for Command {
    type Err = Error;

    /// Parse a non-blank command line.
    fn from_str(line: &str) -> Result<Command, Error> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let Some((&command, args)) = tokens.split_first() else {
            bail!("empty command");
        };
        Ok(match command {
            "student" => {
                let [github] = arguments::<1>(command, args)?;
                Command::Student {
                    github: github.to_owned(),
                }
            }
            "new_student" => {
                let [first_name, last_name, github] = arguments::<3>(command, args)?;
                Command::NewStudent {
                    first_name: first_name.to_owned(),
                    last_name: last_name.to_owned(),
                    github: github.to_owned(),
                }
            }
            "search_project" => {
                let [title] = arguments::<1>(command, args)?;
                Command::SearchProject {
                    title: title.to_owned(),
                }
            }
            "new_project" => {
                ensure!(
                    args.len() >= 3,
                    "{command} expects at least 3 arguments, got {} (usage: {})",
                    args.len(),
                    usage(command)
                );
                let max_grade = integer("max_grade", args[1])?;
                ensure!(max_grade > 0, "max_grade must be positive, got {max_grade}");
                Command::NewProject {
                    title: args[0].to_owned(),
                    max_grade,
                    description: args[2..].join(" "),
                }
            }
            "get_grade" => {
                let [github, title] = arguments::<2>(command, args)?;
                Command::GetGrade {
                    github: github.to_owned(),
                    title: title.to_owned(),
                }
            }
            "assign_grade" => {
                let [github, title, grade] = arguments::<3>(command, args)?;
                Command::AssignGrade {
                    github: github.to_owned(),
                    title: title.to_owned(),
                    grade: integer("grade", grade)?,
                }
            }
            "help" => {
                let [] = arguments::<0>(command, args)?;
                Command::Help
            }
            "quit" => {
                let [] = arguments::<0>(command, args)?;
                Command::Quit
            }
            other => bail!("unknown command {other:?}"),
        })
    }
}
