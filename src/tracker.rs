use crate::commands::Command;
use crate::display::display_banner;
use crate::model::{Grade, Project, Student};
use crate::store::{Recording, Store};
use eyre::{Error, WrapErr};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

/// What an operation has to report to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    StudentFound(Student),
    StudentNotFound { github: String },
    StudentAdded(Student),
    ProjectFound(Project),
    ProjectNotFound { title: String },
    ProjectAdded(Project),
    GradeFound(Grade),
    NoGradeRecorded,
    GradeRecorded(Grade),
    GradeRejected { max_grade: i32 },
    GradeAlreadyRecorded(Grade),
    Commands,
}

pub async fn find_student(store: &mut Store, github: &str) -> Result<Outcome, Error> {
    Ok(match store.student(github).await? {
        Some(student) => Outcome::StudentFound(student),
        None => Outcome::StudentNotFound {
            github: github.to_owned(),
        },
    })
}

pub async fn create_student(
    store: &mut Store,
    first_name: &str,
    last_name: &str,
    github: &str,
) -> Result<Outcome, Error> {
    let student = Student::new(first_name, last_name, github);
    store.insert_student(&student).await?;
    info!(%student, "student added");
    Ok(Outcome::StudentAdded(student))
}

pub async fn find_project(store: &mut Store, title: &str) -> Result<Outcome, Error> {
    Ok(match store.project(title).await? {
        Some(project) => Outcome::ProjectFound(project),
        None => Outcome::ProjectNotFound {
            title: title.to_owned(),
        },
    })
}

pub async fn create_project(
    store: &mut Store,
    title: &str,
    max_grade: i32,
    description: &str,
) -> Result<Outcome, Error> {
    let project = Project::new(title, description, max_grade);
    store.insert_project(&project).await?;
    info!(%project, max_grade, "project added");
    Ok(Outcome::ProjectAdded(project))
}

pub async fn find_grade(store: &mut Store, github: &str, title: &str) -> Result<Outcome, Error> {
    Ok(match store.grade(github, title).await? {
        Some(grade) => Outcome::GradeFound(grade),
        None => Outcome::NoGradeRecorded,
    })
}

pub async fn record_grade(
    store: &mut Store,
    github: &str,
    title: &str,
    grade: i32,
) -> Result<Outcome, Error> {
    let grade = Grade::new(github, title, grade);
    Ok(match store.record_grade(&grade).await? {
        Recording::Recorded => {
            info!(github, title, grade = grade.grade, "grade recorded");
            Outcome::GradeRecorded(grade)
        }
        Recording::Exceeds { max_grade } => {
            debug!(github, title, grade = grade.grade, max_grade, "grade rejected");
            Outcome::GradeRejected { max_grade }
        }
        Recording::AlreadyGraded { grade: existing } => {
            debug!(github, title, grade = grade.grade, existing, "grade already recorded");
            Outcome::GradeAlreadyRecorded(Grade::new(github, title, existing))
        }
        Recording::UnknownProject => Outcome::ProjectNotFound {
            title: title.to_owned(),
        },
        Recording::UnknownStudent => Outcome::StudentNotFound {
            github: github.to_owned(),
        },
    })
}

/// Run the operation designated by `command`. `None` means that the
/// session is over.
pub async fn dispatch(store: &mut Store, command: Command) -> Result<Option<Outcome>, Error> {
    let outcome = match command {
        Command::Student { github } => find_student(store, &github).await?,
        Command::NewStudent {
            first_name,
            last_name,
            github,
        } => create_student(store, &first_name, &last_name, &github).await?,
        Command::SearchProject { title } => find_project(store, &title).await?,
        Command::NewProject {
            title,
            max_grade,
            description,
        } => create_project(store, &title, max_grade, &description).await?,
        Command::GetGrade { github, title } => find_grade(store, &github, &title).await?,
        Command::AssignGrade {
            github,
            title,
            grade,
        } => record_grade(store, &github, &title, grade).await?,
        Command::Help => Outcome::Commands,
        Command::Quit => return Ok(None),
    };
    Ok(Some(outcome))
}

/// Read commands from `input` and execute them until `quit` is entered
/// or the input is exhausted.
pub async fn run<R, W>(store: &mut Store, mut input: R, out: &mut W) -> Result<(), Error>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut banner = String::new();
    display_banner(&mut banner)?;
    write!(out, "{banner}")?;
    let mut buf = Vec::new();
    loop {
        write!(out, ">> ")?;
        out.flush()?;
        buf.clear();
        if input
            .read_until(b'\n', &mut buf)
            .await
            .wrap_err("cannot read command")?
            == 0
        {
            info!("end of input");
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                debug!(error = %e, "command is not valid UTF-8");
                writeln!(out, "Invalid Entry. Try again. (command is not valid UTF-8)")?;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                debug!(%line, error = %e, "invalid command");
                writeln!(out, "Invalid Entry. Try again. ({e})")?;
                continue;
            }
        };
        match dispatch(store, command).await {
            Ok(Some(outcome)) => writeln!(out, "{outcome}")?,
            Ok(None) => break,
            Err(e) => {
                error!("{e:#}");
                writeln!(out, "Error: {e:#}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_store;

    async fn session(store: &mut Store, input: &str) -> String {
        raw_session(store, input.as_bytes()).await
    }

    async fn raw_session(store: &mut Store, input: &[u8]) -> String {
        let mut out = Vec::new();
        run(store, input, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    async fn store_with_project() -> Store {
        let mut store = memory_store().await;
        create_project(&mut store, "proj1", 100, "Markov chains")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_then_find_student() {
        let mut store = memory_store().await;
        assert_eq!(
            create_student(&mut store, "Jane", "Doe", "jdoe")
                .await
                .unwrap()
                .to_string(),
            "Successfully added student: Jane Doe."
        );
        assert_eq!(
            find_student(&mut store, "jdoe").await.unwrap(),
            Outcome::StudentFound(Student::new("Jane", "Doe", "jdoe"))
        );
        assert_eq!(
            find_student(&mut store, "jane").await.unwrap(),
            Outcome::StudentNotFound {
                github: "jane".into()
            }
        );
    }

    #[tokio::test]
    async fn test_create_then_find_project() {
        let mut store = store_with_project().await;
        assert_eq!(
            find_project(&mut store, "proj1").await.unwrap(),
            Outcome::ProjectFound(Project::new("proj1", "Markov chains", 100))
        );
        assert_eq!(
            find_project(&mut store, "proj2").await.unwrap().to_string(),
            "No project titled proj2."
        );
    }

    #[tokio::test]
    async fn test_grades() {
        let mut store = store_with_project().await;
        create_student(&mut store, "Jane", "Doe", "jdoe")
            .await
            .unwrap();
        assert_eq!(
            find_grade(&mut store, "jdoe", "proj1").await.unwrap(),
            Outcome::NoGradeRecorded
        );
        assert_eq!(
            record_grade(&mut store, "jdoe", "proj1", 101).await.unwrap(),
            Outcome::GradeRejected { max_grade: 100 }
        );
        assert_eq!(
            find_grade(&mut store, "jdoe", "proj1").await.unwrap(),
            Outcome::NoGradeRecorded
        );
        assert_eq!(
            record_grade(&mut store, "jdoe", "proj1", 100)
                .await
                .unwrap()
                .to_string(),
            "Grade for proj1 has been recorded."
        );
        assert_eq!(
            find_grade(&mut store, "jdoe", "proj1")
                .await
                .unwrap()
                .to_string(),
            "Grade received on proj1: 100"
        );
        assert_eq!(
            record_grade(&mut store, "jdoe", "proj2", 10).await.unwrap(),
            Outcome::ProjectNotFound {
                title: "proj2".into()
            }
        );
    }

    #[tokio::test]
    async fn test_session_rejects_grade() {
        let mut store = store_with_project().await;
        let out = session(
            &mut store,
            "new_student Jane Doe jdoe\nassign_grade jdoe proj1 150\nget_grade jdoe proj1\nquit\n",
        )
        .await;
        assert!(out.starts_with("Welcome to the HBA Database!\n"));
        assert!(out.contains(">> Successfully added student: Jane Doe.\n"));
        assert!(out.contains(">> Invalid grade. Max grade is 100\n"));
        assert!(out.contains(">> No grade recorded.\n"));
        assert_eq!(store.grade("jdoe", "proj1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_stops_on_quit() {
        let mut store = memory_store().await;
        let out = session(
            &mut store,
            "new_student Jane Doe jdoe\n\nquit now\nQUIT\nexit\nquit\nnew_student John Doe jodoe\n",
        )
        .await;
        assert!(out.contains("Invalid Entry. Try again. (quit expects 0 arguments, got 1"));
        assert!(out.contains("Invalid Entry. Try again. (unknown command \"QUIT\")"));
        assert!(out.contains("Invalid Entry. Try again. (unknown command \"exit\")"));
        assert!(out.ends_with(">> "));
        assert!(store.student("jdoe").await.unwrap().is_some());
        assert!(store.student("jodoe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_survives_errors() {
        let mut store = memory_store().await;
        let out = session(
            &mut store,
            "student\nassign_grade jdoe proj1 lots\nnew_student Jane Doe jdoe\nnew_student John Doe jdoe\nstudent jdoe\n",
        )
        .await;
        assert!(out.contains("student expects 1 argument, got 0"));
        assert!(out.contains("grade must be an integer, got \"lots\""));
        assert!(out.contains("Error: cannot add student John Doe (jdoe)"));
        assert!(out.contains(">> Student: Jane Doe\nGitHub account: jdoe\n"));
    }

    #[tokio::test]
    async fn test_session_help() {
        let mut store = memory_store().await;
        let out = session(&mut store, "help\n").await;
        assert_eq!(out.matches("Here are the available commands:").count(), 2);
    }

    #[tokio::test]
    async fn test_session_survives_invalid_utf8() {
        let mut store = memory_store().await;
        let out = raw_session(
            &mut store,
            b"new_student Jane Doe jdoe\nstudent \xff\xfe\nnew_student John Doe jodoe\nquit\n",
        )
        .await;
        assert!(out.contains(">> Invalid Entry. Try again. (command is not valid UTF-8)\n"));
        assert!(out.contains(">> Successfully added student: John Doe.\n"));
        assert!(store.student("jodoe").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_session_grade_twice() {
        let mut store = store_with_project().await;
        let out = session(
            &mut store,
            "new_student Jane Doe jdoe\nassign_grade jdoe proj1 80\nassign_grade jdoe proj1 95\nget_grade jdoe proj1\n",
        )
        .await;
        assert_eq!(out.matches("Grade for proj1 has been recorded.").count(), 1);
        assert!(out.contains(">> A grade of 80 is already recorded for jdoe on proj1.\n"));
        assert!(out.contains(">> Grade received on proj1: 80\n"));
    }

    #[tokio::test]
    async fn test_dispatch_quit() {
        let mut store = memory_store().await;
        assert_eq!(dispatch(&mut store, Command::Quit).await.unwrap(), None);
        assert_eq!(
            dispatch(&mut store, Command::Help).await.unwrap(),
            Some(Outcome::Commands)
        );
    }
}
