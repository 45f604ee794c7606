use crate::model::{Grade, Project, Student};
use eyre::{Error, WrapErr};
use sqlx::any::AnyConnectOptions;
use sqlx::{AnyConnection, Connection};
use std::str::FromStr;
use tracing::{debug, instrument, trace};

/// Result of an attempt to record a grade.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recording {
    Recorded,
    Exceeds { max_grade: i32 },
    UnknownProject,
    UnknownStudent,
    AlreadyGraded { grade: i32 },
}

/// Handle on the tracker database. One connection is held for the
/// whole lifetime of the handle and released by [`Store::close`].
pub struct Store {
    conn: AnyConnection,
}

impl Store {
    pub async fn connect(s: &str) -> Result<Self, Error> {
        sqlx::any::install_default_drivers();
        let conn = AnyConnection::connect_with(&AnyConnectOptions::from_str(s)?).await?;
        debug!(url = s, "connected to database");
        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<(), Error> {
        self.conn
            .close()
            .await
            .wrap_err("cannot close database connection")
    }

    #[instrument(skip_all, fields(github = %github))]
    pub async fn student(&mut self, github: &str) -> Result<Option<Student>, Error> {
        fetch_student(&mut self.conn, github)
            .await
            .wrap_err("cannot load student")
    }

    /// Duplicates are not looked for, the primary key on `github` rejects them.
    #[instrument(skip_all, fields(github = %student.github))]
    pub async fn insert_student(&mut self, student: &Student) -> Result<(), Error> {
        sqlx::query("INSERT INTO students (first_name, last_name, github) VALUES ($1, $2, $3)")
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.github)
            .execute(&mut self.conn)
            .await
            .wrap_err_with(|| format!("cannot add student {student}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(title = %title))]
    pub async fn project(&mut self, title: &str) -> Result<Option<Project>, Error> {
        fetch_project(&mut self.conn, title)
            .await
            .wrap_err("cannot load project")
    }

    #[instrument(skip_all, fields(title = %project.title))]
    pub async fn insert_project(&mut self, project: &Project) -> Result<(), Error> {
        sqlx::query("INSERT INTO projects (title, description, max_grade) VALUES ($1, $2, $3)")
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.max_grade)
            .execute(&mut self.conn)
            .await
            .wrap_err_with(|| format!("cannot add project {project}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(github = %github, title = %title))]
    pub async fn grade(&mut self, github: &str, title: &str) -> Result<Option<Grade>, Error> {
        fetch_grade(&mut self.conn, github, title)
            .await
            .wrap_err("cannot load grade")
    }

    /// Insert `grade` unless it exceeds the maximum grade of its project
    /// or a grade is already recorded for the same student and project.
    /// The checks and the insertion happen in the same transaction.
    #[instrument(
        skip_all,
        fields(github = %grade.student_github, title = %grade.project_title, grade = grade.grade)
    )]
    pub async fn record_grade(&mut self, grade: &Grade) -> Result<Recording, Error> {
        let mut trans = self.conn.begin().await?;
        let project = fetch_project(&mut *trans, &grade.project_title)
            .await
            .wrap_err("cannot load project")?;
        let recording = match project {
            None => Recording::UnknownProject,
            Some(project) if !project.accepts(grade.grade) => Recording::Exceeds {
                max_grade: project.max_grade,
            },
            Some(_) => {
                if fetch_student(&mut *trans, &grade.student_github)
                    .await
                    .wrap_err("cannot load student")?
                    .is_none()
                {
                    Recording::UnknownStudent
                } else if let Some(existing) =
                    fetch_grade(&mut *trans, &grade.student_github, &grade.project_title)
                        .await
                        .wrap_err("cannot load grade")?
                {
                    Recording::AlreadyGraded {
                        grade: existing.grade,
                    }
                } else {
                    sqlx::query(
                        "INSERT INTO grades (student_github, project_title, grade) \
                         VALUES ($1, $2, $3)",
                    )
                    .bind(&grade.student_github)
                    .bind(&grade.project_title)
                    .bind(grade.grade)
                    .execute(&mut *trans)
                    .await
                    .wrap_err("cannot record grade")?;
                    Recording::Recorded
                }
            }
        };
        if recording == Recording::Recorded {
            trans
                .commit()
                .await
                .wrap_err("error when committing transaction")?;
        } else {
            trace!(?recording, "grade not recorded");
            trans.rollback().await?;
        }
        Ok(recording)
    }
}

async fn fetch_student(
    conn: &mut AnyConnection,
    github: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT first_name, last_name, github FROM students WHERE github = $1",
    )
    .bind(github)
    .fetch_optional(conn)
    .await
}

async fn fetch_project(
    conn: &mut AnyConnection,
    title: &str,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "SELECT title, description, max_grade FROM projects WHERE title = $1",
    )
    .bind(title)
    .fetch_optional(conn)
    .await
}

async fn fetch_grade(
    conn: &mut AnyConnection,
    github: &str,
    title: &str,
) -> Result<Option<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(
        "SELECT student_github, project_title, grade FROM grades \
         WHERE student_github = $1 AND project_title = $2",
    )
    .bind(github)
    .bind(title)
    .fetch_optional(conn)
    .await
}

/// In-memory SQLite store with the tracker schema.
#[cfg(test)]
pub async fn memory_store() -> Store {
    let mut store = Store::connect("sqlite::memory:").await.unwrap();
    for statement in include_str!("../schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        sqlx::query(statement)
            .execute(&mut store.conn)
            .await
            .unwrap();
    }
    store
}
