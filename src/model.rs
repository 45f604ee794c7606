use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub github: String,
}

impl Student {
    pub fn new(first_name: &str, last_name: &str, github: &str) -> Self {
        Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            github: github.to_owned(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.github)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub max_grade: i32,
}

impl Project {
    pub fn new(title: &str, description: &str, max_grade: i32) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            max_grade,
        }
    }

    /// Grades above `max_grade` are refused when recorded.
    pub fn accepts(&self, grade: i32) -> bool {
        grade <= self.max_grade
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Grade {
    pub student_github: String,
    pub project_title: String,
    pub grade: i32,
}

impl Grade {
    pub fn new(student_github: &str, project_title: &str, grade: i32) -> Self {
        Self {
            student_github: student_github.to_owned(),
            project_title: project_title.to_owned(),
            grade,
        }
    }
}

#[test]
fn test_accepts() {
    let p = Project::new("markov", "Tweets generated from Markov chains", 100);
    assert!(p.accepts(0));
    assert!(p.accepts(99));
    assert!(p.accepts(100));
    assert!(!p.accepts(101));
    let p = Project { max_grade: 1, ..p };
    assert!(p.accepts(1));
    assert!(!p.accepts(2));
}
