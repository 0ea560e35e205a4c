use chrono::{DateTime, NaiveDate};
use polars::{lazy::dsl::col, prelude::*};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, ops::Deref, path::Path};

use crate::error::{PlannerError, Result};

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Parse a deadline given either as a plain date or as an RFC 3339 timestamp.
pub fn parse_deadline(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DEADLINE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

mod deadline {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.collect_str(&date.format(super::DEADLINE_FORMAT)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_deadline(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("unreadable deadline '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    course_name: String,
    subject_name: String,
    #[serde(rename = "status", alias = "completed")]
    completed: bool,
    #[serde(default)]
    chapters: u32,
    #[serde(default)]
    completed_chapters: u32,
    #[serde(default, with = "deadline")]
    deadline: Option<NaiveDate>,
}

impl Course {
    pub fn new(id: String, course_name: String, subject_name: String, completed: bool) -> Course {
        Course {
            id,
            course_name,
            subject_name,
            completed,
            chapters: 0,
            completed_chapters: 0,
            deadline: None,
        }
    }

    pub fn with_chapters(self, chapters: u32, completed_chapters: u32) -> Course {
        Course {
            chapters,
            completed_chapters,
            ..self
        }
    }

    pub fn with_deadline(self, deadline: NaiveDate) -> Course {
        Course {
            deadline: Some(deadline),
            ..self
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    pub fn chapters(&self) -> u32 {
        self.chapters
    }

    pub fn completed_chapters(&self) -> u32 {
        self.completed_chapters
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Tick off one chapter. Finishing the last chapter completes the
    /// course. Returns `false` when every chapter was already done.
    pub fn complete_chapter(&mut self) -> bool {
        if self.completed_chapters >= self.chapters {
            return false;
        }
        self.completed_chapters += 1;
        if self.completed_chapters == self.chapters {
            self.mark_completed();
        }
        true
    }

    fn check(&self, row: usize) -> Result<()> {
        let fields = [
            ("id", &self.id),
            ("courseName", &self.course_name),
            ("subjectName", &self.subject_name),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(PlannerError::MissingField {
                row,
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for Course {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.completed { "Completed" } else { "Pending" };
        write!(f, "{} ({}) [{}]", self.course_name, self.subject_name, status)?;
        if let Some(deadline) = self.deadline {
            write!(f, " due {}", deadline.format(DEADLINE_FORMAT))?;
        }
        Ok(())
    }
}

/// An ordered list of courses. Order is significant: it decides which
/// pending course gets which study slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseList {
    courses: Vec<Course>,
}

impl CourseList {
    /// Every course needs a unique id and non-blank names.
    pub fn new(courses: Vec<Course>) -> Result<CourseList> {
        {
            let mut seen = HashSet::with_capacity(courses.len());
            for (row, course) in courses.iter().enumerate() {
                course.check(row)?;
                if !seen.insert(course.id.as_str()) {
                    return Err(PlannerError::DuplicateCourse(course.id.clone()));
                }
            }
        }
        Ok(CourseList { courses })
    }

    /// Parse the repository's JSON array of courses.
    pub fn from_json(json: &str) -> Result<CourseList> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        tracing::debug!(count = courses.len(), "parsed course list from json");
        CourseList::new(courses)
    }

    pub fn from_df(df: &DataFrame) -> Result<CourseList> {
        let ids = required_column(df, "id")?.cast(&DataType::String)?;
        let names = required_column(df, "courseName")?.cast(&DataType::String)?;
        let subjects = required_column(df, "subjectName")?.cast(&DataType::String)?;
        let completed = required_column(df, "completed")?;
        let chapters = optional_u32(df, "chapters")?;
        let completed_chapters = optional_u32(df, "completedChapters")?;
        let deadlines = match df.column("deadline") {
            Ok(s) => Some(s.cast(&DataType::String)?),
            Err(_) => None,
        };

        let (ids, names, subjects) = (ids.str()?, names.str()?, subjects.str()?);
        let completed = completed.bool()?;
        let deadlines = deadlines.as_ref().map(|s| s.str()).transpose()?;

        let mut courses = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let field = |value: Option<&str>, field: &str| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| PlannerError::MissingField {
                        row,
                        field: field.to_string(),
                    })
            };

            let mut course = Course::new(
                field(ids.get(row), "id")?,
                field(names.get(row), "courseName")?,
                field(subjects.get(row), "subjectName")?,
                completed.get(row).ok_or_else(|| PlannerError::MissingField {
                    row,
                    field: "completed".to_string(),
                })?,
            )
            .with_chapters(
                chapters.as_ref().and_then(|c| c.get(row)).unwrap_or(0),
                completed_chapters.as_ref().and_then(|c| c.get(row)).unwrap_or(0),
            );

            if let Some(value) = deadlines.and_then(|d| d.get(row)) {
                if !value.trim().is_empty() {
                    let date = parse_deadline(value).ok_or_else(|| PlannerError::InvalidDeadline {
                        row,
                        value: value.to_string(),
                    })?;
                    course = course.with_deadline(date);
                }
            }

            courses.push(course);
        }

        CourseList::new(courses)
    }

    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    /// Find by id first, then by course name (case-insensitive).
    pub fn find(&self, key: &str) -> Option<&Course> {
        self.get(key).or_else(|| {
            self.courses
                .iter()
                .find(|c| c.course_name.eq_ignore_ascii_case(key))
        })
    }

    pub fn add(&mut self, course: Course) -> Result<()> {
        course.check(self.courses.len())?;
        if self.get(&course.id).is_some() {
            return Err(PlannerError::DuplicateCourse(course.id));
        }
        self.courses.push(course);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Course> {
        let index = self.courses.iter().position(|c| c.id == id)?;
        Some(self.courses.remove(index))
    }

    pub fn clear(&mut self) {
        self.courses.clear();
    }

    pub fn pending(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.is_pending())
    }

    pub fn completed(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.is_completed())
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| PlannerError::MissingColumn(name.to_string()))
}

fn optional_u32(df: &DataFrame, name: &str) -> Result<Option<UInt32Chunked>> {
    match df.column(name) {
        Ok(s) => Ok(Some(s.cast(&DataType::UInt32)?.u32()?.clone())),
        Err(_) => Ok(None),
    }
}

impl Deref for CourseList {
    type Target = [Course];

    fn deref(&self) -> &Self::Target {
        &self.courses
    }
}

impl TryFrom<Vec<Course>> for CourseList {
    type Error = PlannerError;

    fn try_from(courses: Vec<Course>) -> Result<Self> {
        CourseList::new(courses)
    }
}

impl TryFrom<&CourseTable> for CourseList {
    type Error = PlannerError;

    fn try_from(table: &CourseTable) -> Result<Self> {
        CourseList::from_df(table)
    }
}

impl std::fmt::Display for CourseList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for course in &self.courses {
            writeln!(f, "{}", course)?;
        }
        Ok(())
    }
}

/// A course export loaded as a table. Columns: `id`, `courseName`,
/// `subjectName`, `completed`, and optionally `chapters`,
/// `completedChapters` and `deadline`.
#[derive(Clone)]
pub struct CourseTable {
    df: DataFrame,
}

impl CourseTable {
    pub fn load(file_path: impl AsRef<Path>) -> Result<CourseTable> {
        let path = file_path.as_ref();
        let df = LazyCsvReader::new(path)
            .has_header(true)
            .finish()?
            .collect()?;

        tracing::info!(path = %path.display(), rows = df.height(), "loaded course table");
        Ok(CourseTable { df })
    }

    pub fn new(df: DataFrame) -> CourseTable {
        CourseTable { df }
    }

    pub fn to_lazy(&self) -> LazyTable {
        LazyTable::new(self.df.clone().lazy())
    }

    pub fn to_courses(&self) -> Result<CourseList> {
        CourseList::try_from(self)
    }
}

impl Deref for CourseTable {
    type Target = DataFrame;

    fn deref(&self) -> &Self::Target {
        &self.df
    }
}

impl std::fmt::Display for CourseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.df)
    }
}

pub struct LazyTable {
    lf: LazyFrame,
}

impl LazyTable {
    pub fn new(lf: LazyFrame) -> Self {
        LazyTable { lf }
    }

    pub fn pending(self) -> Self {
        LazyTable {
            lf: self.lf.filter(col("completed").eq(lit(false))),
        }
    }

    pub fn completed(self) -> Self {
        LazyTable {
            lf: self.lf.filter(col("completed").eq(lit(true))),
        }
    }

    /// Keep courses whose subject starts with `prefix`.
    pub fn subject(self, prefix: &str) -> Self {
        LazyTable {
            lf: self
                .lf
                .filter(col("subjectName").str().starts_with(lit(prefix))),
        }
    }

    pub fn collect(self) -> Result<CourseTable> {
        let df = self.lf.collect()?;
        Ok(CourseTable { df })
    }
}

impl Deref for LazyTable {
    type Target = LazyFrame;

    fn deref(&self) -> &Self::Target {
        &self.lf
    }
}
