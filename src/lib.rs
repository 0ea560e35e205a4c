//! Daily study planning from a course list.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use studyplan::{course::CourseTable, scheduler::synthesize};
//!
//! let courses = CourseTable::load("data.csv")?.to_courses()?;
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! for block in synthesize(&courses, today) {
//!     println!("{block}");
//! }
//! # Ok::<(), studyplan::PlannerError>(())
//! ```

pub mod calendar;
pub mod config;
pub mod course;
pub mod dashboard;
pub mod error;
pub mod planner;
pub mod scheduler;
pub mod serialize;

pub use config::PlannerConfig;
pub use course::{Course, CourseList};
pub use error::{PlannerError, Result};
pub use planner::{Action, Planner};
pub use scheduler::{synthesize, BlockKind, ScheduleBlock, Scheduler};

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::course::CourseTable;
    use pretty_assertions::assert_eq;

    use super::*;

    const DATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data.csv");

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn it_works() {
        let table = CourseTable::load(DATA).unwrap();
        println!("{}", table);
        assert_eq!(table.height(), 9);
    }

    #[test]
    fn test_timetable() {
        let courses = CourseTable::load(DATA).unwrap().to_courses().unwrap();
        let blocks = synthesize(&courses, day());

        // 7 pending, 2 completed: the 7th pending course does not fit
        let titles: Vec<_> = blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Calculus I",
                "Linear Algebra",
                "Mechanics",
                "Organic Chemistry",
                "Data Structures",
                "Review Session",
                "Operating Systems",
                "Revision Time",
            ]
        );
        assert_eq!(blocks[5].subject_label, "World History, Poetry");
    }

    #[test]
    fn test_pending_table() {
        let table = CourseTable::load(DATA).unwrap();
        let pending = table.to_lazy().pending().collect().unwrap();
        assert_eq!(pending.height(), 7);

        let math = table.to_lazy().subject("Math").collect().unwrap();
        let courses = CourseList::try_from(&math).unwrap();
        assert!(courses.iter().all(|c| c.subject_name().starts_with("Math")));
        assert_eq!(courses.len(), 2);
    }

    #[test]
    fn test_planner() {
        let courses = CourseTable::load(DATA).unwrap().to_courses().unwrap();
        let mut planner = Planner::new(courses, Scheduler::default());

        let progress = planner.progress();
        assert_eq!(progress.total_courses, 9);
        assert_eq!(progress.completion_rate(), Some(22));

        planner
            .dispatch(Action::CompleteCourse("Calculus I".into()))
            .unwrap();
        let blocks = planner.timetable(day());
        assert_eq!(blocks.len(), 8);
        assert_eq!(blocks[0].title, "Linear Algebra");
        assert_eq!(
            blocks.last().map(|b| b.subject_label.as_str()),
            Some("Calculus I, World History, Poetry")
        );

        let now = day().and_hms_opt(8, 0, 0).unwrap();
        let upcoming: Vec<_> = planner
            .upcoming(now)
            .into_iter()
            .map(|u| (u.name, u.days_left))
            .collect();
        assert_eq!(
            upcoming,
            vec![("Physics".to_string(), 2), ("Computer Science".to_string(), 6)]
        );
    }
}
