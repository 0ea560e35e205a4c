//! Planner state and the single path that mutates it.
//!
//! Callers never touch the course list directly: every change is an
//! [`Action`] passed to [`Planner::dispatch`]. Views (timetable, progress,
//! deadlines) are recomputed from the current list on each call.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    calendar::{self, DeadlineEvent, UpcomingDeadline},
    course::{Course, CourseList},
    dashboard::ProgressSummary,
    error::{PlannerError, Result},
    scheduler::{ScheduleBlock, Scheduler},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddCourse(Course),
    /// Mark a course completed, by id or course name.
    CompleteCourse(String),
    /// Tick off one chapter of a course; the last chapter completes it.
    CompleteChapter(String),
    /// Remove a course, by id or course name.
    RemoveCourse(String),
    ClearCourses,
    ReplaceCourses(CourseList),
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    courses: CourseList,
    scheduler: Scheduler,
    revision: u64,
}

impl Planner {
    pub fn new(courses: CourseList, scheduler: Scheduler) -> Planner {
        Planner {
            courses,
            scheduler,
            revision: 0,
        }
    }

    pub fn courses(&self) -> &CourseList {
        &self.courses
    }

    /// Bumped on every change to the course list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply `action`. Returns whether the course list changed.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        tracing::debug!(?action, revision = self.revision, "dispatch");

        let changed = match action {
            Action::AddCourse(course) => {
                self.courses.add(course)?;
                true
            }
            Action::CompleteCourse(key) => {
                let id = self.resolve(&key)?;
                match self.courses.get_mut(&id) {
                    Some(course) if course.is_pending() => {
                        course.mark_completed();
                        true
                    }
                    Some(_) => false,
                    None => return Err(PlannerError::UnknownCourse(key)),
                }
            }
            Action::CompleteChapter(key) => {
                let id = self.resolve(&key)?;
                self.courses
                    .get_mut(&id)
                    .ok_or(PlannerError::UnknownCourse(key))?
                    .complete_chapter()
            }
            Action::RemoveCourse(key) => {
                let id = self.resolve(&key)?;
                self.courses.remove(&id).is_some()
            }
            Action::ClearCourses => {
                let changed = !self.courses.is_empty();
                self.courses.clear();
                changed
            }
            Action::ReplaceCourses(courses) => {
                self.courses = courses;
                true
            }
        };

        if changed {
            self.revision += 1;
        }
        Ok(changed)
    }

    fn resolve(&self, key: &str) -> Result<String> {
        self.courses
            .find(key)
            .map(|c| c.id().to_string())
            .ok_or_else(|| PlannerError::UnknownCourse(key.to_string()))
    }

    pub fn timetable(&self, date: NaiveDate) -> Vec<ScheduleBlock<'_>> {
        self.scheduler.synthesize(&self.courses, date)
    }

    pub fn progress(&self) -> ProgressSummary {
        ProgressSummary::from_courses(&self.courses)
    }

    pub fn deadlines(&self) -> Vec<DeadlineEvent<'_>> {
        calendar::deadline_events(&self.courses)
    }

    /// Upcoming deadlines using the configured horizon.
    pub fn upcoming(&self, now: NaiveDateTime) -> Vec<UpcomingDeadline> {
        let horizon = self.scheduler.config().calendar.upcoming_days;
        calendar::upcoming_deadlines(&self.courses, now, horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::BlockKind;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn planner() -> Planner {
        let courses = vec![
            Course::new("m".into(), "Math".into(), "Algebra".into(), false),
            Course::new("p".into(), "Physics".into(), "Optics".into(), false),
        ];
        Planner::new(CourseList::new(courses).unwrap(), Scheduler::default())
    }

    #[test]
    fn completing_moves_course_into_review() {
        let mut planner = planner();
        assert!(planner
            .dispatch(Action::CompleteCourse("physics".into()))
            .unwrap());
        assert_eq!(planner.revision(), 1);

        let blocks = planner.timetable(day());
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Study, BlockKind::Review, BlockKind::Revision]
        );
        assert_eq!(blocks[1].subject_label, "Physics");

        // already completed
        assert!(!planner.dispatch(Action::CompleteCourse("p".into())).unwrap());
        assert_eq!(planner.revision(), 1);
    }

    #[test]
    fn complete_chapter_steps_then_completes() {
        let courses = vec![
            Course::new("m".into(), "Math".into(), "Algebra".into(), false).with_chapters(3, 1),
            Course::new("p".into(), "Physics".into(), "Optics".into(), false),
        ];
        let mut planner = Planner::new(CourseList::new(courses).unwrap(), Scheduler::default());

        assert!(planner.dispatch(Action::CompleteChapter("m".into())).unwrap());
        let math = planner.courses().get("m").unwrap();
        assert_eq!(math.completed_chapters(), 2);
        assert!(math.is_pending());
        assert_eq!(planner.progress().courses[0].pending_chapters, 1);

        assert!(planner.dispatch(Action::CompleteChapter("Math".into())).unwrap());
        let math = planner.courses().get("m").unwrap();
        assert_eq!(math.completed_chapters(), 3);
        assert!(math.is_completed());

        let blocks = planner.timetable(day());
        let titles: Vec<_> = blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Physics", "Review Session", "Revision Time"]);
        assert_eq!(blocks[1].subject_label, "Math");
        assert_eq!(planner.revision(), 2);
    }

    #[test]
    fn complete_chapter_on_full_course_is_a_no_op() {
        let courses = vec![
            Course::new("m".into(), "Math".into(), "Algebra".into(), true).with_chapters(4, 4),
            Course::new("p".into(), "Physics".into(), "Optics".into(), false),
        ];
        let mut planner = Planner::new(CourseList::new(courses).unwrap(), Scheduler::default());

        assert!(!planner.dispatch(Action::CompleteChapter("m".into())).unwrap());
        // no chapters recorded at all
        assert!(!planner.dispatch(Action::CompleteChapter("p".into())).unwrap());
        assert_eq!(planner.courses().get("m").unwrap().completed_chapters(), 4);
        assert!(planner.courses().get("p").unwrap().is_pending());
        assert_eq!(planner.revision(), 0);

        let err = planner
            .dispatch(Action::CompleteChapter("Art".into()))
            .unwrap_err();
        assert!(matches!(err, PlannerError::UnknownCourse(k) if k == "Art"));
    }

    #[test]
    fn replaced_courses_are_fully_removable() {
        let dup = vec![
            Course::new("a".into(), "Math".into(), "Algebra".into(), false),
            Course::new("a".into(), "Art".into(), "Drawing".into(), false),
        ];
        assert!(matches!(
            CourseList::new(dup),
            Err(PlannerError::DuplicateCourse(id)) if id == "a"
        ));

        let mut planner = planner();
        let json = r#"[
            {"_id": "a", "courseName": "Art", "subjectName": "Drawing", "status": false},
            {"_id": "b", "courseName": "Bio", "subjectName": "Cells", "status": true}
        ]"#;
        let replacement = CourseList::from_json(json).unwrap();
        assert!(planner.dispatch(Action::ReplaceCourses(replacement)).unwrap());
        assert!(planner.dispatch(Action::RemoveCourse("a".into())).unwrap());

        let ids: Vec<_> = planner.courses().iter().map(Course::id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn unknown_course_is_an_error() {
        let mut planner = planner();
        let err = planner
            .dispatch(Action::RemoveCourse("Biology".into()))
            .unwrap_err();
        assert!(matches!(err, PlannerError::UnknownCourse(k) if k == "Biology"));
        assert_eq!(planner.revision(), 0);
    }

    #[test]
    fn add_remove_and_clear() {
        let mut planner = planner();
        planner
            .dispatch(Action::AddCourse(Course::new(
                "a".into(),
                "Art".into(),
                "Drawing".into(),
                false,
            )))
            .unwrap();
        assert_eq!(planner.timetable(day()).len(), 3);

        assert!(planner.dispatch(Action::RemoveCourse("m".into())).unwrap());
        let titles: Vec<_> = planner
            .timetable(day())
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Physics", "Art"]);

        assert!(planner.dispatch(Action::ClearCourses).unwrap());
        assert!(!planner.dispatch(Action::ClearCourses).unwrap());
        assert!(planner.timetable(day()).is_empty());
        assert_eq!(planner.revision(), 3);
    }

    #[test]
    fn duplicate_add_leaves_state_alone() {
        let mut planner = planner();
        let err = planner
            .dispatch(Action::AddCourse(Course::new(
                "m".into(),
                "Other".into(),
                "Other".into(),
                false,
            )))
            .unwrap_err();
        assert!(matches!(err, PlannerError::DuplicateCourse(_)));
        assert_eq!(planner.courses().len(), 2);
    }

    #[test]
    fn upcoming_uses_configured_horizon() {
        let mut config = crate::config::PlannerConfig::default();
        config.calendar.upcoming_days = 1;
        let courses = vec![
            Course::new("m".into(), "Math".into(), "Algebra".into(), false)
                .with_deadline(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()),
            Course::new("p".into(), "Physics".into(), "Optics".into(), false)
                .with_deadline(NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()),
        ];
        let planner = Planner::new(
            CourseList::new(courses).unwrap(),
            Scheduler::new(config).unwrap(),
        );

        let now = day().and_hms_opt(12, 0, 0).unwrap();
        let names: Vec<_> = planner.upcoming(now).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Algebra"]);
        assert_eq!(planner.deadlines().len(), 2);
        assert_eq!(planner.progress().pending_courses, 2);
    }
}
