//! Course deadlines as calendar events.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::course::Course;

/// An all-day event on a course's deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineEvent<'a> {
    pub title: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub course: &'a Course,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub name: String,
    pub date: NaiveDate,
    pub days_left: i64,
}

/// One event per course that has a deadline, in input order.
pub fn deadline_events(courses: &[Course]) -> Vec<DeadlineEvent<'_>> {
    courses
        .iter()
        .filter_map(|course| {
            course.deadline().map(|date| DeadlineEvent {
                title: course.subject_name().to_string(),
                date,
                completed: course.is_completed(),
                course,
            })
        })
        .collect()
}

/// Pending deadlines falling after `now` and at most `horizon_days` whole
/// days away. A deadline is due at the start of its day.
pub fn upcoming_deadlines(
    courses: &[Course],
    now: NaiveDateTime,
    horizon_days: i64,
) -> Vec<UpcomingDeadline> {
    deadline_events(courses)
        .into_iter()
        .filter(|event| !event.completed)
        .filter_map(|event| {
            let due = event.date.and_time(NaiveTime::MIN);
            if due <= now {
                return None;
            }
            let days_left = (due - now).num_days();
            (days_left <= horizon_days).then(|| UpcomingDeadline {
                name: event.title,
                date: event.date,
                days_left,
            })
        })
        .collect()
}

impl std::fmt::Display for UpcomingDeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plural = if self.days_left == 1 { "" } else { "s" };
        write!(
            f,
            "{}  Due: {} ({} day{} left)",
            self.name,
            self.date.format("%b %-d, %Y"),
            self.days_left,
            plural
        )
    }
}
