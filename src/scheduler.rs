//! Daily timetable synthesis.
//!
//! Pending courses get consecutive study slots from the start of the study
//! window, in list order. A slot that would run past the end of the window is
//! dropped, and so is every slot after it. Completed courses share two fixed
//! blocks, a review and a revision, whenever at least one course is done.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::{
    config::{PlannerConfig, SessionSlot},
    course::Course,
    error::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Study,
    Review,
    Revision,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockKind::Study => "study",
            BlockKind::Review => "review",
            BlockKind::Revision => "revision",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleBlock<'a> {
    pub title: String,
    pub subject_label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: BlockKind,
    /// The course a study block was made for. `None` for review and revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_course: Option<&'a Course>,
}

impl ScheduleBlock<'_> {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// A study block whose course is still pending.
    pub fn is_pending(&self) -> bool {
        self.kind == BlockKind::Study && self.source_course.is_some_and(Course::is_pending)
    }
}

impl std::fmt::Display for ScheduleBlock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}  {:<8} {} ({})",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.kind,
            self.title,
            self.subject_label
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: PlannerConfig,
}

impl Scheduler {
    pub fn new(config: PlannerConfig) -> Result<Scheduler> {
        config.validate()?;
        Ok(Scheduler { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build the timetable for `date`. Blocks come back sorted by start
    /// time; blocks starting together keep the order they were made in.
    pub fn synthesize<'a>(&self, courses: &'a [Course], date: NaiveDate) -> Vec<ScheduleBlock<'a>> {
        let study = &self.config.study;
        let midnight = date.and_time(NaiveTime::MIN);
        let at = |hour: u64| midnight + Duration::hours(hour as i64);

        let (pending, completed): (Vec<&Course>, Vec<&Course>) =
            courses.iter().partition(|c| c.is_pending());

        let mut blocks = Vec::with_capacity(pending.len() + 2);

        for (i, course) in pending.into_iter().enumerate() {
            let start_hour = u64::from(study.day_start_hour)
                .saturating_add((i as u64).saturating_mul(u64::from(study.slot_hours)));
            let end_hour = start_hour.saturating_add(u64::from(study.slot_hours));
            if end_hour > u64::from(study.day_end_hour) {
                continue;
            }

            blocks.push(ScheduleBlock {
                title: course.course_name().to_string(),
                subject_label: course.subject_name().to_string(),
                start: at(start_hour),
                end: at(end_hour),
                kind: BlockKind::Study,
                source_course: Some(course),
            });
        }

        if !completed.is_empty() {
            let label = completed
                .iter()
                .map(|c| c.course_name())
                .collect::<Vec<_>>()
                .join(", ");

            for (slot, kind) in [
                (&self.config.review, BlockKind::Review),
                (&self.config.revision, BlockKind::Revision),
            ] {
                blocks.push(aggregate_block(slot, kind, &label, &at));
            }
        }

        blocks.sort_by_key(|b| b.start);
        blocks
    }

    pub fn synthesize_today<'a>(&self, courses: &'a [Course]) -> Vec<ScheduleBlock<'a>> {
        self.synthesize(courses, Local::now().date_naive())
    }
}

fn aggregate_block<'a>(
    slot: &SessionSlot,
    kind: BlockKind,
    label: &str,
    at: &impl Fn(u64) -> NaiveDateTime,
) -> ScheduleBlock<'a> {
    ScheduleBlock {
        title: slot.title.clone(),
        subject_label: label.to_string(),
        start: at(u64::from(slot.start_hour)),
        end: at(u64::from(slot.end_hour)),
        kind,
        source_course: None,
    }
}

/// Build the timetable for `date` with the default 8:00-20:00 window.
pub fn synthesize(courses: &[Course], date: NaiveDate) -> Vec<ScheduleBlock<'_>> {
    Scheduler::default().synthesize(courses, date)
}
