use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    course::Course,
    scheduler::{BlockKind, ScheduleBlock},
};

const TIME_FORMAT: &str = "%-I:%M %p";
const DATE_FORMAT: &str = "%A, %B %-d, %Y";
const DEADLINE_FORMAT: &str = "%b %-d, %Y";

fn clock(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[derive(serde::Serialize, Debug, PartialEq)]
pub struct BlockInfo {
    pub title: String,
    pub subject: String,
    pub start: String,
    pub end: String,
    pub kind: BlockKind,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl From<&ScheduleBlock<'_>> for BlockInfo {
    fn from(block: &ScheduleBlock<'_>) -> Self {
        BlockInfo {
            title: block.title.clone(),
            subject: block.subject_label.clone(),
            start: clock(block.start),
            end: clock(block.end),
            kind: block.kind,
            pending: block.is_pending(),
            course_id: block.source_course.map(|c| c.id().to_string()),
        }
    }
}

#[derive(serde::Serialize, Debug)]
pub struct TimetableView {
    pub date: String,
    pub blocks: Vec<BlockInfo>,
}

impl TimetableView {
    pub fn new(date: NaiveDate, blocks: &[ScheduleBlock<'_>]) -> Self {
        TimetableView {
            date: date.format(DATE_FORMAT).to_string(),
            blocks: blocks.iter().map(BlockInfo::from).collect(),
        }
    }
}

impl std::fmt::Display for TimetableView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.date)?;
        if self.blocks.is_empty() {
            return writeln!(f, "  nothing scheduled");
        }
        for block in &self.blocks {
            write!(
                f,
                "  {:>8} - {:<8}  {:<8} {} ({})",
                block.start, block.end, block.kind, block.title, block.subject
            )?;
            if block.pending {
                write!(f, "  [Pending]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub id: String,
    pub course_name: String,
    pub subject_name: String,
    pub status: &'static str,
    pub chapters: u32,
    pub completed_chapters: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl From<&Course> for CourseInfo {
    fn from(course: &Course) -> Self {
        CourseInfo {
            id: course.id().to_string(),
            course_name: course.course_name().to_string(),
            subject_name: course.subject_name().to_string(),
            status: if course.is_completed() { "Completed" } else { "Pending" },
            chapters: course.chapters(),
            completed_chapters: course.completed_chapters(),
            deadline: course.deadline().map(|d| d.format(DEADLINE_FORMAT).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::synthesize;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn timetable_view_formats_times() {
        let courses = vec![
            Course::new("m".into(), "Math".into(), "Algebra".into(), false),
            Course::new("h".into(), "History".into(), "Europe".into(), true),
        ];
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let view = TimetableView::new(date, &synthesize(&courses, date));

        assert_eq!(view.date, "Monday, October 19, 2026");
        assert_eq!(
            view.blocks[0],
            BlockInfo {
                title: "Math".into(),
                subject: "Algebra".into(),
                start: "8:00 AM".into(),
                end: "10:00 AM".into(),
                kind: BlockKind::Study,
                pending: true,
                course_id: Some("m".into()),
            }
        );
        assert_eq!(
            serde_json::to_value(&view.blocks[2]).unwrap(),
            json!({
                "title": "Revision Time",
                "subject": "History",
                "start": "7:00 PM",
                "end": "8:00 PM",
                "kind": "revision",
                "pending": false,
            })
        );
    }

    #[test]
    fn course_info_reports_status() {
        let course = Course::new("m".into(), "Math".into(), "Algebra".into(), false)
            .with_chapters(5, 2);
        let info = CourseInfo::from(&course);
        assert_eq!(info.status, "Pending");
        assert_eq!(info.deadline, None);

        let dated = course.with_deadline(NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
        assert_eq!(CourseInfo::from(&dated).deadline.as_deref(), Some("Oct 24, 2026"));
        assert_eq!(
            serde_json::to_value(&info).unwrap()["completedChapters"],
            json!(2)
        );
    }
}
