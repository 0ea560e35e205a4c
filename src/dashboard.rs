use serde::Serialize;

use crate::course::Course;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub name: String,
    pub chapters: u32,
    pub completed_chapters: u32,
    pub pending_chapters: u32,
}

/// Course and chapter totals for the progress dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_courses: usize,
    pub completed_courses: usize,
    pub pending_courses: usize,
    pub total_chapters: u64,
    pub completed_chapters: u64,
    pub pending_chapters: u64,
    pub courses: Vec<ChapterProgress>,
}

impl ProgressSummary {
    pub fn from_courses(courses: &[Course]) -> ProgressSummary {
        let completed_courses = courses.iter().filter(|c| c.is_completed()).count();
        let total_chapters: u64 = courses.iter().map(|c| u64::from(c.chapters())).sum();
        let completed_chapters: u64 = courses
            .iter()
            .map(|c| u64::from(c.completed_chapters()))
            .sum();

        ProgressSummary {
            total_courses: courses.len(),
            completed_courses,
            pending_courses: courses.len() - completed_courses,
            total_chapters,
            completed_chapters,
            // over-reported chapter counts clamp to zero
            pending_chapters: total_chapters.saturating_sub(completed_chapters),
            courses: courses
                .iter()
                .map(|c| ChapterProgress {
                    name: c.course_name().to_string(),
                    chapters: c.chapters(),
                    completed_chapters: c.completed_chapters(),
                    pending_chapters: c.chapters().saturating_sub(c.completed_chapters()),
                })
                .collect(),
        }
    }

    /// Share of completed courses as a whole percentage, rounded half up.
    /// `None` when there are no courses.
    pub fn completion_rate(&self) -> Option<u32> {
        if self.total_courses == 0 {
            return None;
        }
        let (done, total) = (self.completed_courses as u64, self.total_courses as u64);
        Some(((done * 200 + total) / (total * 2)) as u32)
    }
}

impl std::fmt::Display for ProgressSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Courses:  {} total, {} completed, {} pending",
            self.total_courses, self.completed_courses, self.pending_courses
        )?;
        writeln!(
            f,
            "Chapters: {} total, {} completed, {} pending",
            self.total_chapters, self.completed_chapters, self.pending_chapters
        )?;
        if let Some(rate) = self.completion_rate() {
            writeln!(f, "Completion rate: {rate}%")?;
        }
        Ok(())
    }
}
