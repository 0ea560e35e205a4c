//! Planner configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`PLANNER_*` prefix, `__` between sections)
//! 2. A TOML file (`planner.toml` in the working directory, or an explicit path)
//! 3. Built-in defaults
//!
//! `PLANNER_STUDY__SLOT_HOURS=1` maps to `study.slot_hours`.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

const DEFAULT_CONFIG_FILE: &str = "planner.toml";

/// Last hour a block may end on while staying on the reference day.
const LAST_HOUR: u32 = 23;

const fn default_day_start_hour() -> u32 {
    8
}

const fn default_day_end_hour() -> u32 {
    20
}

const fn default_slot_hours() -> u32 {
    2
}

const fn default_upcoming_days() -> i64 {
    7
}

/// The window pending courses are laid out in, one slot per course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudyWindow {
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,

    /// A slot that would end after this hour is dropped.
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,

    #[serde(default = "default_slot_hours")]
    pub slot_hours: u32,
}

impl Default for StudyWindow {
    fn default() -> Self {
        Self {
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            slot_hours: default_slot_hours(),
        }
    }
}

/// A fixed block shared by all completed courses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSlot {
    pub title: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SessionSlot {
    pub fn review() -> Self {
        Self {
            title: "Review Session".to_string(),
            start_hour: 17,
            end_hour: 18,
        }
    }

    pub fn revision() -> Self {
        Self {
            title: "Revision Time".to_string(),
            start_hour: 19,
            end_hour: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// How many whole days ahead a pending deadline counts as upcoming.
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            upcoming_days: default_upcoming_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub study: StudyWindow,
    #[serde(default = "SessionSlot::review")]
    pub review: SessionSlot,
    #[serde(default = "SessionSlot::revision")]
    pub revision: SessionSlot,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            study: StudyWindow::default(),
            review: SessionSlot::review(),
            revision: SessionSlot::revision(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Load from defaults, `planner.toml` and the environment, then validate.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`PlannerConfig::load`], reading `path` instead of `planner.toml`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        tracing::debug!(?config, "planner config loaded");
        Ok(config)
    }

    /// Build the provider chain without extracting it.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        } else if path.is_some() {
            tracing::warn!(path = %file.display(), "config file not found, using defaults");
        }

        figment.merge(Env::prefixed("PLANNER_").split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        let study = &self.study;
        if study.slot_hours == 0 {
            return Err(invalid("study.slot_hours", "must be at least 1"));
        }
        if study.day_end_hour > LAST_HOUR {
            return Err(invalid(
                "study.day_end_hour",
                format!("must not exceed {LAST_HOUR}"),
            ));
        }
        if study.day_start_hour >= study.day_end_hour {
            return Err(invalid(
                "study.day_start_hour",
                "must be earlier than study.day_end_hour",
            ));
        }

        for (name, slot) in [("review", &self.review), ("revision", &self.revision)] {
            if slot.end_hour > LAST_HOUR {
                return Err(invalid(
                    format!("{name}.end_hour"),
                    format!("must not exceed {LAST_HOUR}"),
                ));
            }
            if slot.start_hour >= slot.end_hour {
                return Err(invalid(
                    format!("{name}.start_hour"),
                    format!("must be earlier than {name}.end_hour"),
                ));
            }
        }

        if self.calendar.upcoming_days < 0 {
            return Err(invalid("calendar.upcoming_days", "must not be negative"));
        }

        Ok(())
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> PlannerError {
    PlannerError::InvalidConfig {
        field: field.into(),
        reason: reason.into(),
    }
}
