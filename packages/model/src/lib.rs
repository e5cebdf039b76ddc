//! # OnePager Model
//!
//! The project-status document edited by the OnePager editor, plus the
//! default document and the starter templates.
//!
//! The history and storage crates are generic over their document type;
//! this crate is the one concrete document they are used with.

mod defaults;
mod onepager;
mod templates;

pub use onepager::{
    Artifact, Bar, ExtraSection, GanttData, GanttLabel, Kpi, Milestone, OnePagerData, Risk, Roles,
    StatusColor, TeamMetric,
};
pub use templates::{template_by_id, templates, templates_by_category, ProjectTemplate, TemplateCategory};

/// Number of planning weeks in the year Gantt
pub const WEEK_COUNT: u32 = 52;

/// Number of four-week periods in a year
pub const PERIOD_COUNT: u32 = 13;

/// Period (1-based, at most 13) that contains the given 0-based week
pub fn week_to_period(week_index: u32) -> u32 {
    (week_index / 4 + 1).min(PERIOD_COUNT)
}
