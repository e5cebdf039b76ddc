use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Traffic-light status used by KPIs, bars, metrics and risks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    #[default]
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub color: StatusColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    pub sponsor: Option<String>,
    pub product_owner: Option<String>,
    pub project_manager: Option<String>,
}

/// Column header of a Gantt chart: either plain text or a two-line label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GanttLabel {
    Text(String),
    Split {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        top: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bottom: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bar {
    pub row: i64,
    pub start: i64,
    pub end: i64,
    pub label: String,
    pub status: StatusColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub row: Option<i64>,
    pub at: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GanttData {
    pub labels: Vec<GanttLabel>,
    pub rows: Vec<String>,
    pub bars: Vec<Bar>,
    pub milestones: Vec<Milestone>,
    pub now_col: i64,
    pub now_frac: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMetric {
    pub label: String,
    pub value: String,
    pub color: StatusColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Risk {
    pub risk: String,
    pub impact: StatusColor,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraSection {
    pub id: String,
    pub title: String,
    pub items: Vec<String>,
}

/// One project-status page.
///
/// Every field has a default so that partial documents written by older
/// editor versions still load. Fields this version does not know about are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OnePagerData {
    pub project_name: String,
    pub niic_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_date: Option<String>,
    pub kpis: Vec<Kpi>,
    pub roles: Roles,
    pub project_status: StatusColor,
    pub goal: String,
    pub description: String,
    pub year_gantt: GanttData,
    pub quarter_gantt: GanttData,
    pub selected_quarter: u32,
    pub done: Vec<String>,
    pub next: Vec<String>,
    pub team_metrics: Vec<TeamMetric>,
    pub risks: Vec<Risk>,
    pub artifacts: Vec<Artifact>,
    pub comments: String,
    pub extra_sections: Vec<ExtraSection>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub role_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_artifacts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_niic_date: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OnePagerData {
    /// Set one of the free-text fields by its JSON name.
    ///
    /// Returns `false` when `field` is not a text field.
    pub fn set_text_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "projectName" => &mut self.project_name,
            "niicDate" => &mut self.niic_date,
            "goal" => &mut self.goal,
            "description" => &mut self.description,
            "comments" => &mut self.comments,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}
