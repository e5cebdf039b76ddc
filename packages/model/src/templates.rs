//! Starter templates offered when creating a project

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    Artifact, Bar, GanttData, GanttLabel, Kpi, Milestone, OnePagerData, Risk, StatusColor,
    TeamMetric,
};

use StatusColor::{Green, Red, Yellow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    General,
    Software,
    Marketing,
    Product,
    Construction,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::General => "general",
            TemplateCategory::Software => "software",
            TemplateCategory::Marketing => "marketing",
            TemplateCategory::Product => "product",
            TemplateCategory::Construction => "construction",
        }
    }
}

/// A named starting document
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: TemplateCategory,
    pub data: OnePagerData,
}

/// Static description of a template; dates are filled in when it is built
struct TemplateSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: TemplateCategory,
    project_name: &'static str,
    project_status: StatusColor,
    goal: &'static str,
    summary: &'static str,
    kpis: &'static [(&'static str, &'static str, StatusColor)],
    rows: &'static [&'static str],
    bars: &'static [(i64, i64, i64, &'static str, StatusColor)],
    milestones: &'static [(i64, i64, &'static str)],
    done: &'static [&'static str],
    next: &'static [&'static str],
    team_metrics: &'static [(&'static str, &'static str, StatusColor)],
    risks: &'static [(&'static str, StatusColor, &'static str)],
    artifacts: &'static [&'static str],
}

const SEEDS: &[TemplateSeed] = &[
    TemplateSeed {
        id: "blank",
        name: "Blank Project",
        description: "Start with an empty project",
        category: TemplateCategory::General,
        project_name: "New Project",
        project_status: Green,
        goal: "",
        summary: "",
        kpis: &[],
        rows: &[],
        bars: &[],
        milestones: &[],
        done: &[],
        next: &[],
        team_metrics: &[],
        risks: &[],
        artifacts: &[],
    },
    TemplateSeed {
        id: "software-development",
        name: "Software Development",
        description: "Template for software development projects",
        category: TemplateCategory::Software,
        project_name: "Software Development Project",
        project_status: Green,
        goal: "Deliver a high-quality software product",
        summary: "This project aims to develop and deploy a software solution...",
        kpis: &[
            ("Sprint Velocity", "0", Green),
            ("Code Coverage", "0%", Yellow),
            ("Bug Count", "0", Green),
        ],
        rows: &["Planning", "Development", "Testing", "Deployment"],
        bars: &[
            (0, 0, 1, "Requirements", Green),
            (1, 2, 8, "Implementation", Yellow),
            (2, 7, 10, "QA Testing", Yellow),
            (3, 11, 12, "Production Release", Red),
        ],
        milestones: &[(1, 2, "Dev Start"), (3, 12, "Go Live")],
        done: &["Completed initial planning", "Set up development environment"],
        next: &["Begin sprint 1", "Finalize architecture"],
        team_metrics: &[("Team Morale", "High", Green), ("Resource Utilization", "85%", Green)],
        risks: &[
            ("Technical debt accumulation", Yellow, "Regular refactoring sprints"),
            ("Scope creep", Red, "Strict change control process"),
        ],
        artifacts: &["Requirements Doc", "Architecture Design"],
    },
    TemplateSeed {
        id: "marketing-campaign",
        name: "Marketing Campaign",
        description: "Template for marketing campaign projects",
        category: TemplateCategory::Marketing,
        project_name: "Marketing Campaign",
        project_status: Yellow,
        goal: "Increase brand awareness and drive conversions",
        summary: "Multi-channel marketing campaign to reach target audience...",
        kpis: &[
            ("Reach", "0", Yellow),
            ("Engagement", "0%", Yellow),
            ("Conversions", "0", Red),
        ],
        rows: &["Planning", "Creative", "Launch", "Optimize"],
        bars: &[
            (0, 0, 2, "Campaign Strategy", Green),
            (1, 2, 5, "Content Creation", Yellow),
            (2, 5, 6, "Campaign Launch", Yellow),
            (3, 6, 12, "Performance Optimization", Red),
        ],
        milestones: &[(2, 5, "Launch Date")],
        done: &["Market research completed", "Target audience defined"],
        next: &["Develop creative assets", "Set up tracking"],
        team_metrics: &[("Creative Output", "On Track", Green), ("Budget Usage", "45%", Green)],
        risks: &[
            ("Budget overrun", Yellow, "Weekly budget reviews"),
            ("Low engagement rates", Red, "A/B testing strategy"),
        ],
        artifacts: &["Campaign Brief", "Creative Assets"],
    },
    TemplateSeed {
        id: "product-launch",
        name: "Product Launch",
        description: "Template for new product launch projects",
        category: TemplateCategory::Product,
        project_name: "Product Launch",
        project_status: Yellow,
        goal: "Successfully launch new product to market",
        summary: "Comprehensive product launch including development, marketing, and distribution...",
        kpis: &[
            ("Pre-orders", "0", Yellow),
            ("Market Readiness", "0%", Yellow),
            ("Launch Readiness", "0%", Red),
        ],
        rows: &["Product Dev", "Marketing", "Distribution", "Support"],
        bars: &[
            (0, 0, 7, "Product Development", Yellow),
            (1, 5, 12, "Marketing Campaign", Yellow),
            (2, 7, 9, "Distribution Setup", Red),
            (3, 9, 12, "Customer Support", Red),
        ],
        milestones: &[(0, 7, "Product Ready"), (1, 8, "Launch Event")],
        done: &["Product concept validated", "Initial prototypes tested"],
        next: &["Finalize product features", "Begin marketing prep"],
        team_metrics: &[
            ("Development Progress", "60%", Yellow),
            ("Marketing Readiness", "30%", Red),
        ],
        risks: &[
            ("Delayed product completion", Red, "Agile development approach"),
            ("Market competition", Yellow, "Competitive differentiation strategy"),
        ],
        artifacts: &["Product Specs", "Launch Plan"],
    },
    TemplateSeed {
        id: "construction-project",
        name: "Construction Project",
        description: "Template for construction and infrastructure projects",
        category: TemplateCategory::Construction,
        project_name: "Construction Project",
        project_status: Green,
        goal: "Complete construction on time and within budget",
        summary: "Infrastructure construction project with multiple phases...",
        kpis: &[
            ("Budget Variance", "0%", Green),
            ("Schedule Variance", "0 days", Green),
            ("Safety Incidents", "0", Green),
        ],
        rows: &["Design", "Permits", "Foundation", "Construction", "Finishing"],
        bars: &[
            (0, 0, 2, "Design Phase", Green),
            (1, 2, 3, "Permits & Approvals", Yellow),
            (2, 3, 5, "Foundation Work", Yellow),
            (3, 5, 10, "Main Construction", Red),
            (4, 10, 12, "Finishing & Handover", Red),
        ],
        milestones: &[(1, 3, "Permits Approved"), (4, 12, "Project Complete")],
        done: &["Site survey completed", "Initial designs approved"],
        next: &["Submit permit applications", "Finalize contractor selection"],
        team_metrics: &[
            ("Worker Productivity", "High", Green),
            ("Material Delivery", "On Time", Green),
        ],
        risks: &[
            ("Weather delays", Yellow, "Buffer time in schedule"),
            ("Material cost increases", Red, "Fixed-price contracts where possible"),
        ],
        artifacts: &["Construction Plans", "Safety Plan"],
    },
];

/// Thirteen period columns, "now" halfway through the first one
fn empty_gantt(prefix: &str) -> GanttData {
    GanttData {
        labels: (1..=13)
            .map(|i| GanttLabel::Text(format!("{}{}", prefix, i)))
            .collect(),
        now_frac: 0.5,
        ..GanttData::default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TemplateSeed {
    fn build(&self, today: NaiveDate) -> ProjectTemplate {
        let year_gantt = GanttData {
            rows: strings(self.rows),
            bars: self
                .bars
                .iter()
                .map(|&(row, start, end, label, status)| Bar {
                    row,
                    start,
                    end,
                    label: label.to_string(),
                    status,
                })
                .collect(),
            milestones: self
                .milestones
                .iter()
                .map(|&(row, at, label)| Milestone {
                    row: Some(row),
                    at,
                    label: label.to_string(),
                })
                .collect(),
            ..empty_gantt("P")
        };

        let data = OnePagerData {
            project_name: self.project_name.to_string(),
            niic_date: today.format("%Y-%m-%d").to_string(),
            kpis: self
                .kpis
                .iter()
                .map(|&(label, value, color)| Kpi {
                    label: label.to_string(),
                    value: value.to_string(),
                    color,
                })
                .collect(),
            project_status: self.project_status,
            goal: self.goal.to_string(),
            description: self.summary.to_string(),
            year_gantt,
            quarter_gantt: empty_gantt("W"),
            done: strings(self.done),
            next: strings(self.next),
            team_metrics: self
                .team_metrics
                .iter()
                .map(|&(label, value, color)| TeamMetric {
                    label: label.to_string(),
                    value: value.to_string(),
                    color,
                })
                .collect(),
            risks: self
                .risks
                .iter()
                .map(|&(risk, impact, mitigation)| Risk {
                    risk: risk.to_string(),
                    impact,
                    mitigation: mitigation.to_string(),
                })
                .collect(),
            artifacts: self
                .artifacts
                .iter()
                .map(|label| Artifact {
                    label: label.to_string(),
                    url: "#".to_string(),
                })
                .collect(),
            ..OnePagerData::default()
        };

        ProjectTemplate {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            data,
        }
    }
}

/// All templates, dated `today`
pub fn templates(today: NaiveDate) -> Vec<ProjectTemplate> {
    SEEDS.iter().map(|seed| seed.build(today)).collect()
}

pub fn template_by_id(id: &str, today: NaiveDate) -> Option<ProjectTemplate> {
    SEEDS.iter().find(|seed| seed.id == id).map(|seed| seed.build(today))
}

pub fn templates_by_category(category: TemplateCategory, today: NaiveDate) -> Vec<ProjectTemplate> {
    SEEDS
        .iter()
        .filter(|seed| seed.category == category)
        .map(|seed| seed.build(today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_all_templates_present() {
        let ids: Vec<_> = templates(today()).iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "blank",
                "software-development",
                "marketing-campaign",
                "product-launch",
                "construction-project"
            ]
        );
    }

    #[test]
    fn test_template_lookup() {
        let template = template_by_id("software-development", today()).unwrap();
        assert_eq!(template.data.project_name, "Software Development Project");
        assert_eq!(template.data.year_gantt.rows.len(), 4);
        assert_eq!(template.data.year_gantt.labels.len(), 13);
        assert_eq!(template.data.quarter_gantt.labels[0], GanttLabel::Text("W1".to_string()));
        assert_eq!(template.data.niic_date, "2026-10-19");

        assert!(template_by_id("missing", today()).is_none());
    }

    #[test]
    fn test_templates_by_category() {
        let found = templates_by_category(TemplateCategory::Construction, today());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data.year_gantt.bars.len(), 5);
        assert_eq!(found[0].category.as_str(), "construction");
    }
}
