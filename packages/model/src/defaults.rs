use chrono::{Datelike, NaiveDate};

use crate::{GanttData, GanttLabel, Kpi, OnePagerData, StatusColor};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl OnePagerData {
    /// The document a freshly created project starts with.
    ///
    /// The year Gantt gets one column per month, labelled with its period
    /// and quarter, and the "now" marker sits inside the current month.
    pub fn new_default(title: &str, today: NaiveDate) -> Self {
        let year_labels = MONTHS
            .iter()
            .enumerate()
            .map(|(idx, month)| GanttLabel::Split {
                top: Some((*month).to_string()),
                bottom: Some(format!("P{:02} | Q{}", idx + 1, idx / 3 + 1)),
            })
            .collect();

        let days_in_month = days_in_month(today).max(1);
        let now_frac = (f64::from(today.day0()) / f64::from(days_in_month)).clamp(0.0, 1.0);

        Self {
            project_name: title.to_string(),
            niic_date: today.format("%Y-%m").to_string(),
            status_date: Some(today.format("%Y-%m-%d").to_string()),
            project_status: StatusColor::Green,
            kpis: vec![
                Kpi {
                    label: "Budget".to_string(),
                    value: "0".to_string(),
                    color: StatusColor::Green,
                },
                Kpi {
                    label: "Progress".to_string(),
                    value: "0%".to_string(),
                    color: StatusColor::Yellow,
                },
            ],
            year_gantt: GanttData {
                labels: year_labels,
                rows: vec!["Stream 1".to_string(), "Stream 2".to_string()],
                now_col: i64::from(today.month0()),
                now_frac,
                ..GanttData::default()
            },
            quarter_gantt: GanttData {
                rows: vec!["Task 1".to_string(), "Task 2".to_string()],
                ..GanttData::default()
            },
            show_artifacts: Some(true),
            show_niic_date: Some(true),
            ..Self::default()
        }
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    first_of_next
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}
