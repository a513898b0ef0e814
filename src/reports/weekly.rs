//! Weekly Report document
//!
//! One rep's week on paper: headline metrics, the visits and quotations of
//! the week, the open leads, then the rep's own narrative. Several reports
//! can be bound into one document, each starting on a new page.

use chrono::NaiveDate;

use super::layout::{LaidOutDocument, LayoutEngine, Metric, Table};
use crate::models::{Quotation, Visit, WeeklyReport};

const BODY_SIZE: f32 = 10.0;

/// Headline numbers of a week
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeeklyMetrics {
    pub visits: usize,
    pub quotations: usize,
    /// Visits that still need a follow-up
    pub leads: usize,
    /// Quotations per visit, as a percentage
    pub conversion_rate: f64,
}

impl WeeklyMetrics {
    pub fn compute(visits: &[Visit], quotations: &[Quotation]) -> Self {
        let leads = visits.iter().filter(|v| v.follow_up_required).count();
        let conversion_rate = if visits.is_empty() {
            0.0
        } else {
            quotations.len() as f64 / visits.len() as f64 * 100.0
        };
        Self {
            visits: visits.len(),
            quotations: quotations.len(),
            leads,
            conversion_rate,
        }
    }

    fn boxes(&self) -> Vec<Metric> {
        vec![
            Metric::new("Visits", self.visits.to_string()),
            Metric::new("Quotations", self.quotations.to_string()),
            Metric::new("Leads", self.leads.to_string()),
            Metric::new("Conversion", format!("{:.1}%", self.conversion_rate)),
        ]
    }
}

/// A visit that asked for a follow-up
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub facility: String,
    pub contact: String,
    pub next_action: String,
    pub potential_value: Option<f64>,
}

impl Lead {
    pub fn from_visit(visit: &Visit) -> Self {
        Self {
            facility: visit.client.name.clone(),
            contact: visit
                .contacts
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
            next_action: if visit.follow_up_actions.is_empty() {
                visit.outcome.clone().unwrap_or_default()
            } else {
                visit.follow_up_actions.join("; ")
            },
            potential_value: visit.potential_value,
        }
    }
}

/// Everything printed for one weekly report
#[derive(Debug, Clone)]
pub struct WeeklyReportData {
    pub report: WeeklyReport,
    pub visits: Vec<Visit>,
    pub quotations: Vec<Quotation>,
    pub leads: Vec<Lead>,
    pub metrics: WeeklyMetrics,
}

impl WeeklyReportData {
    /// Derive leads and metrics from the week's records
    pub fn new(report: WeeklyReport, mut visits: Vec<Visit>, quotations: Vec<Quotation>) -> Self {
        visits.sort_by_key(|v| v.visit_date);
        let leads = visits
            .iter()
            .filter(|v| v.follow_up_required)
            .map(Lead::from_visit)
            .collect();
        let metrics = WeeklyMetrics::compute(&visits, &quotations);
        Self {
            report,
            visits,
            quotations,
            leads,
            metrics,
        }
    }

    pub fn subtitle(&self) -> String {
        format!(
            "{} - {} ({} to {})",
            self.report.rep_name(),
            self.report.iso_week(),
            self.report.week_start,
            self.report.week_end
        )
    }
}

/// "12,500" or "12,500.50"
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc().abs() as u64;
    let cents = ((rounded.abs() - rounded.abs().trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    if cents == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, cents)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%a %d %b").to_string()
}

fn visits_table(visits: &[Visit]) -> Table {
    let mut table = Table::new(&[
        ("Date", 1.1),
        ("Client", 2.0),
        ("Contacts", 2.2),
        ("Outcome", 2.6),
        ("Value", 1.0),
    ]);
    for visit in visits {
        table.push_row(vec![
            format_date(visit.visit_date),
            visit.client.name.clone(),
            visit
                .contacts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            visit.outcome.clone().unwrap_or_default(),
            visit.potential_value.map(format_amount).unwrap_or_default(),
        ]);
    }
    table
}

fn quotations_table(quotations: &[Quotation]) -> Table {
    let mut table = Table::new(&[
        ("Facility", 2.0),
        ("Equipment", 3.0),
        ("Qty", 0.6),
        ("Status", 1.1),
    ]);
    for quotation in quotations {
        table.push_row(vec![
            quotation.facility.name.clone(),
            quotation.equipment_required.join(", "),
            quotation.quantity.map(|q| q.to_string()).unwrap_or_default(),
            quotation.status.to_string(),
        ]);
    }
    table
}

fn leads_table(leads: &[Lead]) -> Table {
    let mut table = Table::new(&[
        ("Facility", 2.0),
        ("Contact", 2.0),
        ("Next Action", 3.0),
        ("Value", 1.0),
    ]);
    for lead in leads {
        table.push_row(vec![
            lead.facility.clone(),
            lead.contact.clone(),
            lead.next_action.clone(),
            lead.potential_value.map(format_amount).unwrap_or_default(),
        ]);
    }
    table
}

fn text_section(engine: &mut LayoutEngine, heading: &str, text: Option<&str>) {
    let text = text.map(str::trim).unwrap_or("");
    engine.heading(heading, 2);
    if text.is_empty() {
        engine.paragraph("None provided.", BODY_SIZE);
    } else {
        engine.paragraph(text, BODY_SIZE);
    }
}

/// Lay out one report at the engine's cursor
fn write_report(engine: &mut LayoutEngine, data: &WeeklyReportData, with_title: bool) {
    let report = &data.report;
    if with_title {
        engine.heading(&format!("{} - {}", report.rep_name(), report.iso_week()), 1);
    }
    engine.labeled(
        "Period",
        &format!("{} to {}", report.week_start, report.week_end),
        BODY_SIZE,
    );
    engine.labeled("Status", &report.status.to_string(), BODY_SIZE);
    if let Some(reviewed) = report.reviewed_at {
        engine.labeled("Reviewed", &reviewed.format("%Y-%m-%d").to_string(), BODY_SIZE);
    }
    engine.spacer(8.0);

    engine.metric_boxes(&data.metrics.boxes());

    engine.heading(&format!("Visits ({})", data.visits.len()), 2);
    engine.table(&visits_table(&data.visits));

    engine.heading(&format!("Quotations ({})", data.quotations.len()), 2);
    engine.table(&quotations_table(&data.quotations));

    engine.heading(&format!("Leads ({})", data.leads.len()), 2);
    engine.table(&leads_table(&data.leads));

    text_section(engine, "Summary", Some(report.content.as_str()));
    text_section(engine, "Challenges", report.challenges.as_deref());
    text_section(engine, "Plan for Next Week", report.next_week_plan.as_deref());
    if report.admin_notes.as_deref().map_or(false, |n| !n.trim().is_empty()) {
        text_section(engine, "Admin Notes", report.admin_notes.as_deref());
    }
}

/// A single weekly report
pub fn layout_weekly_report(data: &WeeklyReportData, generated: &str) -> LaidOutDocument {
    let mut engine = LayoutEngine::new("Weekly Report", data.subtitle());
    write_report(&mut engine, data, false);
    engine.finish(generated)
}

/// Several reports in one document, one report per page run
pub fn layout_report_set(
    title: &str,
    reports: &[WeeklyReportData],
    generated: &str,
) -> LaidOutDocument {
    let subtitle = format!("{} reports", reports.len());
    let mut engine = LayoutEngine::new(title, subtitle);
    if reports.is_empty() {
        engine.paragraph("No reports in the selected period.", BODY_SIZE);
    }
    for (i, data) in reports.iter().enumerate() {
        if i > 0 {
            engine.page_break();
        }
        write_report(&mut engine, data, true);
    }
    engine.finish(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Facility, ReviewStatus};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report() -> WeeklyReport {
        serde_json::from_value(json!({
            "_id": "r1",
            "weekStart": "2025-09-29",
            "weekEnd": "2025-10-05",
            "content": "Good week in the north region.",
            "challenges": "Two hospitals postponed meetings.",
            "status": "approved",
            "user": {"_id": "u1", "firstName": "Jane", "lastName": "Doe"}
        }))
        .unwrap()
    }

    fn visit(name: &str, day: u32, follow_up: bool) -> Visit {
        let mut visit = Visit::new(Facility::named(name), date(2025, 9, day));
        visit.follow_up_required = follow_up;
        visit.potential_value = Some(12500.0);
        visit.contacts.push(Contact {
            name: "Dr. Mensah".into(),
            role: Some("Radiologist".into()),
            ..Contact::default()
        });
        if follow_up {
            visit.follow_up_actions.push("Send brochure".into());
        }
        visit
    }

    fn quotation() -> Quotation {
        serde_json::from_value(json!({
            "facility": {"name": "City Hospital"},
            "equipmentRequired": ["Ultrasound"],
            "quantity": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_metrics() {
        let visits = vec![visit("A", 29, true), visit("B", 30, false)];
        let metrics = WeeklyMetrics::compute(&visits, &[quotation()]);
        assert_eq!(metrics.visits, 2);
        assert_eq!(metrics.quotations, 1);
        assert_eq!(metrics.leads, 1);
        assert!((metrics.conversion_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(WeeklyMetrics::compute(&[], &[quotation()]).conversion_rate, 0.0);
    }

    #[test]
    fn test_leads_from_follow_ups() {
        let data = WeeklyReportData::new(
            report(),
            vec![visit("B", 30, false), visit("A", 29, true)],
            vec![],
        );
        assert_eq!(data.visits[0].client.name, "A");
        assert_eq!(data.leads.len(), 1);
        assert_eq!(data.leads[0].contact, "Dr. Mensah (Radiologist)");
        assert_eq!(data.leads[0].next_action, "Send brochure");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12500.0), "12,500");
        assert_eq!(format_amount(1234567.5), "1,234,567.50");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(-1500.25), "-1,500.25");
    }

    #[test]
    fn test_layout_contains_sections() {
        let data = WeeklyReportData::new(report(), vec![visit("A", 29, true)], vec![quotation()]);
        let doc = layout_weekly_report(&data, "Generated 2025-10-06 09:00");
        let texts: Vec<&str> = doc.pages.iter().flat_map(|p| p.texts()).collect();
        for expected in ["Visits (1)", "Quotations (1)", "Leads (1)", "Summary", "Challenges", "50.0%"] {
            assert!(texts.contains(&expected), "missing {}", expected);
        }
        assert!(texts.contains(&"None provided."));
        assert!(!texts.contains(&"Admin Notes"));
        assert_eq!(data.report.status, ReviewStatus::Approved);
    }

    #[test]
    fn test_report_set_starts_each_report_on_new_page() {
        let one = WeeklyReportData::new(report(), vec![], vec![]);
        let doc = layout_report_set("Weekly Reports", &[one.clone(), one], "stamp");
        assert_eq!(doc.pages.len(), 2);
        assert!(doc.pages[1].texts().any(|t| t == "Jane Doe - Week 40, 2025"));
    }
}
