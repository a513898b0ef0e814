//! Report service
//!
//! Gathers the records behind printable reports: a weekly report with the
//! rep's visits and quotations of that week, or the per-employee summary
//! over a date window.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ListQuery, RecordSource};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::export::filename::report_filename;
use crate::models::{DataType, Quotation, UserRef, Visit, WeeklyReport};
use crate::reports::{
    layout_report_set, layout_weekly_report, render_pdf, EmployeeSummaryReport, WeeklyReportData,
};

/// Decode records into a typed model, skipping the ones that do not fit
fn typed<T: DeserializeOwned>(data_type: DataType, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(data_type = %data_type, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn same_rep(report: &WeeklyReport, rep: Option<&UserRef>) -> bool {
    match (&report.user, rep) {
        (Some(a), Some(b)) => a.id() == b.id(),
        (None, None) => true,
        _ => false,
    }
}

/// Attach the matching visits and quotations to each report
fn assemble(
    reports: Vec<WeeklyReport>,
    visits: &[Visit],
    quotations: &[Quotation],
) -> Vec<WeeklyReportData> {
    reports
        .into_iter()
        .map(|report| {
            let week_visits = visits
                .iter()
                .filter(|v| report.covers(v.visit_date) && same_rep(&report, v.user.as_ref()))
                .cloned()
                .collect();
            let week_quotations = quotations
                .iter()
                .filter(|q| {
                    q.created_at
                        .is_some_and(|t| report.covers(t.date_naive()))
                        && same_rep(&report, q.requested_by.as_ref())
                })
                .cloned()
                .collect();
            WeeklyReportData::new(report, week_visits, week_quotations)
        })
        .collect()
}

/// A rendered PDF and what went into it
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    /// Suggested output file name
    pub file_name: String,
    pub pages: usize,
    pub reports: usize,
}

/// Service for report documents
pub struct ReportService<'a, S: RecordSource> {
    source: &'a S,
}

impl<'a, S: RecordSource> ReportService<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    async fn visits_and_quotations(
        &self,
        query: &ListQuery,
    ) -> FieldSalesResult<(Vec<Visit>, Vec<Quotation>)> {
        let (visits, quotations) = futures::join!(
            self.source.list_all(DataType::Visits, query),
            self.source.list_all(DataType::Quotations, query)
        );
        Ok((
            typed(DataType::Visits, visits?),
            typed(DataType::Quotations, quotations?),
        ))
    }

    /// One weekly report with its week's records
    pub async fn weekly(&self, id: &str) -> FieldSalesResult<WeeklyReportData> {
        let value = self.source.fetch_one(DataType::Reports, id).await?;
        let report: WeeklyReport = serde_json::from_value(value)?;

        let mut query = ListQuery::new().date_range(Some(report.week_start), Some(report.week_end));
        if let Some(user) = &report.user {
            query = query.user(user.id().clone());
        }
        let (visits, quotations) = self.visits_and_quotations(&query).await?;

        let mut data = assemble(vec![report], &visits, &quotations);
        data.pop()
            .ok_or_else(|| FieldSalesError::not_found(DataType::Reports.entity_name(), id))
    }

    /// Every report whose week starts inside the window
    pub async fn weekly_set(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FieldSalesResult<Vec<WeeklyReportData>> {
        let query = ListQuery::new().date_range(Some(start), Some(end));
        let reports: Vec<WeeklyReport> = typed(
            DataType::Reports,
            self.source.list_all(DataType::Reports, &query).await?,
        );
        let mut reports: Vec<WeeklyReport> = reports
            .into_iter()
            .filter(|r| start <= r.week_start && r.week_start <= end)
            .collect();
        reports.sort_by(|a, b| {
            a.week_start
                .cmp(&b.week_start)
                .then_with(|| a.rep_name().cmp(&b.rep_name()))
        });

        // Reports may run past the window end
        let last = reports.iter().map(|r| r.week_end).max().unwrap_or(end).max(end);
        let records_query = ListQuery::new().date_range(Some(start), Some(last));
        let (visits, quotations) = self.visits_and_quotations(&records_query).await?;

        Ok(assemble(reports, &visits, &quotations))
    }

    /// Render a single weekly report to PDF
    pub async fn weekly_pdf(&self, id: &str, generated: &str) -> FieldSalesResult<RenderedReport> {
        let data = self.weekly(id).await?;
        let layout = layout_weekly_report(&data, generated);
        let bytes = render_pdf(&layout)?;
        info!(report = id, pages = layout.pages.len(), "weekly report rendered");
        Ok(RenderedReport {
            bytes,
            file_name: report_filename(&data.report.rep_name(), data.report.week_start),
            pages: layout.pages.len(),
            reports: 1,
        })
    }

    /// Render all reports of a window into one PDF
    pub async fn weekly_set_pdf(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        generated: &str,
    ) -> FieldSalesResult<RenderedReport> {
        let set = self.weekly_set(start, end).await?;
        let title = format!("Weekly Reports {} to {}", start, end);
        let layout = layout_report_set(&title, &set, generated);
        let bytes = render_pdf(&layout)?;
        info!(reports = set.len(), pages = layout.pages.len(), "report set rendered");
        Ok(RenderedReport {
            bytes,
            file_name: format!("weekly-reports_{}_to_{}.pdf", start, end),
            pages: layout.pages.len(),
            reports: set.len(),
        })
    }

    /// Per-employee activity over a window.
    ///
    /// Visits are fetched without a date filter; the history decides which
    /// facilities are new clients.
    pub async fn employee_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FieldSalesResult<EmployeeSummaryReport> {
        if start > end {
            return Err(FieldSalesError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        let history_query = ListQuery::new();
        let window_query = ListQuery::new().date_range(Some(start), Some(end));
        let (visits, quotations) = futures::join!(
            self.source.list_all(DataType::Visits, &history_query),
            self.source.list_all(DataType::Quotations, &window_query)
        );
        let visits: Vec<Visit> = typed(DataType::Visits, visits?);
        let quotations: Vec<Quotation> = typed(DataType::Quotations, quotations?);

        let report = EmployeeSummaryReport::generate(&visits, &quotations, start, end);
        info!(employees = report.employees.len(), "employee summary generated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSource {
        records: HashMap<DataType, Vec<Value>>,
    }

    impl RecordSource for FakeSource {
        async fn list_all(&self, data_type: DataType, _query: &ListQuery) -> FieldSalesResult<Vec<Value>> {
            Ok(self.records.get(&data_type).cloned().unwrap_or_default())
        }

        async fn fetch_one(&self, data_type: DataType, id: &str) -> FieldSalesResult<Value> {
            self.records
                .get(&data_type)
                .and_then(|records| records.iter().find(|r| r["_id"] == id))
                .cloned()
                .ok_or_else(|| FieldSalesError::not_found(data_type.entity_name(), id))
        }
    }

    fn jane() -> Value {
        json!({"_id": "u1", "firstName": "Jane", "lastName": "Doe"})
    }

    fn source() -> FakeSource {
        let mut records = HashMap::new();
        records.insert(
            DataType::Reports,
            vec![
                json!({"_id": "r1", "weekStart": "2025-09-29", "weekEnd": "2025-10-05",
                       "content": "Busy week", "user": jane()}),
                json!({"_id": "r2", "weekStart": "2025-10-06", "weekEnd": "2025-10-12",
                       "content": "Quiet week", "user": jane()}),
            ],
        );
        records.insert(
            DataType::Visits,
            vec![
                json!({"client": {"name": "City Hospital"}, "visitDate": "2025-09-30",
                       "followUpRequired": true, "user": jane()}),
                json!({"client": {"name": "Mercy Clinic"}, "visitDate": "2025-10-02", "user": jane()}),
                json!({"client": {"name": "Other Rep"}, "visitDate": "2025-10-02", "user": "u2"}),
                json!({"client": {"name": "Next Week"}, "visitDate": "2025-10-07", "user": jane()}),
                json!({"visitDate": "2025-10-02"}),
            ],
        );
        records.insert(
            DataType::Quotations,
            vec![json!({"facility": {"name": "City Hospital"}, "equipmentRequired": ["CT"],
                        "createdAt": "2025-10-01T09:00:00Z", "requestedBy": "u1"})],
        );
        FakeSource { records }
    }

    #[tokio::test]
    async fn test_weekly_collects_the_reps_week() {
        let source = source();
        let data = ReportService::new(&source).weekly("r1").await.unwrap();
        assert_eq!(data.visits.len(), 2);
        assert_eq!(data.quotations.len(), 1);
        assert_eq!(data.metrics.leads, 1);
        assert!((data.metrics.conversion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_weekly_missing_report() {
        let source = source();
        let err = ReportService::new(&source).weekly("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_weekly_set_pdf() {
        let source = source();
        let service = ReportService::new(&source);
        let start = NaiveDate::from_ymd_opt(2025, 9, 29).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 10, 12).unwrap();

        let set = service.weekly_set(start, end).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[1].visits.len(), 1);

        let rendered = service.weekly_set_pdf(start, end, "stamp").await.unwrap();
        assert_eq!(rendered.reports, 2);
        assert_eq!(rendered.file_name, "weekly-reports_2025-09-29_to_2025-10-12.pdf");
        assert!(rendered.pages >= 2);
        assert!(rendered.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_employee_summary() {
        let source = source();
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
        let report = ReportService::new(&source)
            .employee_summary(start, end)
            .await
            .unwrap();
        let jane = report.employees.iter().find(|e| e.user_id == "u1").unwrap();
        assert_eq!(jane.visits, 2);
        // Both facilities are first seen inside the window
        assert_eq!(jane.new_clients, 2);
        assert_eq!(jane.quotations, 1);
    }
}
