//! Export service
//!
//! Fetches the selected data types, filters them locally and assembles
//! the workbook. The request is validated before anything is fetched. A
//! data type whose fetch fails is logged and exported empty; the other
//! types are still exported.

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::api::{ListQuery, RecordSource};
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::export::fields::person_display_name;
use crate::export::grouping::{owned_by, within_range};
use crate::export::{
    build_workbook, DataSet, FormatOptions, PersonSheet, SheetLayout, SheetOptions, SummaryInfo,
    WorkbookModel,
};
use crate::models::{ColumnSpec, DataType};

/// One data type and the columns to export for it
#[derive(Debug, Clone)]
pub struct TypeSelection {
    pub data_type: DataType,
    pub columns: Vec<ColumnSpec>,
}

/// Everything the user chose for one export
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub selections: Vec<TypeSelection>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    /// Keep only records owned by these users (empty = everyone)
    pub user_ids: Vec<String>,
    /// Add one sheet per selected user
    pub per_person_sheets: bool,
    pub layout: SheetLayout,
    pub group_by_week: bool,
    pub include_summary: bool,
    /// Shown as "Generated by" in the summary block
    pub actor: Option<String>,
}

impl ExportRequest {
    /// Reject requests that cannot produce a sensible workbook
    pub fn validate(&self) -> FieldSalesResult<()> {
        if self.selections.is_empty() {
            return Err(FieldSalesError::Validation(
                "Select at least one data type to export".into(),
            ));
        }
        if self.selections.iter().any(|s| s.columns.is_empty()) {
            return Err(FieldSalesError::Validation(
                "Select at least one column to export".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FieldSalesError::Validation(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }
        if self.per_person_sheets && self.user_ids.is_empty() {
            return Err(FieldSalesError::Validation(
                "Per-person sheets need at least one selected person".into(),
            ));
        }
        Ok(())
    }

    fn list_query(&self) -> ListQuery {
        let query = ListQuery::new().date_range(self.start_date, self.end_date);
        match &self.search {
            Some(term) => query.search(term.clone()),
            None => query,
        }
    }
}

/// Result of an export run
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub workbook: WorkbookModel,
    /// Records exported per data type
    pub counts: Vec<(DataType, usize)>,
    /// Data types that could not be fetched, with the reason
    pub failed: Vec<(DataType, String)>,
}

impl ExportOutcome {
    pub fn record_count(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Service for building spreadsheet exports
pub struct ExportService<'a, S: RecordSource> {
    source: &'a S,
    format: FormatOptions,
}

impl<'a, S: RecordSource> ExportService<'a, S> {
    pub fn new(source: &'a S, format: FormatOptions) -> Self {
        Self { source, format }
    }

    /// Fetch, filter and assemble the workbook for a request
    pub async fn build(&self, request: &ExportRequest) -> FieldSalesResult<ExportOutcome> {
        request.validate()?;

        let query = request.list_query();
        let fetches = request.selections.iter().map(|selection| {
            let query = &query;
            async move {
                let result = self.source.list_all(selection.data_type, query).await;
                (selection, result)
            }
        });

        let mut datasets = Vec::with_capacity(request.selections.len());
        let mut counts = Vec::new();
        let mut failed = Vec::new();
        let mut names: BTreeMap<String, String> = BTreeMap::new();

        for (selection, result) in join_all(fetches).await {
            let data_type = selection.data_type;
            let records = match result {
                Ok(records) => records,
                Err(e) => {
                    warn!(data_type = %data_type, error = %e, "fetch failed, exporting no records for this type");
                    failed.push((data_type, e.to_string()));
                    Vec::new()
                }
            };

            let records: Vec<Value> = records
                .into_iter()
                .filter(|r| within_range(r, data_type, request.start_date, request.end_date))
                .filter(|r| owned_by(r, data_type, &request.user_ids))
                .collect();

            for record in &records {
                remember_names(&mut names, record, data_type, &request.user_ids);
            }

            counts.push((data_type, records.len()));
            datasets.push(DataSet {
                data_type,
                columns: selection.columns.clone(),
                records,
            });
        }

        let people = if request.per_person_sheets {
            request
                .user_ids
                .iter()
                .map(|id| PersonSheet {
                    user_id: id.clone(),
                    name: names.get(id).cloned().unwrap_or_else(|| id.clone()),
                })
                .collect()
        } else {
            Vec::new()
        };

        let options = SheetOptions {
            layout: request.layout,
            group_by_week: request.group_by_week,
            people,
            summary: request.include_summary.then(|| SummaryInfo {
                generated_at: Local::now(),
                actor: request.actor.clone(),
                start: request.start_date,
                end: request.end_date,
            }),
            format: self.format.clone(),
        };

        let workbook = build_workbook(&datasets, &options);
        info!(
            sheets = workbook.sheets.len(),
            records = workbook.record_count(),
            failed = failed.len(),
            "export assembled"
        );

        Ok(ExportOutcome {
            workbook,
            counts,
            failed,
        })
    }
}

/// Learn display names of the selected users from the records they own
fn remember_names(
    names: &mut BTreeMap<String, String>,
    record: &Value,
    data_type: DataType,
    user_ids: &[String],
) {
    let field = data_type.person_field();
    for id in user_ids {
        if names.contains_key(id) || !owned_by(record, data_type, std::slice::from_ref(id)) {
            continue;
        }
        if let Some(name) = person_display_name(record, field).filter(|n| n != id) {
            names.insert(id.clone(), name);
        }
    }
}
