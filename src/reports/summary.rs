//! Employee Summary Report
//!
//! Activity per sales rep over a date window: visits made, distinct
//! facilities seen, new clients won, total potential value and quotations
//! requested.
//!
//! A facility counts as a new client for a rep when the rep visited it in
//! the window and the first visit anyone ever made to it also lies in the
//! window. That needs the full visit history, not only the window.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use super::layout::{LaidOutDocument, LayoutEngine, Metric, Table};
use super::weekly::format_amount;
use crate::error::FieldSalesResult;
use crate::export::grouping::UNASSIGNED_LABEL;
use crate::models::{Quotation, UserRef, Visit};

/// One rep's row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmployeeSummary {
    /// Empty for records with no rep
    pub user_id: String,
    pub name: String,
    pub visits: usize,
    /// Distinct facilities visited
    pub facilities: usize,
    pub new_clients: usize,
    pub potential_value: f64,
    pub quotations: usize,
}

impl EmployeeSummary {
    fn new(user: Option<&UserRef>) -> Self {
        Self {
            user_id: user.map(|u| u.id().to_string()).unwrap_or_default(),
            name: user
                .map(UserRef::display_name)
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
            ..Self::default()
        }
    }

    fn is_unassigned(&self) -> bool {
        self.user_id.is_empty()
    }
}

/// Employee Summary Report
#[derive(Debug, Clone)]
pub struct EmployeeSummaryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Sorted by name, unassigned last
    pub employees: Vec<EmployeeSummary>,
}

fn key_of(user: Option<&UserRef>) -> String {
    user.map(|u| u.id().to_string()).unwrap_or_default()
}

impl EmployeeSummaryReport {
    /// Aggregate visits and quotations for the window `start..=end`.
    ///
    /// `history` holds every known visit; visits outside the window only
    /// serve to decide which facilities are new.
    pub fn generate(
        history: &[Visit],
        quotations: &[Quotation],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let in_window = |d: NaiveDate| start_date <= d && d <= end_date;

        // First visit to each facility, across all reps
        let mut first_visit: HashMap<String, NaiveDate> = HashMap::new();
        for visit in history {
            let key = visit.client.key();
            if key.is_empty() {
                continue;
            }
            first_visit
                .entry(key)
                .and_modify(|d| *d = (*d).min(visit.visit_date))
                .or_insert(visit.visit_date);
        }

        let mut rows: HashMap<String, EmployeeSummary> = HashMap::new();
        let mut facilities: HashMap<String, BTreeSet<String>> = HashMap::new();

        for visit in history.iter().filter(|v| in_window(v.visit_date)) {
            let user_key = key_of(visit.user.as_ref());
            let row = rows
                .entry(user_key.clone())
                .or_insert_with(|| EmployeeSummary::new(visit.user.as_ref()));
            row.visits += 1;
            row.potential_value += visit.potential_value.filter(|v| v.is_finite()).unwrap_or(0.0);

            let facility = visit.client.key();
            if !facility.is_empty() {
                facilities.entry(user_key).or_default().insert(facility);
            }
        }

        for quotation in quotations {
            let date = quotation.created_at.map(|t| t.date_naive());
            if !date.map_or(false, in_window) {
                continue;
            }
            let user = quotation.requested_by.as_ref();
            rows.entry(key_of(user))
                .or_insert_with(|| EmployeeSummary::new(user))
                .quotations += 1;
        }

        for (user_key, seen) in facilities {
            if let Some(row) = rows.get_mut(&user_key) {
                row.facilities = seen.len();
                row.new_clients = seen
                    .iter()
                    .filter(|f| first_visit.get(*f).map_or(false, |d| in_window(*d)))
                    .count();
            }
        }

        let mut employees: Vec<EmployeeSummary> = rows.into_values().collect();
        employees.sort_by(|a, b| {
            a.is_unassigned()
                .cmp(&b.is_unassigned())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        Self {
            start_date,
            end_date,
            employees,
        }
    }

    /// Column totals as a summary row
    pub fn totals(&self) -> EmployeeSummary {
        self.employees.iter().fold(
            EmployeeSummary {
                name: "Total".to_string(),
                ..EmployeeSummary::default()
            },
            |mut acc, row| {
                acc.visits += row.visits;
                acc.facilities += row.facilities;
                acc.new_clients += row.new_clients;
                acc.potential_value += row.potential_value;
                acc.quotations += row.quotations;
                acc
            },
        )
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Employee Summary: {} to {}\n",
            self.start_date, self.end_date
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<28} {:>7} {:>10} {:>8} {:>14} {:>10}\n",
            "Employee", "Visits", "Facilities", "New", "Potential", "Quotes"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        if self.employees.is_empty() {
            output.push_str("No activity in this period.\n");
            return output;
        }

        for row in &self.employees {
            output.push_str(&terminal_row(row));
        }
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&terminal_row(&self.totals()));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> FieldSalesResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "Start Date",
            "End Date",
            "Employee",
            "Visits",
            "Facilities",
            "New Clients",
            "Potential Value",
            "Quotations",
        ])?;

        for row in &self.employees {
            csv_writer.write_record([
                self.start_date.to_string(),
                self.end_date.to_string(),
                row.name.clone(),
                row.visits.to_string(),
                row.facilities.to_string(),
                row.new_clients.to_string(),
                format!("{:.2}", row.potential_value),
                row.quotations.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Printable version with headline totals and one table row per rep
    pub fn layout(&self, generated: &str) -> LaidOutDocument {
        let subtitle = format!("{} to {}", self.start_date, self.end_date);
        let mut engine = LayoutEngine::new("Employee Summary", subtitle);
        let totals = self.totals();

        engine.metric_boxes(&[
            Metric::new("Visits", totals.visits.to_string()),
            Metric::new("New Clients", totals.new_clients.to_string()),
            Metric::new("Quotations", totals.quotations.to_string()),
            Metric::new("Potential Value", format_amount(totals.potential_value)),
        ]);

        let mut table = Table::new(&[
            ("Employee", 2.6),
            ("Visits", 1.0),
            ("Facilities", 1.2),
            ("New Clients", 1.2),
            ("Potential Value", 1.6),
            ("Quotations", 1.2),
        ]);
        for row in &self.employees {
            table.push_row(vec![
                row.name.clone(),
                row.visits.to_string(),
                row.facilities.to_string(),
                row.new_clients.to_string(),
                format_amount(row.potential_value),
                row.quotations.to_string(),
            ]);
        }
        engine.heading("Activity by Employee", 2);
        engine.table(&table);
        engine.finish(generated)
    }
}

fn terminal_row(row: &EmployeeSummary) -> String {
    format!(
        "{:<28} {:>7} {:>10} {:>8} {:>14} {:>10}\n",
        truncate(&row.name, 28),
        row.visits,
        row.facilities,
        row.new_clients,
        format_amount(row.potential_value),
        row.quotations
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
