//! Export file and worksheet naming

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::models::DataType;

/// Excel's limit on worksheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Make a name acceptable as an Excel worksheet name
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { ' ' } else { c })
        .collect();
    let cleaned = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned = trim_sheet_edges(&cleaned);
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    let truncated = trim_sheet_edges(&truncated).to_string();

    if truncated.is_empty() || truncated.eq_ignore_ascii_case("history") {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// Excel rejects names that begin or end with an apostrophe
fn trim_sheet_edges(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\'' || c.is_whitespace())
}

/// Sanitize names and make them unique (case-insensitively, as Excel
/// compares them), suffixing repeats with " (2)", " (3)"...
pub fn unique_sheet_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let base = sanitize_sheet_name(name.as_ref());
        let mut candidate = base.clone();
        let mut n = 2;
        while seen.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let room = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(room).collect();
            candidate = format!("{}{}", trim_sheet_edges(&stem), suffix);
            n += 1;
        }
        seen.insert(candidate.to_lowercase());
        result.push(candidate);
    }

    result
}

fn slug(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Default export filename, e.g.
/// `fieldsales-visits-call-logs_2025-10-01_to_2025-10-31.xlsx`.
///
/// Without a date range the file is stamped with `today`.
pub fn export_filename(
    data_types: &[DataType],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    extension: &str,
) -> String {
    let subject = match data_types {
        [] => "export".to_string(),
        types if types.len() == DataType::ALL.len() => "all-data".to_string(),
        types if types.len() > 3 => format!("{}-types", types.len()),
        types => types
            .iter()
            .map(|t| slug(t.label()))
            .collect::<Vec<_>>()
            .join("-"),
    };

    let ymd = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let range = match (start, end) {
        (Some(s), Some(e)) => format!("{}_to_{}", ymd(s), ymd(e)),
        (Some(s), None) => format!("from_{}", ymd(s)),
        (None, Some(e)) => format!("until_{}", ymd(e)),
        (None, None) => ymd(today),
    };

    format!(
        "fieldsales-{}_{}.{}",
        subject,
        range,
        extension.trim_start_matches('.')
    )
}

/// Filename for a single weekly report document
pub fn report_filename(rep_name: &str, week_start: NaiveDate) -> String {
    let who = slug(rep_name);
    let who = if who.is_empty() { "report".to_string() } else { who };
    format!("weekly-report_{}_{}.pdf", who, week_start.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Visits: Q3/Q4"), "Visits Q3 Q4");
        assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name("History"), "Sheet");

        let long = "A very long representative name indeed";
        let name = sanitize_sheet_name(long);
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_truncation_leaves_no_trailing_apostrophe() {
        let name = format!("{}'Brien", "A".repeat(30));
        let sheet = sanitize_sheet_name(&name);
        assert_eq!(sheet, "A".repeat(30));

        let name = format!("{} 'Connor", "B".repeat(29));
        assert_eq!(sanitize_sheet_name(&name), "B".repeat(29));

        let names = unique_sheet_names(&vec![format!("{}'Hara", "C".repeat(26)); 2]);
        assert_eq!(names[0], "C".repeat(26) + "'Hara");
        assert_eq!(names[1], "C".repeat(26) + " (2)");
        assert!(names.iter().all(|n| !n.ends_with('\'') && !n.contains("' (")));
    }

    #[test]
    fn test_unique_sheet_names() {
        let names = unique_sheet_names(&["Visits", "visits", "Jane", "Visits"]);
        assert_eq!(names, vec!["Visits", "visits (2)", "Jane", "Visits (3)"]);
    }

    #[test]
    fn test_unique_names_stay_within_limit() {
        let long = "X".repeat(40);
        let names = unique_sheet_names(&[long.clone(), long]);
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME_LEN));
        assert!(names[1].ends_with(" (2)"));
    }

    #[test]
    fn test_export_filename() {
        let today = date(2025, 10, 19);
        assert_eq!(
            export_filename(
                &[DataType::Visits, DataType::CallLogs],
                Some(date(2025, 10, 1)),
                Some(date(2025, 10, 31)),
                today,
                "xlsx"
            ),
            "fieldsales-visits-call-logs_2025-10-01_to_2025-10-31.xlsx"
        );
        assert_eq!(
            export_filename(&DataType::ALL, None, None, today, ".csv"),
            "fieldsales-all-data_2025-10-19.csv"
        );
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            report_filename("Jane Doe", date(2025, 9, 29)),
            "weekly-report_jane-doe_2025-09-29.pdf"
        );
    }
}
