//! List query parameters and cache keys

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{DataType, UserId};

/// Filters and pagination for a list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_ids: Vec<UserId>,
    /// Endpoint-specific filters, passed through verbatim
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page.max(1));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() { None } else { Some(term) };
        self
    }

    pub fn date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn user(mut self, user: UserId) -> Self {
        if !self.user_ids.contains(&user) {
            self.user_ids.push(user);
        }
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query-string pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.trim().to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if !self.user_ids.is_empty() {
            let mut ids: Vec<&str> = self.user_ids.iter().map(UserId::as_str).collect();
            ids.sort_unstable();
            pairs.push(("userId".to_string(), ids.join(",")));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }

    /// Cache key for this query against a data type
    pub fn key(&self, data_type: DataType) -> QueryKey {
        QueryKey {
            data_type,
            params: self.to_pairs(),
        }
    }
}

/// Identity of a cached list request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub data_type: DataType,
    pub params: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        let query = ListQuery::new()
            .page(2)
            .limit(50)
            .search("  city ")
            .date_range(NaiveDate::from_ymd_opt(2025, 10, 1), None)
            .filter("status", "pending");
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("search".to_string(), "city".to_string()),
                ("startDate".to_string(), "2025-10-01".to_string()),
                ("status".to_string(), "pending".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_search_is_dropped() {
        assert!(ListQuery::new().search("   ").to_pairs().is_empty());
    }

    #[test]
    fn test_key_ignores_user_order() {
        let a = ListQuery::new().user(UserId::new("u2")).user(UserId::new("u1"));
        let b = ListQuery::new().user(UserId::new("u1")).user(UserId::new("u2"));
        assert_eq!(a.key(DataType::Visits), b.key(DataType::Visits));
        assert_ne!(a.key(DataType::Visits), a.key(DataType::Reports));
    }
}
