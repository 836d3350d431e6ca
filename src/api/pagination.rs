use serde::Serialize;

/// Resolved page window for a listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Parse raw query values the lenient way: anything missing, non-numeric
    /// or below 1 falls back to the default.
    pub fn resolve(page: Option<&str>, limit: Option<&str>, default_limit: i64, max_limit: i64) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|v| *v >= 1);

        Self {
            page: parse(page).unwrap_or(1),
            limit: parse(limit).unwrap_or(default_limit).min(max_limit),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_projects: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    fn new(params: PageParams, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + params.limit - 1) / params.limit };
        Self {
            current_page: params.page,
            total_pages,
            total_projects: None,
            total_users: None,
            has_next: params.page < total_pages,
            has_prev: params.page > 1,
        }
    }

    pub fn projects(params: PageParams, total: i64) -> Self {
        Self {
            total_projects: Some(total),
            ..Self::new(params, total)
        }
    }

    pub fn users(params: PageParams, total: i64) -> Self {
        Self {
            total_users: Some(total),
            ..Self::new(params, total)
        }
    }
}
