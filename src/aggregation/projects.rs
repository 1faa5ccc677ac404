use serde::Serialize;
use serde_json::Value;

use crate::error::ProxyResult;
use crate::sources::{Page, UpstreamClient};

static ALL_FILTER: &str = "all";

/// Project status codes used by the core API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Active,
    Complete,
    Hold,
    Inactive,
}

impl ProjectStatus {
    /// Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Some(ProjectStatus::Active),
            "complete" => Some(ProjectStatus::Complete),
            "hold" => Some(ProjectStatus::Hold),
            "inactive" => Some(ProjectStatus::Inactive),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ProjectStatus::Active => 0,
            ProjectStatus::Complete => 2,
            ProjectStatus::Hold => 3,
            ProjectStatus::Inactive => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Complete => "complete",
            ProjectStatus::Hold => "hold",
            ProjectStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectsPage {
    pub page: u32,
    pub filter: String,
    pub count: usize,
    pub total_in_bqe: u64,
    pub projects: Vec<Value>,
}

/// Unknown status names leave the page untouched and report `"all"`.
pub fn shape_projects(page_number: u32, page: Page, status: Option<&str>) -> ProjectsPage {
    let reported = page.reported_total();
    let mut projects = page.into_items();
    let total_in_bqe = reported.unwrap_or(projects.len() as u64);

    let filter = match status.and_then(ProjectStatus::parse) {
        Some(status) => {
            projects.retain(|p| p.get("status").and_then(Value::as_i64) == Some(status.code()));
            status.as_str()
        }
        None => ALL_FILTER,
    };

    ProjectsPage {
        page: page_number,
        filter: filter.to_owned(),
        count: projects.len(),
        total_in_bqe,
        projects,
    }
}

/// One page of `/project`, optionally filtered by status after fetching.
pub async fn list_projects(upstream: &UpstreamClient, page: u32, status: Option<&str>) -> ProxyResult<ProjectsPage> {
    let params = [
        ("page", page.to_string()),
        ("pageSize", upstream.config().projects_page_size.to_string()),
    ];
    let fetched = upstream.get_page(&upstream.url("project"), &params).await?;
    Ok(shape_projects(page, fetched, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Page {
        Page::from_body(json!({
            "items": [
                {"id": "p1", "status": 0},
                {"id": "p2", "status": 2},
                {"id": "p3", "status": 0},
                {"id": "p4", "status": 4},
            ],
            "total": 250
        }))
    }

    #[test]
    fn status_names_map_to_codes() {
        assert_eq!(ProjectStatus::parse("active").map(ProjectStatus::code), Some(0));
        assert_eq!(ProjectStatus::parse("complete").map(ProjectStatus::code), Some(2));
        assert_eq!(ProjectStatus::parse("hold").map(ProjectStatus::code), Some(3));
        assert_eq!(ProjectStatus::parse("inactive").map(ProjectStatus::code), Some(4));
        assert_eq!(ProjectStatus::parse("  HoLd "), Some(ProjectStatus::Hold));
        assert_eq!(ProjectStatus::parse("closed"), None);
        assert_eq!(ProjectStatus::parse(""), None);
    }

    #[test]
    fn recognized_filter_keeps_matching_projects() {
        let shaped = shape_projects(1, sample(), Some(" Active"));
        assert_eq!(shaped.filter, "active");
        assert_eq!(shaped.count, 2);
        assert_eq!(shaped.total_in_bqe, 250);
        assert!(shaped.projects.iter().all(|p| p["status"] == 0));
    }

    #[test]
    fn unknown_filter_is_ignored() {
        let shaped = shape_projects(3, sample(), Some("archived"));
        assert_eq!(shaped.filter, "all");
        assert_eq!(shaped.count, 4);
        assert_eq!(shaped.page, 3);
    }

    #[test]
    fn bare_list_total_counts_before_filtering() {
        let page = Page::from_body(json!([{"status": 3}, {"status": 0}]));
        let shaped = shape_projects(1, page, Some("hold"));
        assert_eq!(shaped.count, 1);
        assert_eq!(shaped.total_in_bqe, 2);
    }
}
