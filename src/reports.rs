//! Aggregates behind the dashboard and the reports page.
//!
//! The reducers are pure functions over rows fetched from the record
//! store; `build_dashboard` and `build_report` do the fetching.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::model::leave_request::LeaveStatus;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 42)]
    pub total_employees: u64,
    #[schema(example = 3)]
    pub pending_leave_requests: u64,
    #[schema(example = 17)]
    pub total_leave_requests: u64,
    /// `present` attendance rows since the first day of the current month
    #[schema(example = 120)]
    pub attendance_this_month: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    #[schema(example = 42)]
    pub total_employees: u64,
    #[schema(example = json!({"Engineering": 20, "People": 4}))]
    pub department_breakdown: BTreeMap<String, u64>,
    #[schema(example = 3)]
    pub pending_leave: u64,
    /// Percentage of `present` rows over the last month, one decimal
    #[schema(example = 93.4)]
    pub attendance_rate: f64,
    /// Mean rating with one decimal; null when there are no reviews
    #[schema(example = 3.8, nullable = true)]
    pub avg_performance_rating: Option<f64>,
    #[schema(example = 12)]
    pub total_reviews: u64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn department_breakdown(departments: &[String]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for department in departments {
        *counts.entry(department.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn count_pending(statuses: &[LeaveStatus]) -> u64 {
    statuses.iter().filter(|s| **s == LeaveStatus::Pending).count() as u64
}

pub fn count_present(statuses: &[AttendanceStatus]) -> u64 {
    statuses
        .iter()
        .filter(|s| **s == AttendanceStatus::Present)
        .count() as u64
}

/// `present / total * 100`, one decimal. 0.0 for an empty window.
pub fn attendance_rate(statuses: &[AttendanceStatus]) -> f64 {
    if statuses.is_empty() {
        return 0.0;
    }
    round1(count_present(statuses) as f64 / statuses.len() as f64 * 100.0)
}

/// Unrated reviews count as 0 but still weigh in the mean.
pub fn average_rating(ratings: &[Option<u8>]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u64 = ratings.iter().map(|r| r.unwrap_or(0) as u64).sum();
    Some(round1(sum as f64 / ratings.len() as f64))
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

pub async fn build_dashboard<S>(store: &S, today: NaiveDate) -> Result<DashboardStats, StoreError>
where
    S: RecordStore + ?Sized,
{
    let departments = store.employee_departments().await?;
    let leave = store.leave_statuses().await?;
    let attendance = store.attendance_statuses_since(month_start(today)).await?;

    Ok(DashboardStats {
        total_employees: departments.len() as u64,
        pending_leave_requests: count_pending(&leave),
        total_leave_requests: leave.len() as u64,
        attendance_this_month: count_present(&attendance),
    })
}

pub async fn build_report<S>(store: &S, today: NaiveDate) -> Result<ReportSummary, StoreError>
where
    S: RecordStore + ?Sized,
{
    let since = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    let departments = store.employee_departments().await?;
    let leave = store.leave_statuses().await?;
    let attendance = store.attendance_statuses_since(since).await?;
    let ratings = store.review_ratings().await?;

    Ok(ReportSummary {
        total_employees: departments.len() as u64,
        department_breakdown: department_breakdown(&departments),
        pending_leave: count_pending(&leave),
        attendance_rate: attendance_rate(&attendance),
        avg_performance_rating: average_rating(&ratings),
        total_reviews: ratings.len() as u64,
    })
}
