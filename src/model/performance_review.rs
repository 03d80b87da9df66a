use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Performance review joined with the reviewed employee and the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PerformanceReviewView {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "EMP-001")]
    pub employee_number: String,
    pub department: String,
    pub position: String,
    #[schema(nullable = true)]
    pub employee_name: Option<String>,
    #[schema(nullable = true)]
    pub reviewer_id: Option<u64>,
    #[schema(nullable = true)]
    pub reviewer_name: Option<String>,
    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    pub review_date: NaiveDate,
    /// 1 to 5 stars
    #[schema(example = 4, nullable = true)]
    pub rating: Option<u8>,
    #[schema(nullable = true)]
    pub comments: Option<String>,
}
