use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    /// Identity (profile) this employee record belongs to.
    #[schema(example = 12)]
    pub user_id: u64,

    #[schema(example = "EMP-001")]
    pub employee_number: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Backend Developer")]
    pub position: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,
}

/// Employee joined with the linked profile, as shown in the directory.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 12,
        "employee_number": "EMP-001",
        "department": "Engineering",
        "position": "Backend Developer",
        "hire_date": "2024-01-01",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "created_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct EmployeeView {
    pub id: u64,
    pub user_id: u64,
    pub employee_number: String,
    pub department: String,
    pub position: String,
    #[schema(value_type = String, format = "date")]
    pub hire_date: NaiveDate,
    #[schema(nullable = true)]
    pub full_name: Option<String>,
    #[schema(nullable = true)]
    pub email: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl EmployeeView {
    /// Case-insensitive match on number, name, email, department or position.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            Some(self.employee_number.as_str()),
            self.full_name.as_deref(),
            self.email.as_deref(),
            Some(self.department.as_str()),
            Some(self.position.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
