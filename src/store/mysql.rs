use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::MySqlPool;
use tracing::debug;

use super::{LeaveQuery, RecordStore, StoreError};
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::employee::{Employee, EmployeeView};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::performance_review::PerformanceReviewView;
use crate::models::{NewRefreshToken, RefreshTokenRecord, UserCredentials};

const LEAVE_COLUMNS: &str =
    "id, employee_id, start_date, end_date, reason, status, approved_by, approved_at, created_at";

const LEAVE_VIEW_SELECT: &str = r#"
    SELECT
        lr.id,
        lr.employee_id,
        e.employee_number,
        e.department,
        p.full_name AS employee_name,
        lr.start_date,
        lr.end_date,
        lr.reason,
        lr.status,
        lr.approved_by,
        ap.full_name AS approver_name,
        lr.approved_at,
        lr.created_at
    FROM leave_requests lr
    INNER JOIN employees e ON e.id = lr.employee_id
    LEFT JOIN profiles p ON p.id = e.user_id
    LEFT JOIN profiles ap ON ap.id = lr.approved_by
"#;

const EMPLOYEE_VIEW_SELECT: &str = r#"
    SELECT
        e.id,
        e.user_id,
        e.employee_number,
        e.department,
        e.position,
        e.hire_date,
        p.full_name,
        p.email,
        e.created_at
    FROM employees e
    LEFT JOIN profiles p ON p.id = e.user_id
"#;

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(&'static str),
}

/// `RecordStore` backed by the MySQL schema in `db/schema.sql`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn find_employee_by_user(&self, user_id: u64) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, user_id, employee_number, department, position, hire_date
            FROM employees
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn get_employee(&self, id: u64) -> Result<Option<EmployeeView>, StoreError> {
        let sql = format!("{} WHERE e.id = ?", EMPLOYEE_VIEW_SELECT);
        let employee = sqlx::query_as::<_, EmployeeView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeView>, StoreError> {
        let sql = format!("{} ORDER BY e.created_at DESC", EMPLOYEE_VIEW_SELECT);
        let employees = sqlx::query_as::<_, EmployeeView>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    async fn insert_leave(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, start_date, end_date, reason, status, created_at)
            VALUES (?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(request.employee_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_leave(id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("leave request {id} vanished after insert")))
    }

    async fn find_leave(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
        let request = sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    async fn decide_leave(
        &self,
        id: u64,
        decision: Decision,
        approver: u64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = ?, approved_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(<&'static str>::from(decision.status()))
        .bind(approver)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_leave_view(&self, id: u64) -> Result<Option<LeaveRequestView>, StoreError> {
        let sql = format!("{} WHERE lr.id = ?", LEAVE_VIEW_SELECT);
        let view = sqlx::query_as::<_, LeaveRequestView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    async fn list_leave(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequestView>, i64), StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = query.employee_id {
            where_sql.push_str(" AND lr.employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        if let Some(status) = query.status {
            where_sql.push_str(" AND lr.status = ?");
            args.push(FilterValue::Str(status.into()));
        }

        let count_sql = format!(
            "SELECT COUNT(*) FROM leave_requests lr INNER JOIN employees e ON e.id = lr.employee_id{}",
            where_sql
        );
        debug!(sql = %count_sql, "Counting leave requests");

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "{}{} ORDER BY lr.created_at DESC LIMIT ? OFFSET ?",
            LEAVE_VIEW_SELECT, where_sql
        );
        debug!(sql = %data_sql, limit = query.limit, offset = query.offset, "Fetching leave requests");

        let mut data_q = sqlx::query_as::<_, LeaveRequestView>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let rows = data_q
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceView>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceView>(
            r#"
            SELECT
                a.id,
                a.employee_id,
                e.employee_number,
                e.department,
                e.position,
                p.full_name,
                a.date,
                a.check_in_time,
                a.check_out_time,
                a.status
            FROM attendance a
            INNER JOIN employees e ON e.id = a.employee_id
            LEFT JOIN profiles p ON p.id = e.user_id
            WHERE a.date = ?
            ORDER BY a.check_in_time
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn check_in(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in_time, status)
            VALUES (?, ?, ?, 'present')
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn check_out(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out_time = ?
            WHERE employee_id = ?
            AND date = ?
            AND check_in_time IS NOT NULL
            AND check_out_time IS NULL
            "#,
        )
        .bind(time)
        .bind(employee_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_reviews(&self) -> Result<Vec<PerformanceReviewView>, StoreError> {
        let rows = sqlx::query_as::<_, PerformanceReviewView>(
            r#"
            SELECT
                r.id,
                r.employee_id,
                e.employee_number,
                e.department,
                e.position,
                p.full_name AS employee_name,
                r.reviewer_id,
                rp.full_name AS reviewer_name,
                r.review_date,
                r.rating,
                r.comments
            FROM performance_reviews r
            INNER JOIN employees e ON e.id = r.employee_id
            LEFT JOIN profiles p ON p.id = e.user_id
            LEFT JOIN profiles rp ON rp.id = r.reviewer_id
            ORDER BY r.review_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn employee_departments(&self) -> Result<Vec<String>, StoreError> {
        let departments = sqlx::query_scalar::<_, String>("SELECT department FROM employees")
            .fetch_all(&self.pool)
            .await?;

        Ok(departments)
    }

    async fn leave_statuses(&self) -> Result<Vec<LeaveStatus>, StoreError> {
        let raw = sqlx::query_scalar::<_, String>("SELECT status FROM leave_requests")
            .fetch_all(&self.pool)
            .await?;

        raw.into_iter()
            .map(|s| {
                LeaveStatus::try_from(s.clone())
                    .map_err(|_| StoreError::Backend(format!("unknown leave status '{s}'")))
            })
            .collect()
    }

    async fn attendance_statuses_since(&self, since: NaiveDate) -> Result<Vec<AttendanceStatus>, StoreError> {
        let raw = sqlx::query_scalar::<_, String>("SELECT status FROM attendance WHERE date >= ?")
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        raw.into_iter()
            .map(|s| {
                AttendanceStatus::try_from(s.clone())
                    .map_err(|_| StoreError::Backend(format!("unknown attendance status '{s}'")))
            })
            .collect()
    }

    async fn review_ratings(&self) -> Result<Vec<Option<u8>>, StoreError> {
        let ratings = sqlx::query_scalar::<_, Option<u8>>("SELECT rating FROM performance_reviews")
            .fetch_all(&self.pool)
            .await?;

        Ok(ratings)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserCredentials>, StoreError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, username, password, role_id
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn touch_last_login(&self, user_id: u64) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn store_refresh_token(&self, token: NewRefreshToken) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(token.user_id)
        .bind(&token.jti)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT id, user_id, revoked
            FROM refresh_tokens
            WHERE jti = ?
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE jti = ?
            AND revoked = FALSE
            "#,
        )
        .bind(jti)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
