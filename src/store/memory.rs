use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::{LeaveQuery, RecordStore, StoreError};
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::employee::{Employee, EmployeeView};
use crate::model::leave_request::{Decision, LeaveRequest, LeaveRequestView, LeaveStatus, NewLeaveRequest};
use crate::model::performance_review::PerformanceReviewView;
use crate::model::role::Role;
use crate::models::{NewRefreshToken, RefreshTokenRecord, UserCredentials};

pub const ADMIN_USER: u64 = 1;
pub const HR_USER: u64 = 2;
pub const REGULAR_USER: u64 = 3;
pub const HEAD_USER: u64 = 4;
/// Has a login but no employee record.
pub const UNLINKED_USER: u64 = 5;

pub const REGULAR_EMPLOYEE: u64 = 103;
pub const HEAD_EMPLOYEE: u64 = 104;
pub const HR_EMPLOYEE: u64 = 102;

struct Profile {
    id: u64,
    full_name: String,
    email: String,
}

struct EmployeeRow {
    employee: Employee,
    created_at: DateTime<Utc>,
}

struct AttendanceRow {
    id: u64,
    employee_id: u64,
    date: NaiveDate,
    check_in_time: Option<NaiveTime>,
    check_out_time: Option<NaiveTime>,
    status: AttendanceStatus,
}

struct ReviewRow {
    id: u64,
    employee_id: u64,
    reviewer_id: Option<u64>,
    review_date: NaiveDate,
    rating: Option<u8>,
    comments: Option<String>,
}

struct TokenRow {
    id: u64,
    user_id: u64,
    jti: String,
    revoked: bool,
}

#[derive(Default)]
struct State {
    profiles: Vec<Profile>,
    users: Vec<UserCredentials>,
    employees: Vec<EmployeeRow>,
    leave: Vec<LeaveRequest>,
    attendance: Vec<AttendanceRow>,
    reviews: Vec<ReviewRow>,
    tokens: Vec<TokenRow>,
    next_id: u64,
    fail_writes: bool,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn guard_write(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        Ok(())
    }

    fn profile(&self, id: u64) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    fn employee(&self, id: u64) -> Option<&EmployeeRow> {
        self.employees.iter().find(|e| e.employee.id == id)
    }

    fn employee_view(&self, row: &EmployeeRow) -> EmployeeView {
        let e = &row.employee;
        let profile = self.profile(e.user_id);
        EmployeeView {
            id: e.id,
            user_id: e.user_id,
            employee_number: e.employee_number.clone(),
            department: e.department.clone(),
            position: e.position.clone(),
            hire_date: e.hire_date,
            full_name: profile.map(|p| p.full_name.clone()),
            email: profile.map(|p| p.email.clone()),
            created_at: row.created_at,
        }
    }

    fn leave_view(&self, request: &LeaveRequest) -> Option<LeaveRequestView> {
        let employee = &self.employee(request.employee_id)?.employee;
        Some(LeaveRequestView {
            id: request.id,
            employee_id: request.employee_id,
            employee_number: employee.employee_number.clone(),
            department: employee.department.clone(),
            employee_name: self.profile(employee.user_id).map(|p| p.full_name.clone()),
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason.clone(),
            status: request.status,
            approved_by: request.approved_by,
            approver_name: request
                .approved_by
                .and_then(|id| self.profile(id))
                .map(|p| p.full_name.clone()),
            approved_at: request.approved_at,
            created_at: request.created_at,
        })
    }
}

/// In-process `RecordStore` with the same ordering and guard semantics as
/// the MySQL store.
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    /// Five identities (admin, hr, regular, department head, unlinked) and
    /// employee records for hr, regular and department head.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.add_user(ADMIN_USER, "ada", "!", Role::Admin, "Ada Admin");
        store.add_user(HR_USER, "hana", "!", Role::Hr, "Hana Hr");
        store.add_user(REGULAR_USER, "eli", "!", Role::Employee, "Eli Regular");
        store.add_user(HEAD_USER, "dana", "!", Role::DepartmentHead, "Dana Head");
        store.add_user(UNLINKED_USER, "uma", "!", Role::Employee, "Uma Unlinked");

        store.add_employee(HR_EMPLOYEE, HR_USER, "EMP-002", "People", "HR Partner", 1);
        store.add_employee(REGULAR_EMPLOYEE, REGULAR_USER, "EMP-003", "Engineering", "Developer", 2);
        store.add_employee(HEAD_EMPLOYEE, HEAD_USER, "EMP-004", "Engineering", "Head of Engineering", 3);
        store
    }

    pub fn add_user(&self, id: u64, username: &str, password_hash: &str, role: Role, full_name: &str) {
        let mut state = self.state.lock().unwrap();
        state.users.push(UserCredentials {
            id,
            username: username.to_string(),
            password: password_hash.to_string(),
            role_id: role.id(),
        });
        state.profiles.push(Profile {
            id,
            full_name: full_name.to_string(),
            email: format!("{username}@stafftrack.test"),
        });
    }

    /// `created_day` orders the directory (larger is newer).
    pub fn add_employee(
        &self,
        id: u64,
        user_id: u64,
        number: &str,
        department: &str,
        position: &str,
        created_day: i64,
    ) {
        let mut state = self.state.lock().unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(created_day);
        state.employees.push(EmployeeRow {
            employee: Employee {
                id,
                user_id,
                employee_number: number.to_string(),
                department: department.to_string(),
                position: position.to_string(),
                hire_date: created_at.date_naive(),
            },
            created_at,
        });
    }

    pub fn add_leave(&self, request: LeaveRequest) {
        self.state.lock().unwrap().leave.push(request);
    }

    pub fn add_attendance(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in_time: Option<NaiveTime>,
        status: AttendanceStatus,
    ) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.attendance.push(AttendanceRow {
            id,
            employee_id,
            date,
            check_in_time,
            check_out_time: None,
            status,
        });
    }

    pub fn add_review(
        &self,
        employee_id: u64,
        reviewer_id: Option<u64>,
        review_date: NaiveDate,
        rating: Option<u8>,
    ) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.reviews.push(ReviewRow {
            id,
            employee_id,
            reviewer_id,
            review_date,
            rating,
            comments: None,
        });
    }

    /// Every subsequent write fails with `StoreError::Backend`.
    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn leave_count(&self) -> usize {
        self.state.lock().unwrap().leave.len()
    }

    pub fn leave(&self, id: u64) -> Option<LeaveRequest> {
        self.state
            .lock()
            .unwrap()
            .leave
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn token_revoked(&self, jti: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .find(|t| t.jti == jti)
            .map(|t| t.revoked)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_employee_by_user(&self, user_id: u64) -> Result<Option<Employee>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .employees
            .iter()
            .find(|e| e.employee.user_id == user_id)
            .map(|e| e.employee.clone()))
    }

    async fn get_employee(&self, id: u64) -> Result<Option<EmployeeView>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.employee(id).map(|row| state.employee_view(row)))
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeView>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<&EmployeeRow> = state.employees.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.into_iter().map(|row| state.employee_view(row)).collect())
    }

    async fn insert_leave(&self, request: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        let id = state.next_id();
        let created = LeaveRequest {
            id,
            employee_id: request.employee_id,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: LeaveStatus::Pending,
            approved_by: None,
            approved_at: None,
            created_at: request.created_at,
        };
        state.leave.push(created.clone());
        Ok(created)
    }

    async fn find_leave(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        Ok(self.leave(id))
    }

    async fn decide_leave(
        &self,
        id: u64,
        decision: Decision,
        approver: u64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        match state.leave.iter_mut().find(|r| r.id == id && r.is_pending()) {
            Some(request) => {
                request.status = decision.status();
                request.approved_by = Some(approver);
                request.approved_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_leave_view(&self, id: u64) -> Result<Option<LeaveRequestView>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .leave
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| state.leave_view(r)))
    }

    async fn list_leave(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequestView>, i64), StoreError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<LeaveRequestView> = state
            .leave
            .iter()
            .filter(|r| query.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .filter_map(|r| state.leave_view(r))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceView>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<AttendanceView> = state
            .attendance
            .iter()
            .filter(|a| a.date == date)
            .filter_map(|a| {
                let employee = &state.employee(a.employee_id)?.employee;
                Some(AttendanceView {
                    id: a.id,
                    employee_id: a.employee_id,
                    employee_number: employee.employee_number.clone(),
                    department: employee.department.clone(),
                    position: employee.position.clone(),
                    full_name: state.profile(employee.user_id).map(|p| p.full_name.clone()),
                    date: a.date,
                    check_in_time: a.check_in_time,
                    check_out_time: a.check_out_time,
                    status: a.status,
                })
            })
            .collect();
        // MySQL sorts NULL first in ascending order; Option does the same.
        rows.sort_by(|a, b| a.check_in_time.cmp(&b.check_in_time));
        Ok(rows)
    }

    async fn check_in(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        if state
            .attendance
            .iter()
            .any(|a| a.employee_id == employee_id && a.date == date)
        {
            return Err(StoreError::Duplicate);
        }
        let id = state.next_id();
        state.attendance.push(AttendanceRow {
            id,
            employee_id,
            date,
            check_in_time: Some(time),
            check_out_time: None,
            status: AttendanceStatus::Present,
        });
        Ok(())
    }

    async fn check_out(&self, employee_id: u64, date: NaiveDate, time: NaiveTime) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        match state.attendance.iter_mut().find(|a| {
            a.employee_id == employee_id
                && a.date == date
                && a.check_in_time.is_some()
                && a.check_out_time.is_none()
        }) {
            Some(row) => {
                row.check_out_time = Some(time);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_reviews(&self) -> Result<Vec<PerformanceReviewView>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<PerformanceReviewView> = state
            .reviews
            .iter()
            .filter_map(|r| {
                let employee = &state.employee(r.employee_id)?.employee;
                Some(PerformanceReviewView {
                    id: r.id,
                    employee_id: r.employee_id,
                    employee_number: employee.employee_number.clone(),
                    department: employee.department.clone(),
                    position: employee.position.clone(),
                    employee_name: state.profile(employee.user_id).map(|p| p.full_name.clone()),
                    reviewer_id: r.reviewer_id,
                    reviewer_name: r
                        .reviewer_id
                        .and_then(|id| state.profile(id))
                        .map(|p| p.full_name.clone()),
                    review_date: r.review_date,
                    rating: r.rating,
                    comments: r.comments.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.review_date.cmp(&a.review_date));
        Ok(rows)
    }

    async fn employee_departments(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .employees
            .iter()
            .map(|e| e.employee.department.clone())
            .collect())
    }

    async fn leave_statuses(&self) -> Result<Vec<LeaveStatus>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.leave.iter().map(|r| r.status).collect())
    }

    async fn attendance_statuses_since(&self, since: NaiveDate) -> Result<Vec<AttendanceStatus>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .attendance
            .iter()
            .filter(|a| a.date >= since)
            .map(|a| a.status)
            .collect())
    }

    async fn review_ratings(&self) -> Result<Vec<Option<u8>>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.reviews.iter().map(|r| r.rating).collect())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserCredentials>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn touch_last_login(&self, _user_id: u64) -> Result<(), StoreError> {
        self.state.lock().unwrap().guard_write()
    }

    async fn store_refresh_token(&self, token: NewRefreshToken) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        let id = state.next_id();
        state.tokens.push(TokenRow {
            id,
            user_id: token.user_id,
            jti: token.jti,
            revoked: false,
        });
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.tokens.iter().find(|t| t.jti == jti).map(|t| RefreshTokenRecord {
            id: t.id,
            user_id: t.user_id,
            revoked: t.revoked,
        }))
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.guard_write()?;
        match state.tokens.iter_mut().find(|t| t.jti == jti && !t.revoked) {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
