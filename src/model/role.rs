use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    #[strum(to_string = "employee", serialize = "regular")]
    Employee = 3,
    DepartmentHead = 4,
}

/// Capabilities a role may hold. Handlers and the leave workflow ask
/// `role.can(..)` rather than comparing role labels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, ToSchema, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    SubmitLeave,
    ViewAllLeave,
    DecideLeave,
    ViewDirectory,
    RecordAttendance,
    ViewAttendance,
    ViewReviews,
    ViewDashboard,
    ViewReports,
}

const EMPLOYEE_PERMISSIONS: &[Permission] = &[
    Permission::SubmitLeave,
    Permission::ViewDirectory,
    Permission::RecordAttendance,
    Permission::ViewDashboard,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::SubmitLeave,
    Permission::ViewAllLeave,
    Permission::DecideLeave,
    Permission::ViewDirectory,
    Permission::RecordAttendance,
    Permission::ViewAttendance,
    Permission::ViewReviews,
    Permission::ViewDashboard,
    Permission::ViewReports,
];

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::DepartmentHead),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Employee => EMPLOYEE_PERMISSIONS,
            Role::DepartmentHead | Role::Hr | Role::Admin => MANAGER_PERMISSIONS,
        }
    }

    pub fn can(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}
