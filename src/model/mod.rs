pub mod attendance;
pub mod employee;
pub mod leave_request;
pub mod performance_review;
pub mod role;
