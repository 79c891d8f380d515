pub mod employee;
pub mod leave_application;
pub mod leave_type;
pub mod organization;
pub mod role;
