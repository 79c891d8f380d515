//! Storage for leave applications and the reference data they point at.

use crate::{
    error::AppError,
    model::{
        employee::Employee,
        leave_application::{LeaveApplication, NewLeaveApplication},
        leave_type::LeaveType,
    },
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlLeaveRepository;

/// Storage abstraction so the leave service can be exercised without a database.
///
/// Implementations must enforce protocol number uniqueness on write and
/// report a clash as [`AppError::DuplicateProtocol`].
#[allow(async_fn_in_trait)]
pub trait LeaveRepository {
    async fn employee(&self, id: u64) -> Result<Option<Employee>, AppError>;

    async fn leave_type(&self, id: u64) -> Result<Option<LeaveType>, AppError>;

    async fn application(&self, id: u64) -> Result<Option<LeaveApplication>, AppError>;

    async fn insert_application(
        &self,
        application: &NewLeaveApplication,
    ) -> Result<LeaveApplication, AppError>;

    /// Persists every mutable column of an existing application.
    async fn save_application(&self, application: &LeaveApplication) -> Result<(), AppError>;

    /// `true` if an application other than `except_id` holds `protocol_number`.
    async fn protocol_number_taken(
        &self,
        protocol_number: &str,
        except_id: u64,
    ) -> Result<bool, AppError>;
}
