use sqlx::MySqlPool;

use super::LeaveRepository;
use crate::{
    error::AppError,
    model::{
        employee::Employee,
        leave_application::{LeaveApplication, LeaveApplicationRow, NewLeaveApplication},
        leave_type::LeaveType,
    },
};

pub const EMPLOYEE_COLUMNS: &str = r#"
    e.id, e.user_id, e.organization_id, u.first_name, u.last_name,
    e.fathers_name, e.am, e.afm, e.hire_date, e.specialty,
    e.telephone, e.mobile, e.is_hr, e.is_director
"#;

const APPLICATION_COLUMNS: &str = r#"
    id, employee_id, leave_type_id, start_date, end_date,
    leave_days_count, leave_months_count, reason, status,
    rejection_reason, protocol_number, created_at, updated_at
"#;

pub struct MySqlLeaveRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> MySqlLeaveRepository<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }
}

/// A unique index violation on `leave_applications` can only come from
/// the protocol number.
fn map_protocol_clash(e: sqlx::Error, protocol_number: Option<&str>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::DuplicateProtocol {
                protocol_number: protocol_number.unwrap_or_default().to_string(),
            };
        }
    }
    AppError::Database(e)
}

impl LeaveRepository for MySqlLeaveRepository<'_> {
    async fn employee(&self, id: u64) -> Result<Option<Employee>, AppError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees e JOIN users u ON u.id = e.user_id WHERE e.id = ?"
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(employee)
    }

    async fn leave_type(&self, id: u64) -> Result<Option<LeaveType>, AppError> {
        let leave_type = sqlx::query_as::<_, LeaveType>(
            r#"
            SELECT id, name, max_days, max_months, is_long_term
            FROM leave_types
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(leave_type)
    }

    async fn application(&self, id: u64) -> Result<Option<LeaveApplication>, AppError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM leave_applications WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(LeaveApplication::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn insert_application(
        &self,
        application: &NewLeaveApplication,
    ) -> Result<LeaveApplication, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_applications
                (employee_id, leave_type_id, start_date, end_date,
                 leave_days_count, leave_months_count, reason, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(application.employee_id)
        .bind(application.leave_type_id)
        .bind(application.start_date)
        .bind(application.end_date)
        .bind(application.duration.leave_days_count)
        .bind(application.duration.leave_months_count)
        .bind(&application.reason)
        .bind(application.status.as_ref())
        .execute(self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Leave application already exists", "employee"))?;

        let id = result.last_insert_id();
        self.application(id)
            .await?
            .ok_or(AppError::NotFound { entity: "leave application" })
    }

    async fn save_application(&self, application: &LeaveApplication) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_applications
            SET leave_type_id = ?, start_date = ?, end_date = ?,
                leave_days_count = ?, leave_months_count = ?, reason = ?,
                status = ?, rejection_reason = ?, protocol_number = ?
            WHERE id = ?
            "#,
        )
        .bind(application.leave_type_id)
        .bind(application.start_date)
        .bind(application.end_date)
        .bind(application.leave_days_count)
        .bind(application.leave_months_count)
        .bind(&application.reason)
        .bind(application.status.as_ref())
        .bind(&application.rejection_reason)
        .bind(&application.protocol_number)
        .bind(application.id)
        .execute(self.pool)
        .await
        .map_err(|e| map_protocol_clash(e, application.protocol_number.as_deref()))?;

        if result.rows_affected() == 0 {
            // MySQL reports 0 for unchanged rows too; only a missing row is an error.
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT EXISTS(SELECT 1 FROM leave_applications WHERE id = ?)",
            )
            .bind(application.id)
            .fetch_one(self.pool)
            .await?;
            if exists == 0 {
                return Err(AppError::NotFound { entity: "leave application" });
            }
        }
        Ok(())
    }

    async fn protocol_number_taken(
        &self,
        protocol_number: &str,
        except_id: u64,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM leave_applications WHERE protocol_number = ? AND id <> ?)",
        )
        .bind(protocol_number)
        .bind(except_id)
        .fetch_one(self.pool)
        .await?;
        Ok(taken != 0)
    }
}
