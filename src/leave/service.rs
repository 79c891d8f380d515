use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::calendar::HolidayCalendar;
use super::duration::{self, LeaveDuration};
use super::status::LeaveStatus;
use crate::{
    error::{AppError, FieldError},
    model::{
        leave_application::{LeaveApplication, NewLeaveApplication},
        leave_type::LeaveType,
        role::Role,
    },
    repository::LeaveRepository,
};

/// Who is acting on a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub role: Role,
    /// Present only if the user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl Actor {
    fn owns(&self, application: &LeaveApplication) -> bool {
        self.employee_id == Some(application.employee_id)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LeaveSubmission {
    /// Applicant; defaults to the caller. Only HR/Admin may name someone else.
    #[schema(example = 7)]
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    pub leave_type_id: Option<u64>,
    #[schema(example = "2025-08-04", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2025-08-08", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Flu")]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LeaveChanges {
    #[schema(example = 2)]
    pub leave_type_id: Option<u64>,
    #[schema(example = "2025-08-04", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2025-08-08", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// A review step, mapped onto the status state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAction {
    Receive { protocol_number: Option<String> },
    RequestDocumentation,
    MarkReady,
    Approve,
    Reject { reason: String },
    Cancel,
}

impl LeaveAction {
    pub fn target(&self) -> LeaveStatus {
        match self {
            LeaveAction::Receive { .. } => LeaveStatus::Received,
            LeaveAction::RequestDocumentation => LeaveStatus::AwaitingDocumentation,
            LeaveAction::MarkReady => LeaveStatus::ReadyForApproval,
            LeaveAction::Approve => LeaveStatus::Approved,
            LeaveAction::Reject { .. } => LeaveStatus::Rejected,
            LeaveAction::Cancel => LeaveStatus::Canceled,
        }
    }

    fn permitted(&self, actor: &Actor, application: &LeaveApplication) -> bool {
        match self {
            LeaveAction::Receive { .. }
            | LeaveAction::RequestDocumentation
            | LeaveAction::MarkReady => actor.role.handles_intake(),
            LeaveAction::Approve | LeaveAction::Reject { .. } => actor.role.decides(),
            LeaveAction::Cancel => actor.owns(application) || actor.role.handles_intake(),
        }
    }
}

/// Largest month count the `leave_months_count` column can hold.
const MAX_STORED_MONTHS: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Leave application workflow: validation, duration derivation, review steps.
///
/// Durations are recomputed explicitly whenever dates or the leave type
/// change, never as a side effect of storage.
pub struct LeaveService<'a, R> {
    repository: &'a R,
    calendar: &'a dyn HolidayCalendar,
}

impl<'a, R: LeaveRepository> LeaveService<'a, R> {
    pub fn new(repository: &'a R, calendar: &'a dyn HolidayCalendar) -> Self {
        Self {
            repository,
            calendar,
        }
    }

    #[instrument(skip(self, submission), fields(role = ?actor.role))]
    pub async fn submit(
        &self,
        actor: &Actor,
        submission: LeaveSubmission,
    ) -> Result<LeaveApplication, AppError> {
        if let Some(requested) = submission.employee_id {
            if actor.employee_id != Some(requested) && !actor.role.handles_intake() {
                return Err(AppError::Forbidden {
                    reason: "Only HR can submit leave on behalf of another employee",
                });
            }
        }
        let employee_id = submission.employee_id.or(actor.employee_id);
        if employee_id.is_none() && !actor.role.handles_intake() {
            return Err(AppError::Forbidden {
                reason: "No employee profile",
            });
        }

        let reason = non_empty(submission.reason.as_deref());

        let mut errors = Vec::new();
        if employee_id.is_none() {
            errors.push(FieldError::required("employee_id"));
        }
        if submission.leave_type_id.is_none() {
            errors.push(FieldError::required("leave_type_id"));
        }
        if submission.start_date.is_none() {
            errors.push(FieldError::required("start_date"));
        }
        if submission.end_date.is_none() {
            errors.push(FieldError::required("end_date"));
        }
        if reason.is_none() {
            errors.push(FieldError::required("reason"));
        }

        let (Some(employee_id), Some(leave_type_id), Some(start_date), Some(end_date), Some(reason)) = (
            employee_id,
            submission.leave_type_id,
            submission.start_date,
            submission.end_date,
            reason,
        ) else {
            return Err(AppError::Validation { errors });
        };

        if start_date > end_date {
            return Err(AppError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }

        let employee = self
            .repository
            .employee(employee_id)
            .await?
            .ok_or_else(|| AppError::field("employee_id", "Unknown employee"))?;
        let leave_type = self.leave_type_for(leave_type_id).await?;
        let duration = self.derive_duration(&leave_type, start_date, end_date)?;

        let application = self
            .repository
            .insert_application(&NewLeaveApplication {
                employee_id,
                leave_type_id,
                start_date,
                end_date,
                duration,
                reason,
                status: LeaveStatus::Submitted,
            })
            .await?;

        info!(
            leave_id = application.id,
            employee = %employee.full_name(),
            leave_type = %leave_type.name,
            days = duration.leave_days_count,
            months = %duration.leave_months_count,
            "Leave application submitted"
        );
        Ok(application)
    }

    pub async fn get(&self, actor: &Actor, id: u64) -> Result<LeaveApplication, AppError> {
        let application = self.load(id).await?;
        if !actor.owns(&application) && !actor.role.is_staff() {
            return Err(AppError::Forbidden {
                reason: "Not your leave application",
            });
        }
        Ok(application)
    }

    /// Edits dates, leave type or reason and re-derives both counts.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: u64,
        changes: LeaveChanges,
    ) -> Result<LeaveApplication, AppError> {
        let mut application = self.load(id).await?;

        if application.status.is_terminal() {
            return Err(AppError::Conflict {
                message: format!(
                    "Leave application is {} and can no longer be edited",
                    application.status
                ),
            });
        }
        let owner_may_edit =
            actor.owns(&application) && application.status == LeaveStatus::Submitted;
        if !owner_may_edit && !actor.role.handles_intake() {
            return Err(AppError::Forbidden {
                reason: "Leave application can no longer be edited by the applicant",
            });
        }

        if let Some(reason) = &changes.reason {
            application.reason =
                non_empty(Some(reason.as_str())).ok_or_else(|| AppError::Validation {
                    errors: vec![FieldError::required("reason")],
                })?;
        }
        if let Some(leave_type_id) = changes.leave_type_id {
            application.leave_type_id = leave_type_id;
        }
        if let Some(start_date) = changes.start_date {
            application.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            application.end_date = end_date;
        }

        if application.start_date > application.end_date {
            return Err(AppError::InvalidRange {
                start: application.start_date,
                end: application.end_date,
            });
        }

        let leave_type = self.leave_type_for(application.leave_type_id).await?;
        let duration =
            self.derive_duration(&leave_type, application.start_date, application.end_date)?;
        if duration != application.duration() {
            debug!(leave_id = id, ?duration, "Leave duration recomputed");
        }
        application.apply_duration(duration);

        self.repository.save_application(&application).await?;
        info!(leave_id = id, "Leave application updated");
        Ok(application)
    }

    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        actor: &Actor,
        id: u64,
        action: LeaveAction,
    ) -> Result<LeaveApplication, AppError> {
        let mut application = self.load(id).await?;

        if !action.permitted(actor, &application) {
            return Err(AppError::Forbidden {
                reason: "Not allowed to perform this action",
            });
        }
        let from = application.status;
        let next = from.transition(action.target())?;

        match &action {
            LeaveAction::Reject { reason } => {
                let reason = non_empty(Some(reason.as_str()))
                    .ok_or_else(|| AppError::field("reason", "A rejection reason is required"))?;
                application.rejection_reason = Some(reason);
            }
            LeaveAction::Receive { protocol_number } => {
                // A blank form field means receipt without a number
                if let Some(protocol_number) = non_empty(protocol_number.as_deref()) {
                    let protocol_number = self.check_protocol_number(id, &protocol_number).await?;
                    application.protocol_number = Some(protocol_number);
                }
            }
            _ => {}
        }

        application.status = next;
        self.repository.save_application(&application).await?;

        info!(leave_id = id, %from, to = %next, "Leave application status changed");
        Ok(application)
    }

    #[instrument(skip(self))]
    pub async fn assign_protocol_number(
        &self,
        actor: &Actor,
        id: u64,
        protocol_number: &str,
    ) -> Result<LeaveApplication, AppError> {
        if !actor.role.handles_intake() {
            return Err(AppError::Forbidden {
                reason: "HR/Admin only",
            });
        }
        let mut application = self.load(id).await?;
        let protocol_number = self.check_protocol_number(id, protocol_number).await?;

        application.protocol_number = Some(protocol_number);
        self.repository.save_application(&application).await?;

        info!(leave_id = id, protocol_number = ?application.protocol_number, "Protocol number assigned");
        Ok(application)
    }

    /// Duration a leave would have, without storing anything.
    pub async fn preview(
        &self,
        leave_type_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveDuration, AppError> {
        if start_date > end_date {
            return Err(AppError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        let leave_type = self.leave_type_for(leave_type_id).await?;
        duration::compute(start_date, end_date, leave_type.is_long_term, self.calendar)
    }

    async fn load(&self, id: u64) -> Result<LeaveApplication, AppError> {
        self.repository
            .application(id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "leave application",
            })
    }

    async fn leave_type_for(&self, id: u64) -> Result<LeaveType, AppError> {
        self.repository
            .leave_type(id)
            .await?
            .ok_or_else(|| AppError::field("leave_type_id", "Unknown leave type"))
    }

    async fn check_protocol_number(&self, id: u64, protocol_number: &str) -> Result<String, AppError> {
        let protocol_number = non_empty(Some(protocol_number))
            .ok_or_else(|| AppError::Validation {
                errors: vec![FieldError::required("protocol_number")],
            })?;
        if self
            .repository
            .protocol_number_taken(&protocol_number, id)
            .await?
        {
            return Err(AppError::DuplicateProtocol { protocol_number });
        }
        Ok(protocol_number)
    }

    /// Computes the duration and checks it against the type's allowance.
    fn derive_duration(
        &self,
        leave_type: &LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<LeaveDuration, AppError> {
        let duration =
            duration::compute(start_date, end_date, leave_type.is_long_term, self.calendar)?;

        if leave_type.is_long_term {
            if duration.leave_months_count > MAX_STORED_MONTHS {
                return Err(AppError::field(
                    "end_date",
                    format!(
                        "A single leave cannot exceed {} months, requested {}",
                        MAX_STORED_MONTHS, duration.leave_months_count
                    ),
                ));
            }
            if leave_type.max_months > 0
                && duration.leave_months_count > Decimal::from(leave_type.max_months)
            {
                return Err(AppError::field(
                    "end_date",
                    format!(
                        "{} allows at most {} months, requested {}",
                        leave_type.name, leave_type.max_months, duration.leave_months_count
                    ),
                ));
            }
        } else if leave_type.max_days > 0 && duration.leave_days_count > leave_type.max_days {
            return Err(AppError::field(
                "end_date",
                format!(
                    "{} allows at most {} working days, requested {}",
                    leave_type.name, leave_type.max_days, duration.leave_days_count
                ),
            ));
        }
        Ok(duration)
    }
}
