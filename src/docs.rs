use crate::api::{
    MessageResponse,
    employee::{CreateEmployee, EmployeeListResponse},
    leave_application::{
        AssignProtocol, LeaveListResponse, LeaveSummary, ReceiveLeave, RejectLeave,
    },
    leave_type::{CreateLeaveType, LeaveTypeListResponse, UpdateLeaveType},
    organization::{CreateOrganization, OrganizationListResponse},
};
use crate::error::{ErrorResponse, FieldError};
use crate::leave::{
    duration::LeaveDuration,
    service::{LeaveChanges, LeaveSubmission},
    status::LeaveStatus,
};
use crate::model::{
    employee::Employee, leave_application::LeaveApplication, leave_type::LeaveType,
    organization::Organization,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

Employees submit leave applications; HR receives them, assigns registry
protocol numbers and requests documentation; directors approve or reject.

### Duration
- **Short-term** leave types count working days, excluding weekends and
  public holidays, both ends inclusive.
- **Long-term** leave types count months: elapsed days / 30.44, two decimals.

Counts are derived on every submit or edit and are read-only.

### Review
`Submitted → Received → (Awaiting_Documentation) → Ready_for_Approval → Approved | Rejected`,
and any open application can be `Canceled`.

### Security
All `/api/v1` endpoints require a **JWT Bearer** access token issued by the
identity service.
"#,
    ),
    paths(
        crate::api::health,

        crate::api::leave_application::submit_leave,
        crate::api::leave_application::list_leaves,
        crate::api::leave_application::my_leaves,
        crate::api::leave_application::leave_duration,
        crate::api::leave_application::get_leave,
        crate::api::leave_application::update_leave,
        crate::api::leave_application::receive_leave,
        crate::api::leave_application::request_documents,
        crate::api::leave_application::mark_ready,
        crate::api::leave_application::approve_leave,
        crate::api::leave_application::reject_leave,
        crate::api::leave_application::cancel_leave,
        crate::api::leave_application::assign_protocol,

        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::list_leave_types,
        crate::api::leave_type::get_leave_type,
        crate::api::leave_type::update_leave_type,
        crate::api::leave_type::delete_leave_type,

        crate::api::organization::create_organization,
        crate::api::organization::list_organizations,
        crate::api::organization::get_organization,
        crate::api::organization::update_organization,
        crate::api::organization::delete_organization,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            MessageResponse,
            ErrorResponse,
            FieldError,
            LeaveStatus,
            LeaveDuration,
            LeaveApplication,
            LeaveSubmission,
            LeaveChanges,
            LeaveSummary,
            LeaveListResponse,
            ReceiveLeave,
            RejectLeave,
            AssignProtocol,
            LeaveType,
            CreateLeaveType,
            UpdateLeaveType,
            LeaveTypeListResponse,
            Organization,
            CreateOrganization,
            OrganizationListResponse,
            Employee,
            CreateEmployee,
            EmployeeListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave application lifecycle"),
        (name = "Leave Type", description = "Leave type management"),
        (name = "Organization", description = "Organization management"),
        (name = "Employee", description = "Employee management"),
        (name = "Health", description = "Service status"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_leave_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/leave/{leave_id}/approve"));
        assert!(doc.paths.paths.contains_key("/health"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("LeaveApplication"));
    }
}
