use crate::{
    api::MessageResponse,
    auth::auth::AuthUser,
    error::{AppError, FieldError},
    model::employee::Employee,
    repository::mysql::EMPLOYEE_COLUMNS,
    utils::db_utils::{
        ColumnKind, FilterValue, WhereClause, build_update_sql, execute_update, paginate,
        row_exists,
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

const EMPLOYEE_CONFLICT: &str = "An employee with this AM, AFM or user account already exists";

const UPDATABLE: &[(&str, ColumnKind)] = &[
    ("organization_id", ColumnKind::NullableId),
    ("fathers_name", ColumnKind::Text),
    ("am", ColumnKind::Text),
    ("afm", ColumnKind::Text),
    ("hire_date", ColumnKind::Date),
    ("specialty", ColumnKind::Text),
    ("telephone", ColumnKind::OptionalText),
    ("mobile", ColumnKind::OptionalText),
    ("is_hr", ColumnKind::Bool),
    ("is_director", ColumnKind::Bool),
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployee {
    /// Account provisioned by the identity service
    #[schema(example = 12)]
    pub user_id: u64,
    #[schema(example = 3)]
    pub organization_id: Option<u64>,
    #[schema(example = "Ioannis")]
    pub fathers_name: String,
    #[schema(example = "612345")]
    pub am: String,
    #[schema(example = "123456789")]
    pub afm: String,
    #[schema(example = "2015-09-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[schema(example = "PE03")]
    pub specialty: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub is_hr: bool,
    #[serde(default)]
    pub is_director: bool,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), AppError> {
        let errors: Vec<FieldError> = [
            ("fathers_name", &self.fathers_name),
            ("am", &self.am),
            ("afm", &self.afm),
            ("specialty", &self.specialty),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldError::required(field))
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation { errors })
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    pub organization_id: Option<u64>,
    pub is_hr: Option<bool>,
    pub is_director: Option<bool>,
    /// Search by name, AM, AFM or specialty
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

async fn fetch_employee(pool: &MySqlPool, id: u64) -> Result<Employee, AppError> {
    let sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees e JOIN users u ON u.id = e.user_id WHERE e.id = ?"
    );
    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound { entity: "employee" })
}

async fn check_organization(pool: &MySqlPool, organization_id: Option<u64>) -> Result<(), AppError> {
    if let Some(id) = organization_id {
        if !row_exists(pool, "organizations", id).await? {
            return Err(AppError::field("organization_id", "Unknown organization"));
        }
    }
    Ok(())
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "AM, AFM or user already linked", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();
    payload.validate()?;
    check_organization(pool.get_ref(), payload.organization_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (user_id, organization_id, fathers_name, am, afm, hire_date,
             specialty, telephone, mobile, is_hr, is_director)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.organization_id)
    .bind(payload.fathers_name.trim())
    .bind(payload.am.trim())
    .bind(payload.afm.trim())
    .bind(payload.hire_date)
    .bind(payload.specialty.trim())
    .bind(payload.telephone.trim())
    .bind(payload.mobile.trim())
    .bind(payload.is_hr)
    .bind(payload.is_director)
    .execute(pool.get_ref())
    .await
    .map_err(|e| AppError::from_write(e, EMPLOYEE_CONFLICT, "user_id"))?;

    let employee = fetch_employee(pool.get_ref(), result.last_insert_id()).await?;
    info!(employee_id = employee.id, name = %employee.full_name(), "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff()?;
    let (page, per_page, offset) = paginate(query.page, query.per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut filter = WhereClause::default();
    if let Some(organization_id) = query.organization_id {
        filter.and("e.organization_id = ?", FilterValue::U64(organization_id));
    }
    if let Some(is_hr) = query.is_hr {
        filter.and("e.is_hr = ?", FilterValue::Bool(is_hr));
    }
    if let Some(is_director) = query.is_director {
        filter.and("e.is_director = ?", FilterValue::Bool(is_director));
    }
    if let Some(search) = query.search.as_deref() {
        filter.search(
            &["u.first_name", "u.last_name", "e.am", "e.afm", "e.specialty"],
            search,
        );
    }
    let where_sql = filter.sql();

    // ---------- total count ----------
    let count_sql = format!(
        "SELECT COUNT(*) FROM employees e JOIN users u ON u.id = e.user_id{where_sql}"
    );
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees e JOIN users u ON u.id = e.user_id{where_sql} \
         ORDER BY u.last_name, u.first_name LIMIT ? OFFSET ?"
    );
    debug!(sql = %data_sql, args = ?filter.args(), page, per_page, "Fetching employees");

    let data = filter
        .bind_as(sqlx::query_as::<_, Employee>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    if auth.employee_id != Some(employee_id) {
        auth.require_staff()?;
    }

    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
///
/// Accepts any subset of the profile columns; names come from the user
/// account and cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body(content = Object, description = "Fields to change"),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Unknown field or invalid value", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
        (status = 409, description = "AM or AFM already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, UPDATABLE, employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| AppError::from_write(e, EMPLOYEE_CONFLICT, "organization_id"))?;

    if affected == 0
        && !row_exists(pool.get_ref(), "employees", employee_id)
            .await
            .map_err(AppError::from)?
    {
        return Err(AppError::NotFound { entity: "employee" }.into());
    }

    info!(employee_id, "Employee updated");
    let employee = fetch_employee(pool.get_ref(), employee_id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
///
/// Their leave applications are deleted with them.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| AppError::from_delete(e, "employee"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound { entity: "employee" }.into());
    }

    info!(employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateEmployee {
        CreateEmployee {
            user_id: 12,
            organization_id: None,
            fathers_name: "Ioannis".into(),
            am: "612345".into(),
            afm: "123456789".into(),
            hire_date: NaiveDate::from_ymd_opt(2015, 9, 1).unwrap(),
            specialty: "PE03".into(),
            telephone: String::new(),
            mobile: String::new(),
            is_hr: false,
            is_director: false,
        }
    }

    #[test]
    fn complete_payload_is_valid() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn blank_identifiers_are_reported() {
        let mut p = payload();
        p.am = " ".into();
        p.specialty = String::new();
        match p.validate() {
            Err(AppError::Validation { errors }) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["am", "specialty"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
