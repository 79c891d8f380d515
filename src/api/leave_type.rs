use crate::{
    api::MessageResponse,
    auth::auth::AuthUser,
    error::AppError,
    model::leave_type::{LeaveType, validate_leave_type},
    utils::db_utils::{FilterValue, WhereClause, paginate},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

const LEAVE_TYPE_COLUMNS: &str = "id, name, max_days, max_months, is_long_term";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Maternity")]
    pub name: String,
    #[serde(default)]
    #[schema(example = 0)]
    pub max_days: u32,
    #[serde(default)]
    #[schema(example = 9)]
    pub max_months: u32,
    #[serde(default)]
    #[schema(example = true)]
    pub is_long_term: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLeaveType {
    pub name: Option<String>,
    pub max_days: Option<u32>,
    pub max_months: Option<u32>,
    pub is_long_term: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveTypeQuery {
    /// Search by name
    pub search: Option<String>,
    pub is_long_term: Option<bool>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveTypeListResponse {
    pub data: Vec<LeaveType>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 4)]
    pub total: i64,
}

async fn fetch_leave_type(pool: &MySqlPool, id: u64) -> Result<LeaveType, AppError> {
    let sql = format!("SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE id = ?");
    sqlx::query_as::<_, LeaveType>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound {
            entity: "leave type",
        })
}

/// Create Leave Type
#[utoipa::path(
    post,
    path = "/api/v1/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();
    validate_leave_type(&payload.name, payload.max_months, payload.is_long_term)?;

    let name = payload.name.trim().to_string();
    let result = sqlx::query(
        r#"
        INSERT INTO leave_types (name, max_days, max_months, is_long_term)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&name)
    .bind(payload.max_days)
    .bind(payload.max_months)
    .bind(payload.is_long_term)
    .execute(pool.get_ref())
    .await
    .map_err(|e| AppError::from_write(e, "A leave type with this name already exists", "name"))?;

    let leave_type = LeaveType {
        id: result.last_insert_id(),
        name,
        max_days: payload.max_days,
        max_months: payload.max_months,
        is_long_term: payload.is_long_term,
    };
    info!(leave_type_id = leave_type.id, name = %leave_type.name, "Leave type created");

    Ok(HttpResponse::Created().json(leave_type))
}

/// List Leave Types
#[utoipa::path(
    get,
    path = "/api/v1/leave-types",
    params(LeaveTypeQuery),
    responses(
        (status = 200, description = "Paginated leave type list", body = LeaveTypeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveTypeQuery>,
) -> actix_web::Result<impl Responder> {
    let (page, per_page, offset) = paginate(query.page, query.per_page);

    let mut filter = WhereClause::default();
    if let Some(is_long_term) = query.is_long_term {
        filter.and("is_long_term = ?", FilterValue::Bool(is_long_term));
    }
    if let Some(search) = query.search.as_deref() {
        filter.search(&["name"], search);
    }
    let where_sql = filter.sql();

    let count_sql = format!("SELECT COUNT(*) FROM leave_types{where_sql}");
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    let data_sql = format!(
        "SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types{where_sql} ORDER BY name LIMIT ? OFFSET ?"
    );
    debug!(sql = %data_sql, page, per_page, "Fetching leave types");
    let data = filter
        .bind_as(sqlx::query_as::<_, LeaveType>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(LeaveTypeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Leave Type by ID
#[utoipa::path(
    get,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "Leave type ID")),
    responses(
        (status = 200, description = "Leave type found", body = LeaveType),
        (status = 404, description = "Leave type not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn get_leave_type(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_type = fetch_leave_type(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave_type))
}

/// Update Leave Type
///
/// Existing applications keep their stored counts until they are next edited.
#[utoipa::path(
    put,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "Leave type ID")),
    request_body = UpdateLeaveType,
    responses(
        (status = 200, description = "Leave type updated", body = LeaveType),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Leave type not found", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn update_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();
    let changes = payload.into_inner();

    let mut leave_type = fetch_leave_type(pool.get_ref(), id).await?;
    if let Some(name) = changes.name {
        leave_type.name = name.trim().to_string();
    }
    if let Some(max_days) = changes.max_days {
        leave_type.max_days = max_days;
    }
    if let Some(max_months) = changes.max_months {
        leave_type.max_months = max_months;
    }
    if let Some(is_long_term) = changes.is_long_term {
        leave_type.is_long_term = is_long_term;
    }
    validate_leave_type(&leave_type.name, leave_type.max_months, leave_type.is_long_term)?;

    sqlx::query(
        r#"
        UPDATE leave_types
        SET name = ?, max_days = ?, max_months = ?, is_long_term = ?
        WHERE id = ?
        "#,
    )
    .bind(&leave_type.name)
    .bind(leave_type.max_days)
    .bind(leave_type.max_months)
    .bind(leave_type.is_long_term)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| AppError::from_write(e, "A leave type with this name already exists", "name"))?;

    info!(leave_type_id = id, "Leave type updated");
    Ok(HttpResponse::Ok().json(leave_type))
}

/// Delete Leave Type
#[utoipa::path(
    delete,
    path = "/api/v1/leave-types/{leave_type_id}",
    params(("leave_type_id" = u64, Path, description = "Leave type ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Leave type not found", body = ErrorResponse),
        (status = 409, description = "Leave type is used by applications", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Type"
)]
pub async fn delete_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM leave_types WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| AppError::from_delete(e, "leave type"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound {
            entity: "leave type",
        }
        .into());
    }

    info!(leave_type_id = id, "Leave type deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}
