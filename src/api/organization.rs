use crate::{
    api::MessageResponse,
    auth::auth::AuthUser,
    error::{AppError, FieldError},
    model::organization::Organization,
    utils::db_utils::{
        ColumnKind, WhereClause, build_update_sql, execute_update, paginate, row_exists,
    },
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const ORGANIZATION_COLUMNS: &str =
    "id, name, address, director_name, contact_email, contact_phone";

const UPDATABLE: &[(&str, ColumnKind)] = &[
    ("name", ColumnKind::Text),
    ("address", ColumnKind::Text),
    ("director_name", ColumnKind::OptionalText),
    ("contact_email", ColumnKind::OptionalText),
    ("contact_phone", ColumnKind::OptionalText),
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrganization {
    #[schema(example = "1st High School of Athens")]
    pub name: String,
    #[schema(example = "Panepistimiou 10, Athens")]
    pub address: String,
    #[serde(default)]
    pub director_name: String,
    #[serde(default)]
    #[schema(format = "email")]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrganizationQuery {
    /// Search by name or director
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct OrganizationListResponse {
    pub data: Vec<Organization>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 12)]
    pub total: i64,
}

async fn fetch_organization(pool: &MySqlPool, id: u64) -> Result<Organization, AppError> {
    let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?");
    sqlx::query_as::<_, Organization>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound {
            entity: "organization",
        })
}

/// Create Organization
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganization,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
pub async fn create_organization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOrganization>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::required("name"));
    }
    if payload.address.trim().is_empty() {
        errors.push(FieldError::required("address"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation { errors }.into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO organizations (name, address, director_name, contact_email, contact_phone)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.address.trim())
    .bind(payload.director_name.trim())
    .bind(payload.contact_email.trim())
    .bind(payload.contact_phone.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        AppError::from_write(e, "An organization with this name already exists", "name")
    })?;

    let organization = fetch_organization(pool.get_ref(), result.last_insert_id()).await?;
    info!(organization_id = organization.id, "Organization created");
    Ok(HttpResponse::Created().json(organization))
}

/// List Organizations
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    params(OrganizationQuery),
    responses(
        (status = 200, description = "Paginated organization list", body = OrganizationListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
pub async fn list_organizations(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OrganizationQuery>,
) -> actix_web::Result<impl Responder> {
    let (page, per_page, offset) = paginate(query.page, query.per_page);

    let mut filter = WhereClause::default();
    if let Some(search) = query.search.as_deref() {
        filter.search(&["name", "director_name"], search);
    }
    let where_sql = filter.sql();

    let count_sql = format!("SELECT COUNT(*) FROM organizations{where_sql}");
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    let data_sql = format!(
        "SELECT {ORGANIZATION_COLUMNS} FROM organizations{where_sql} ORDER BY name LIMIT ? OFFSET ?"
    );
    let data = filter
        .bind_as(sqlx::query_as::<_, Organization>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(OrganizationListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Organization by ID
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{organization_id}",
    params(("organization_id" = u64, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization found", body = Organization),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
pub async fn get_organization(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let organization = fetch_organization(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(organization))
}

/// Update Organization
///
/// Accepts any subset of `name`, `address`, `director_name`, `contact_email`
/// and `contact_phone`.
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{organization_id}",
    params(("organization_id" = u64, Path, description = "Organization ID")),
    request_body(content = Object, description = "Fields to change"),
    responses(
        (status = 200, description = "Organization updated", body = Organization),
        (status = 400, description = "Unknown field or invalid value", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
pub async fn update_organization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let organization_id = path.into_inner();

    let update = build_update_sql("organizations", &body, UPDATABLE, organization_id)?;
    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        AppError::from_write(e, "An organization with this name already exists", "name")
    })?;

    if affected == 0
        && !row_exists(pool.get_ref(), "organizations", organization_id)
            .await
            .map_err(AppError::from)?
    {
        return Err(AppError::NotFound {
            entity: "organization",
        }
        .into());
    }

    info!(organization_id, "Organization updated");
    let organization = fetch_organization(pool.get_ref(), organization_id).await?;
    Ok(HttpResponse::Ok().json(organization))
}

/// Delete Organization
///
/// Employees of the organization are kept with no organization.
#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{organization_id}",
    params(("organization_id" = u64, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
pub async fn delete_organization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let organization_id = path.into_inner();

    let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
        .bind(organization_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| AppError::from_delete(e, "organization"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound {
            entity: "organization",
        }
        .into());
    }

    info!(organization_id, "Organization deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}
