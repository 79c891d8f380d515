use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A school, department or central directorate employees belong to.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "1st High School of Athens",
        "address": "Panepistimiou 10, Athens",
        "director_name": "Maria Papadopoulou",
        "contact_email": "mail@1lyk-athin.gr",
        "contact_phone": "2101234567"
    })
)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub director_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}
