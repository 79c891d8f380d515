use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee profile joined with the name of its user account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 12,
        "organization_id": 3,
        "first_name": "Nikos",
        "last_name": "Georgiou",
        "fathers_name": "Ioannis",
        "am": "612345",
        "afm": "123456789",
        "hire_date": "2015-09-01",
        "specialty": "PE03",
        "telephone": "",
        "mobile": "6912345678",
        "is_hr": false,
        "is_director": false
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 12)]
    pub user_id: u64,

    #[schema(example = 3, nullable = true)]
    pub organization_id: Option<u64>,

    #[schema(example = "Nikos")]
    pub first_name: String,

    #[schema(example = "Georgiou")]
    pub last_name: String,

    #[schema(example = "Ioannis")]
    pub fathers_name: String,

    /// Registry number
    #[schema(example = "612345")]
    pub am: String,

    /// Tax identification number
    #[schema(example = "123456789")]
    pub afm: String,

    #[schema(
        example = "2015-09-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = "PE03")]
    pub specialty: String,

    pub telephone: String,

    pub mobile: String,

    pub is_hr: bool,

    pub is_director: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
