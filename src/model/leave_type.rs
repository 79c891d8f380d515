use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, FieldError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Sick Leave",
        "max_days": 15,
        "max_months": 0,
        "is_long_term": false
    })
)]
pub struct LeaveType {
    pub id: u64,
    pub name: String,
    /// Maximum working days per application (0 = no limit).
    pub max_days: u32,
    /// Maximum months per application, long-term types only (0 = no limit).
    pub max_months: u32,
    pub is_long_term: bool,
}

/// Checks the fields shared by create and update.
pub fn validate_leave_type(name: &str, max_months: u32, is_long_term: bool) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push(FieldError::required("name"));
    }
    if !is_long_term && max_months != 0 {
        errors.push(FieldError::new(
            "max_months",
            "Only long-term leave types are measured in months",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_only_for_long_term() {
        assert!(validate_leave_type("Maternity", 9, true).is_ok());
        assert!(validate_leave_type("Sick Leave", 0, false).is_ok());

        match validate_leave_type("Sick Leave", 2, false) {
            Err(AppError::Validation { errors }) => assert_eq!(errors[0].field, "max_months"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        match validate_leave_type("  ", 0, false) {
            Err(AppError::Validation { errors }) => assert_eq!(errors[0].field, "name"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
