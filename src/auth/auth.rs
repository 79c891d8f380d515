use crate::{
    auth::jwt::{TokenError, TokenType, verify_token},
    config::Config,
    error::AppError,
    leave::service::Actor,
    model::role::Role,
};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, &'static str> {
    header
        .ok_or("Missing Authorization header")?
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must start with Bearer")
}

impl AuthUser {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, TokenError> {
        let claims = verify_token(token, secret).map_err(TokenError::Invalid)?;
        if claims.token_type != TokenType::Access {
            return Err(TokenError::NotAccessToken);
        }
        let role = Role::from_id(claims.role).ok_or(TokenError::UnknownRole(claims.role))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor {
            role: self.role,
            employee_id: self.employee_id,
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        if self.role.handles_intake() {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                reason: "HR/Admin only",
            })
        }
    }

    /// HR, Director or Admin.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                reason: "Staff only",
            })
        }
    }

    pub fn require_employee_profile(&self) -> Result<u64, AppError> {
        self.employee_id.ok_or(AppError::Forbidden {
            reason: "No employee profile",
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already verified by auth_middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());
        let token = match bearer_token(header) {
            Ok(t) => t,
            Err(msg) => return ready(Err(ErrorUnauthorized(msg))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        ready(
            AuthUser::from_token(token, &config.jwt_secret)
                .map_err(|e| ErrorUnauthorized(e.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::testing::{SECRET, claims, sign};

    #[test]
    fn access_token_becomes_auth_user() {
        let user = AuthUser::from_token(&sign(&claims(2, Some(50))), SECRET).unwrap();
        assert_eq!(user.role, Role::Hr);
        assert_eq!(user.username, "ngeorgiou");
        assert_eq!(
            user.actor(),
            Actor {
                role: Role::Hr,
                employee_id: Some(50)
            }
        );
        assert!(user.require_hr_or_admin().is_ok());
    }

    #[test]
    fn refresh_token_is_refused() {
        let mut refresh = claims(3, Some(7));
        refresh.token_type = TokenType::Refresh;
        assert!(matches!(
            AuthUser::from_token(&sign(&refresh), SECRET),
            Err(TokenError::NotAccessToken)
        ));
    }

    #[test]
    fn unknown_role_is_refused() {
        assert!(matches!(
            AuthUser::from_token(&sign(&claims(9, None)), SECRET),
            Err(TokenError::UnknownRole(9))
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert!(bearer_token(Some("Token abc")).is_err());
        assert!(bearer_token(None).is_err());
    }

    #[test]
    fn employees_are_not_staff() {
        let user = AuthUser::from_token(&sign(&claims(3, None)), SECRET).unwrap();
        assert!(user.require_staff().is_err());
        assert!(matches!(
            user.require_employee_profile(),
            Err(AppError::Forbidden { .. })
        ));
    }
}
