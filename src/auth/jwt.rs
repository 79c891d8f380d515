//! Bearer token verification. Tokens are issued by the external identity
//! service and signed with the shared `JWT_SECRET` (HS256).

use derive_more::Display;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    #[serde(default)]
    pub employee_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Display)]
pub enum TokenError {
    #[display(fmt = "Invalid or expired token: {}", _0)]
    Invalid(Error),

    #[display(fmt = "Only access tokens are accepted")]
    NotAccessToken,

    #[display(fmt = "Invalid role {}", _0)]
    UnknownRole(u8),
}

impl std::error::Error for TokenError {}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn valid_token_round_trips_claims() {
        let token = sign(&claims(3, Some(7)));
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "ngeorgiou");
        assert_eq!(claims.employee_id, Some(7));
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(&claims(3, None));
        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims(3, None);
        expired.exp = now() - 3600;
        assert!(verify_token(&sign(&expired), SECRET).is_err());
    }
}
