use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Admin,
    /// Any role this service has no rights for, students included.
    Other,
}

impl Role {
    pub fn from_claim(role: Option<&str>) -> Self {
        match role {
            Some(r) if r.eq_ignore_ascii_case("teacher") => Role::Teacher,
            Some(r) if r.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateSurvey,
    ListSurveys,
    ViewResults,
    DeleteSurvey,
}

/// Resolves callers to identities and decides what their role allows.
/// Ownership of a particular survey is checked by the survey service.
pub trait AccessControl: Send + Sync {
    fn authenticate(&self, credential: &str) -> Result<Identity>;

    fn authorize(&self, identity: &Identity, action: Action) -> Result<()>;
}

/// Verifies HS256 bearer tokens issued by the account service.
pub struct JwtAccessControl {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl JwtAccessControl {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token the way the account service does. Used by tests and
    /// local tooling; this service never hands out tokens itself.
    pub fn issue_token(&self, user_id: Uuid, role: &str, ttl: chrono::Duration) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
            role: Some(role.to_string()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
    }
}

impl AccessControl for JwtAccessControl {
    fn authenticate(&self, credential: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(credential, &self.decoding, &validation)
            .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_subject".to_string()))?;
        Ok(Identity {
            user_id,
            role: Role::from_claim(data.claims.role.as_deref()),
        })
    }

    fn authorize(&self, identity: &Identity, action: Action) -> Result<()> {
        match (identity.role, action) {
            (Role::Teacher | Role::Admin, _) => Ok(()),
            (Role::Other, _) => Err(Error::Forbidden(
                "Only teachers can access this".to_string(),
            )),
        }
    }
}
