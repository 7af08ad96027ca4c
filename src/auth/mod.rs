use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// The caller, as attached to request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}

/// What an identity provider vouches for after checking a bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use Bearer token format")]
    InvalidScheme,
    #[error("Empty bearer token")]
    EmptyToken,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Unknown role '{0}'")]
    UnknownRole(String),
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}

/// The external identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            email: None,
            name: None,
            role: None,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// Sign claims as an HS256 bearer token
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verifies HS256 tokens signed with a shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let claims = data.claims;
        Ok(VerifiedToken {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            role: claims.role,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::InvalidScheme)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

/// How roles are derived when a token carries no `role` claim
#[derive(Debug, Clone)]
pub struct RolePolicy {
    pub display_name_marker: bool,
    pub instructor_marker: String,
}

impl From<&SecurityConfig> for RolePolicy {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            display_name_marker: security.display_name_role_marker,
            instructor_marker: security.instructor_marker.clone(),
        }
    }
}

/// Turn a verified token into the request identity.
///
/// An explicit role claim always wins. The display-name marker is only
/// consulted when the policy allows it, and is stripped from the name.
pub fn resolve_identity(token: VerifiedToken, policy: &RolePolicy) -> Identity {
    let marker = policy.instructor_marker.as_str();
    let display_name = token.display_name.as_deref().unwrap_or_default();
    let has_marker = !marker.is_empty() && display_name.contains(marker);

    let role = match token.role {
        Some(role) => role,
        None if policy.display_name_marker && has_marker => Role::Instructor,
        None => Role::Student,
    };

    let stripped = if marker.is_empty() {
        display_name.trim().to_string()
    } else {
        display_name.replace(marker, "").trim().to_string()
    };
    let name = if !stripped.is_empty() {
        stripped
    } else {
        token
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or(&token.uid)
            .to_string()
    };

    Identity {
        uid: token.uid,
        email: token.email,
        name,
        role,
    }
}
