//! Session management for authentication

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::types::User;
use crate::error::Error;

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    #[serde(default)]
    pub refresh_token: String,

    /// The token type
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The expiry time in seconds
    #[serde(default)]
    pub expires_in: i64,

    /// The expiry timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in user, when the auth API returned it
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

impl Session {
    /// Rebuild a session from a bare access token.
    ///
    /// Only the claims are read; the signature is checked by the auth API
    /// when the token is used.
    pub fn from_access_token(access_token: &str) -> Result<Self, Error> {
        let claims = AccessClaims::decode(access_token)?;
        let now = now_secs();

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: String::new(),
            token_type: default_token_type(),
            expires_in: claims.exp.map(|exp| exp - now).unwrap_or(0),
            expires_at: claims.exp,
            user: None,
        })
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() >= expires_at,
            None => false,
        }
    }

    /// Decode the claims of the access token
    pub fn claims(&self) -> Result<AccessClaims, Error> {
        AccessClaims::decode(&self.access_token)
    }

    /// ID of the signed-in user, from the embedded user or the token subject
    pub fn user_id(&self) -> Result<Uuid, Error> {
        match &self.user {
            Some(user) => Ok(user.id),
            None => Ok(self.claims()?.sub),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,

    #[serde(default)]
    pub exp: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

impl AccessClaims {
    /// Read the claims without verifying the signature or expiry
    pub fn decode(token: &str) -> Result<Self, Error> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }
}
