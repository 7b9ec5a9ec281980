use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Admin email
    pub uid: i32,    // Admin ID
    pub exp: usize,  // Expiration timestamp
}

/// Sign a new JWT token for an admin.
pub fn sign(admin_id: i32, email: &str, secret: &str, ttl_secs: i64) -> Result<String> {
    let expiration = Utc::now().timestamp().saturating_add(ttl_secs.max(0));

    let claims = Claims {
        sub: email.to_owned(),
        uid: admin_id,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
