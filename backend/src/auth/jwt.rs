//! JWT validation.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::types::{AuthConfig, Claims};

/// Validate a JWT token and return claims.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // The provider sets `aud` to its own role name; the signature is what we trust
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
