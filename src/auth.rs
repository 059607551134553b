use anyhow::Context;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{app_error::AppError, config, models::UserEntity};

const TOKEN_TTL_HOURS: i64 = 24;

/// Bearer token claims. `sub` is the user id; `is_ristoratore` gates the
/// staff surface.
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: i32,
    pub is_ristoratore: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("Failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn generate_token(user: &UserEntity) -> Result<TokenResponse, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        is_ristoratore: user.is_ristoratore,
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config::jwt_secret().as_bytes()),
    )
    .context("Failed to sign token")?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: TOKEN_TTL_HOURS * 3600,
    })
}

pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config::jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(id: i32, is_ristoratore: bool) -> UserEntity {
        UserEntity {
            id,
            username: "mario".to_string(),
            password_hash: String::new(),
            is_ristoratore,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_verifies_only_with_the_right_password() {
        let hash = hash_password("segretissima").unwrap();
        assert!(verify_password("segretissima", &hash));
        assert!(!verify_password("sbagliata", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hashes() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let token = generate_token(&test_user(42, true)).unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.is_ristoratore);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let token = generate_token(&test_user(7, false)).unwrap();
        let mut tampered = token.access_token;
        tampered.push('x');
        assert!(verify_token(&tampered).is_err());
    }
}
