// src/utils/jwt.rs
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// アクセストークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// ユーザーID（記録オーナー）
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl AccessTokenClaims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
}

impl JwtManager {
    pub fn from_secret(secret: &str, access_token_expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_minutes,
        }
    }

    // アクセストークンを生成
    pub fn generate_access_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::minutes(self.access_token_expiry_minutes)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::InternalServerError(format!("Failed to generate access token: {}", e))
        })
    }

    // アクセストークンを検証してクレームを返す
    pub fn verify_access_token(&self, token: &str) -> AppResult<AccessTokenClaims> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Access token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid access token".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let manager = JwtManager::from_secret("test-secret-key-for-jwt-roundtrip", 15);
        let user_id = Uuid::new_v4();

        let token = manager.generate_access_token(user_id).unwrap();
        let claims = manager.verify_access_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let manager = JwtManager::from_secret("test-secret-key-for-jwt-roundtrip", 15);
        let other = JwtManager::from_secret("a-completely-different-secret-key", 15);

        let token = other.generate_access_token(Uuid::new_v4()).unwrap();
        assert!(manager.verify_access_token(&token).is_err());
    }
}
