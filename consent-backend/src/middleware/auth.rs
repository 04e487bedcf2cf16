// src/middleware/auth.rs

//! セッション認証ミドルウェア
//!
//! 受信リクエストをオーナーIDに解決するエクストラクター。トークンは
//! Authorization ヘッダーまたはクッキーから取り出し、検証に失敗した
//! リクエストは 401 で拒否する。

use crate::api::AppState;
use crate::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// 認証済みユーザー（記録オーナー）
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_jar = CookieJar::from_headers(&parts.headers);

        let token = extract_token(
            &parts.headers,
            &cookie_jar,
            &state.access_token_cookie_name,
        )
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let claims = state.jwt_manager.verify_access_token(&token)?;

        Ok(Self {
            user_id: claims.user_id()?,
        })
    }
}

// Authorizationヘッダー優先、なければクッキーからトークンを取得
fn extract_token(headers: &HeaderMap, cookie_jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer ").map(|s| s.to_string()));

    let cookie_token = cookie_jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string());

    auth_header.or(cookie_token)
}
