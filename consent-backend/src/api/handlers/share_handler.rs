// src/api/handlers/share_handler.rs

//! 共有リンクの公開ハンドラー
//!
//! このルーターの全エンドポイントはトークン認証のみ。セッション認証の
//! エクストラクターをここに追加してはならない。

use crate::api::dto::common::ApiResponse;
use crate::api::dto::share_dto::{
    SharedConsentSummaryDto, SharedDocumentDto, SharedFileAccessDto,
};
use crate::api::AppState;
use crate::error::AppResult;
use crate::service::share_access_service::AccessContext;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

// プロキシヘッダーからベストエフォートでアクセス元を特定する
fn access_context(headers: &HeaderMap) -> AccessContext {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|s| s.to_string())
        });

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    AccessContext {
        ip_address,
        user_agent,
    }
}

/// 共有された同意サマリーを取得（公開・トークン認証）
pub async fn get_shared_consent_handler(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let context = access_context(&headers);

    let consent = app_state
        .share_access_service
        .access_consent(&token, &context)
        .await?;

    Ok(Json(ApiResponse::success(
        "Shared consent retrieved successfully",
        SharedConsentSummaryDto::from(consent),
    )))
}

/// 共有対象ドキュメント一覧を取得（公開・トークン認証）
pub async fn get_shared_documents_handler(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let context = access_context(&headers);

    let documents = app_state
        .share_access_service
        .access_documents(&token, &context)
        .await?;

    info!(document_count = documents.len(), "Shared documents listed");

    let dtos: Vec<SharedDocumentDto> =
        documents.into_iter().map(SharedDocumentDto::from).collect();

    Ok(Json(ApiResponse::success(
        "Shared documents retrieved successfully",
        dtos,
    )))
}

/// 個別ドキュメントの署名付きURLを取得（公開・トークン認証）
pub async fn get_shared_document_file_handler(
    State(app_state): State<AppState>,
    Path((token, document_id)): Path<(String, Uuid)>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let context = access_context(&headers);

    let file_access = app_state
        .share_access_service
        .access_document_file(&token, document_id, &context)
        .await?;

    Ok(Json(ApiResponse::success(
        "Document file URL generated successfully",
        SharedFileAccessDto::from(file_access),
    )))
}

/// 共有アクセスルーター（公開）
pub fn share_router(app_state: AppState) -> Router {
    Router::new()
        .route("/consents/share/{token}", get(get_shared_consent_handler))
        .route(
            "/consents/share/{token}/documents",
            get(get_shared_documents_handler),
        )
        .route(
            "/consents/share/{token}/documents/{document_id}/file",
            get(get_shared_document_file_handler),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.10, 10.0.0.1"),
        );

        let context = access_context(&headers);
        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.10"));
    }

    #[test]
    fn missing_headers_yield_empty_context() {
        let context = access_context(&HeaderMap::new());
        assert!(context.ip_address.is_none());
        assert!(context.user_agent.is_none());
    }
}
