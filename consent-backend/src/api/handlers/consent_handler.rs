// src/api/handlers/consent_handler.rs
use crate::api::dto::common::ApiResponse;
use crate::api::dto::consent_dto::{
    ConsentAuditLogDto, ConsentDto, ConsentListQuery, CreateConsentRequest, ShareLinkQrResponse,
};
use crate::api::AppState;
use crate::domain::consent_model::ConsentStatus;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::service::consent_service::CreateConsentCommand;
use crate::utils::error_helper::convert_validation_errors;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// 同意を作成して共有トークンを発行
pub async fn create_consent_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateConsentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "consent_handler::create_consent"))?;

    info!(
        owner_id = %auth_user.user_id,
        recipient_role = %payload.recipient_role.as_str(),
        duration_type = %payload.duration_type.as_str(),
        "Creating consent"
    );

    let consent = app_state
        .consent_service
        .create_consent(CreateConsentCommand {
            owner_id: auth_user.user_id,
            recipient_name: payload.recipient_name,
            recipient_role: payload.recipient_role,
            scopes: payload.scopes,
            duration_type: payload.duration_type,
            custom_expiry_date: payload.custom_expiry_date,
            purpose: payload.purpose,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Consent created successfully",
            ConsentDto::from(consent),
        )),
    ))
}

/// オーナーの同意一覧を取得（有効ステータスで絞り込み可能）
pub async fn list_consents_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ConsentListQuery>,
) -> AppResult<impl IntoResponse> {
    let status_filter = query
        .status
        .as_deref()
        .map(|s| {
            ConsentStatus::from_str(s)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid status filter: {}", s)))
        })
        .transpose()?;

    info!(
        owner_id = %auth_user.user_id,
        status_filter = ?query.status,
        "Listing consents"
    );

    let consents = app_state
        .consent_service
        .list_consents(auth_user.user_id, status_filter)
        .await?;

    let dtos: Vec<ConsentDto> = consents.into_iter().map(ConsentDto::from).collect();

    Ok(Json(ApiResponse::success(
        "Consents retrieved successfully",
        dtos,
    )))
}

/// 同意を1件取得
pub async fn get_consent_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let consent = app_state
        .consent_service
        .get_consent(auth_user.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Consent retrieved successfully",
        ConsentDto::from(consent),
    )))
}

/// 同意を失効させる（DELETEはrevokeを意味する。物理削除はしない）
pub async fn revoke_consent_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    info!(
        owner_id = %auth_user.user_id,
        consent_id = %id,
        "Revoking consent"
    );

    let consent = app_state
        .consent_service
        .revoke_consent(auth_user.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Consent revoked successfully",
        ConsentDto::from(consent),
    )))
}

/// 同意の監査証跡を取得（新しい順）
pub async fn get_consent_audit_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let logs = app_state
        .consent_service
        .get_audit_trail(auth_user.user_id, id)
        .await?;

    let dtos: Vec<ConsentAuditLogDto> = logs.into_iter().map(ConsentAuditLogDto::from).collect();

    Ok(Json(ApiResponse::success(
        "Audit trail retrieved successfully",
        dtos,
    )))
}

/// 共有リンクのURLとQRコードを取得
pub async fn get_consent_qr_handler(
    State(app_state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let parts = app_state
        .consent_service
        .build_share_link(auth_user.user_id, id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Share link generated successfully",
        ShareLinkQrResponse {
            qr_code: parts.qr_code,
            shareable_url: parts.shareable_url,
        },
    )))
}

/// 同意管理ルーター（セッション認証が必要）
pub fn consent_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/consents",
            axum::routing::post(create_consent_handler).get(list_consents_handler),
        )
        .route(
            "/consents/{id}",
            get(get_consent_handler).delete(revoke_consent_handler),
        )
        .route("/consents/{id}/audit", get(get_consent_audit_handler))
        .route("/consents/{id}/qr", get(get_consent_qr_handler))
        .with_state(app_state)
}
