// src/api/dto/consent_dto.rs
use crate::domain::consent_audit_model;
use crate::domain::consent_model::{self, ConsentDurationType, RecipientRole};
use crate::domain::consent_scope::ConsentScope;
use crate::utils::validation::common;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateConsentRequest {
    #[validate(
        length(
            min = common::consent::RECIPIENT_NAME_MIN_LENGTH,
            max = common::consent::RECIPIENT_NAME_MAX_LENGTH,
            message = "Recipient name must be between 1 and 100 characters"
        ),
        custom(function = common::validate_recipient_name)
    )]
    pub recipient_name: String,

    pub recipient_role: RecipientRole,

    #[validate(length(min = 1, message = "At least one scope is required"))]
    pub scopes: Vec<ConsentScope>,

    pub duration_type: ConsentDurationType,

    // duration_type = custom のときのみ必須
    pub custom_expiry_date: Option<DateTime<Utc>>,

    #[validate(
        length(
            min = common::consent::PURPOSE_MIN_LENGTH,
            max = common::consent::PURPOSE_MAX_LENGTH,
            message = "Purpose must be between 1 and 500 characters"
        ),
        custom(function = common::validate_purpose)
    )]
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsentListQuery {
    /// 有効ステータスでの絞り込み（active / expired / revoked）
    pub status: Option<String>,
}

// --- Response DTOs ---

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsentDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub recipient_name: String,
    pub recipient_role: String,
    pub scopes: Vec<ConsentScope>,
    pub duration_type: String,
    pub custom_expiry_date: Option<DateTime<Utc>>,
    pub purpose: String,
    pub status: String,
    pub share_token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<consent_model::Model> for ConsentDto {
    fn from(model: consent_model::Model) -> Self {
        let scopes = model.scope_list();
        Self {
            id: model.id,
            owner_id: model.owner_id,
            recipient_name: model.recipient_name,
            recipient_role: model.recipient_role,
            scopes,
            duration_type: model.duration_type,
            custom_expiry_date: model.custom_expiry_date,
            purpose: model.purpose,
            status: model.status,
            share_token: model.share_token,
            expires_at: model.expires_at,
            revoked_at: model.revoked_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsentAuditLogDto {
    pub id: Uuid,
    pub consent_id: Uuid,
    pub action: String,
    pub actor_type: String,
    pub actor_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: i64, // Unix timestamp
}

impl From<consent_audit_model::Model> for ConsentAuditLogDto {
    fn from(model: consent_audit_model::Model) -> Self {
        Self {
            id: model.id,
            consent_id: model.consent_id,
            action: model.action,
            actor_type: model.actor_type,
            actor_id: model.actor_id,
            details: model.details,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at.timestamp(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareLinkQrResponse {
    pub qr_code: String,
    pub shareable_url: String,
}
