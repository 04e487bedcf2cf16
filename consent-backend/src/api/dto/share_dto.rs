// src/api/dto/share_dto.rs

//! 共有アクセス経路の公開DTO
//!
//! 匿名の共有リンク保持者に返す投影。オーナーの識別子・生トークン・
//! ストレージキーなどの内部情報は決して含めない。

use crate::domain::consent_model;
use crate::domain::consent_scope::ConsentScope;
use crate::domain::health_document_model;
use crate::service::share_access_service::FileAccess;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 共有リンク保持者向けの同意サマリー
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedConsentSummaryDto {
    pub recipient_name: String,
    pub recipient_role: String,
    pub scopes: Vec<ConsentScope>,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<consent_model::Model> for SharedConsentSummaryDto {
    fn from(model: consent_model::Model) -> Self {
        let scopes = model.scope_list();
        Self {
            recipient_name: model.recipient_name,
            recipient_role: model.recipient_role,
            scopes,
            purpose: model.purpose,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

/// 共有リンク保持者向けのドキュメントサマリー
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedDocumentDto {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub provider: Option<String>,
    pub document_date: Option<DateTime<Utc>>,
    pub file_type: String,
}

impl From<health_document_model::Model> for SharedDocumentDto {
    fn from(model: health_document_model::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            category: model.category,
            provider: model.provider,
            document_date: model.document_date,
            file_type: model.file_type,
        }
    }
}

/// 署名付きファイルURLのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedFileAccessDto {
    pub url: String,
    pub expires_in: u64,
}

impl From<FileAccess> for SharedFileAccessDto {
    fn from(access: FileAccess) -> Self {
        Self {
            url: access.url,
            expires_in: access.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consent_model::scopes_to_json;

    #[test]
    fn summary_excludes_owner_identity_and_token() {
        let model = consent_model::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            recipient_name: "Dr. Sato".to_string(),
            recipient_role: "doctor".to_string(),
            scopes: scopes_to_json(&[ConsentScope::Documents]),
            duration_type: "24h".to_string(),
            custom_expiry_date: None,
            purpose: "Referral".to_string(),
            status: "active".to_string(),
            share_token: "secret-token".to_string(),
            expires_at: Utc::now(),
            revoked_at: None,
            created_at: Utc::now(),
        };

        let dto = SharedConsentSummaryDto::from(model);
        let json = serde_json::to_value(&dto).unwrap();

        // サニタイズ済み投影にはオーナーIDとトークンが存在しないこと
        assert!(json.get("owner_id").is_none());
        assert!(json.get("share_token").is_none());
        assert_eq!(json["recipient_name"], "Dr. Sato");
    }
}
