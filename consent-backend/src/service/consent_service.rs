// src/service/consent_service.rs
use crate::domain::consent_audit_model::{
    self, ActorType, ConsentAuditAction, ConsentAuditBuilder,
};
use crate::domain::consent_model::{
    self, scopes_to_json, ConsentDurationType, ConsentStatus, RecipientRole,
};
use crate::domain::consent_scope::ConsentScope;
use crate::error::AppResult;
use crate::repository::consent_audit_repository::ConsentAuditRepository;
use crate::repository::consent_repository::ConsentRepository;
use crate::utils::error_helper::{
    forbidden_error, internal_server_error, not_found_error, validation_error,
};
use crate::utils::qr;
use crate::utils::token::generate_secure_token;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

// 共有トークンの長さ（英数字32文字 ≒ 190ビットのエントロピー）
const SHARE_TOKEN_LENGTH: usize = 32;

// トークン衝突時の再生成上限。超えたらストレージエラー扱い
const MAX_TOKEN_GENERATION_ATTEMPTS: u32 = 5;

// 同意作成のためのパラメータ構造体
pub struct CreateConsentCommand {
    pub owner_id: Uuid,
    pub recipient_name: String,
    pub recipient_role: RecipientRole,
    pub scopes: Vec<ConsentScope>,
    pub duration_type: ConsentDurationType,
    pub custom_expiry_date: Option<chrono::DateTime<Utc>>,
    pub purpose: String,
}

/// 共有リンクのURLとQRコード表現
pub struct ShareLinkParts {
    pub shareable_url: String,
    pub qr_code: String,
}

pub struct ConsentService {
    consent_repo: Arc<dyn ConsentRepository>,
    audit_repo: Arc<dyn ConsentAuditRepository>,
    share_base_url: String,
}

impl ConsentService {
    pub fn new(
        consent_repo: Arc<dyn ConsentRepository>,
        audit_repo: Arc<dyn ConsentAuditRepository>,
        share_base_url: String,
    ) -> Self {
        Self {
            consent_repo,
            audit_repo,
            share_base_url,
        }
    }

    // 同意を作成し、grant 監査エントリーとあわせて永続化する
    pub async fn create_consent(
        &self,
        command: CreateConsentCommand,
    ) -> AppResult<consent_model::Model> {
        if command.scopes.is_empty() {
            return Err(validation_error(
                "scopes",
                "At least one scope is required",
            ));
        }

        let now = Utc::now();

        // 有効期限を計算。custom は検証時点で厳密に未来であること
        let expires_at = match command.duration_type.fixed_duration() {
            Some(duration) => now + duration,
            None => {
                let custom = command.custom_expiry_date.ok_or_else(|| {
                    validation_error(
                        "custom_expiry_date",
                        "Required when duration_type is custom",
                    )
                })?;
                if custom <= now {
                    return Err(validation_error(
                        "custom_expiry_date",
                        "Must be strictly in the future",
                    ));
                }
                custom
            }
        };

        let share_token = self.generate_unique_share_token().await?;

        let consent_id = Uuid::new_v4();
        let consent = consent_model::Model {
            id: consent_id,
            owner_id: command.owner_id,
            recipient_name: command.recipient_name,
            recipient_role: command.recipient_role.as_str().to_string(),
            scopes: scopes_to_json(&command.scopes),
            duration_type: command.duration_type.as_str().to_string(),
            custom_expiry_date: match command.duration_type {
                ConsentDurationType::Custom => command.custom_expiry_date,
                _ => None,
            },
            purpose: command.purpose.clone(),
            status: ConsentStatus::Active.as_str().to_string(),
            share_token,
            expires_at,
            revoked_at: None,
            created_at: now,
        };

        let grant_entry =
            ConsentAuditBuilder::new(consent_id, ConsentAuditAction::Grant, ActorType::User)
                .actor_id(command.owner_id.to_string())
                .details(serde_json::json!({
                    "scopes": command.scopes,
                    "duration_type": command.duration_type.as_str(),
                    "purpose": command.purpose,
                }))
                .build();

        let created = self
            .consent_repo
            .create_with_grant(consent, grant_entry)
            .await?;

        tracing::info!(
            consent_id = %created.id,
            owner_id = %created.owner_id,
            expires_at = %created.expires_at,
            "Consent created"
        );

        Ok(created)
    }

    // 一意な共有トークンを生成（衝突時は上限まで再試行）
    async fn generate_unique_share_token(&self) -> AppResult<String> {
        for _ in 0..MAX_TOKEN_GENERATION_ATTEMPTS {
            let candidate = generate_secure_token(SHARE_TOKEN_LENGTH);
            if self.consent_repo.find_by_token(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }

        Err(internal_server_error(
            "share token collision retries exhausted",
            "consent_service::generate_unique_share_token",
            "Failed to generate a unique share token",
        ))
    }

    /// IDで同意を読み取り、期限切れなら遅延遷移を永続化してから返す
    pub async fn read_fresh(&self, id: Uuid) -> AppResult<Option<consent_model::Model>> {
        match self.consent_repo.find_by_id(id).await? {
            Some(consent) => self.refresh_status(consent).await.map(Some),
            None => Ok(None),
        }
    }

    /// 共有トークンで同意を読み取り、期限切れなら遅延遷移を永続化してから返す
    pub async fn read_fresh_by_token(
        &self,
        token: &str,
    ) -> AppResult<Option<consent_model::Model>> {
        match self.consent_repo.find_by_token(token).await? {
            Some(consent) => self.refresh_status(consent).await.map(Some),
            None => Ok(None),
        }
    }

    // active かつ期限超過なら expired を永続化する。
    // 条件付きUPDATEなので並行リーダーと競合しても二重適用は無害。
    async fn refresh_status(
        &self,
        consent: consent_model::Model,
    ) -> AppResult<consent_model::Model> {
        let now = Utc::now();
        if consent.status == ConsentStatus::Active.as_str()
            && consent.effective_status(now) == ConsentStatus::Expired
        {
            tracing::debug!(consent_id = %consent.id, "Lazy expiry transition");
            return self
                .consent_repo
                .mark_expired_if_active(consent.id)
                .await?
                .ok_or_else(|| {
                    not_found_error(
                        "Consent",
                        &consent.id.to_string(),
                        "consent_service::refresh_status",
                    )
                });
        }
        Ok(consent)
    }

    /// オーナー向けの単一取得。所有権の不一致は NotFound ではなく Forbidden
    pub async fn get_consent(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> AppResult<consent_model::Model> {
        let consent = self.read_fresh(id).await?.ok_or_else(|| {
            not_found_error("Consent", &id.to_string(), "consent_service::get_consent")
        })?;

        if consent.owner_id != owner_id {
            return Err(forbidden_error(
                "You do not have access to this consent",
                "consent_service::get_consent",
                Some(&owner_id.to_string()),
            ));
        }

        Ok(consent)
    }

    /// オーナーの同意一覧（作成日時の降順、各行は遅延再計算済みステータス）
    pub async fn list_consents(
        &self,
        owner_id: Uuid,
        status_filter: Option<ConsentStatus>,
    ) -> AppResult<Vec<consent_model::Model>> {
        let consents = self.consent_repo.find_by_owner(owner_id).await?;

        let mut refreshed = Vec::with_capacity(consents.len());
        for consent in consents {
            refreshed.push(self.refresh_status(consent).await?);
        }

        if let Some(filter) = status_filter {
            refreshed.retain(|c| c.status == filter.as_str());
        }

        Ok(refreshed)
    }

    // 同意を失効させる。既に終端状態なら何もせずそのまま返す
    pub async fn revoke_consent(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> AppResult<consent_model::Model> {
        // 所有権チェックと遅延期限切れ判定を先に通す
        let consent = self.get_consent(owner_id, id).await?;

        if consent.status != ConsentStatus::Active.as_str() {
            // 二重失効・期限切れ後の失効は無害な no-op
            tracing::debug!(consent_id = %id, status = %consent.status, "Revoke is a no-op");
            return Ok(consent);
        }

        let (revoked, transitioned) = self
            .consent_repo
            .revoke_if_active(id, Utc::now())
            .await?
            .ok_or_else(|| {
                not_found_error(
                    "Consent",
                    &id.to_string(),
                    "consent_service::revoke_consent",
                )
            })?;

        // 遷移が実際に起きた呼び出しだけが revoke エントリーを残す
        if transitioned {
            let revoke_entry =
                ConsentAuditBuilder::new(id, ConsentAuditAction::Revoke, ActorType::User)
                    .actor_id(owner_id.to_string())
                    .details(serde_json::json!({ "revoked_by": owner_id }))
                    .build();
            self.audit_repo.append(revoke_entry).await?;

            tracing::info!(consent_id = %id, owner_id = %owner_id, "Consent revoked");
        }

        Ok(revoked)
    }

    /// 同意の監査証跡（新しい順）
    pub async fn get_audit_trail(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> AppResult<Vec<consent_audit_model::Model>> {
        // 所有権チェック
        self.get_consent(owner_id, id).await?;

        self.audit_repo.find_by_consent(id).await
    }

    /// 共有リンクURLとQRコードを構築する（認可・監査状態には触れない）
    pub async fn build_share_link(&self, owner_id: Uuid, id: Uuid) -> AppResult<ShareLinkParts> {
        let consent = self.get_consent(owner_id, id).await?;

        let shareable_url = format!(
            "{}/share/{}",
            self.share_base_url.trim_end_matches('/'),
            consent.share_token
        );
        let qr_code = qr::encode_url_as_data_url(&shareable_url)?;

        Ok(ShareLinkParts {
            shareable_url,
            qr_code,
        })
    }
}
