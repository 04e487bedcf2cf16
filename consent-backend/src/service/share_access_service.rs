// src/service/share_access_service.rs

//! 共有アクセスゲートウェイ
//!
//! 共有トークンだけを資格情報とする公開読み取り経路。セッション認証は
//! 一切要求しない。トークン解決 → 生存チェック → スコープ判定 → 監査記録
//! の順で処理し、開示イベントは必ず access エントリーとして残す。
//! 監査書き込みに失敗した場合はアクセス自体を失敗させる（痕跡のない
//! 開示を成功として返さない）。

use crate::domain::consent_audit_model::{ActorType, ConsentAuditAction, ConsentAuditBuilder};
use crate::domain::consent_model::{self, ConsentStatus};
use crate::domain::consent_scope::{is_permitted, DataCategory};
use crate::domain::health_document_model;
use crate::error::{AppError, AppResult};
use crate::repository::consent_audit_repository::ConsentAuditRepository;
use crate::repository::health_document_repository::HealthDocumentRepository;
use crate::service::consent_service::ConsentService;
use crate::service::storage_service::StorageService;
use crate::utils::error_helper::forbidden_error;
use std::sync::Arc;
use uuid::Uuid;

// 署名付きファイルURLの有効期間（秒）
const FILE_URL_EXPIRY_SECONDS: u64 = 300;

/// 公開アクセスのリクエストコンテキスト（ベストエフォートの行為者識別用）
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 署名付きファイルアクセスの結果
pub struct FileAccess {
    pub url: String,
    pub expires_in: u64,
}

pub struct ShareAccessService {
    consent_service: Arc<ConsentService>,
    audit_repo: Arc<dyn ConsentAuditRepository>,
    document_repo: Arc<dyn HealthDocumentRepository>,
    storage: Arc<dyn StorageService>,
}

impl ShareAccessService {
    pub fn new(
        consent_service: Arc<ConsentService>,
        audit_repo: Arc<dyn ConsentAuditRepository>,
        document_repo: Arc<dyn HealthDocumentRepository>,
        storage: Arc<dyn StorageService>,
    ) -> Self {
        Self {
            consent_service,
            audit_repo,
            document_repo,
            storage,
        }
    }

    // トークンを解決し、生存している同意だけを通す。
    // 終端状態は理由と時刻つきの Gone として返す（リンク自体は秘匿情報では
    // ないため、なぜ使えなくなったかの開示は許容するという設計判断）。
    async fn resolve_live(&self, token: &str) -> AppResult<consent_model::Model> {
        let consent = self
            .consent_service
            .read_fresh_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?;

        match ConsentStatus::from_str(&consent.status) {
            Some(ConsentStatus::Active) => Ok(consent),
            Some(ConsentStatus::Revoked) => Err(AppError::Gone {
                status: ConsentStatus::Revoked.as_str().to_string(),
                timestamp: consent.revoked_at.unwrap_or(consent.expires_at),
            }),
            // 不明な保存値も期限切れと同じ扱い
            Some(ConsentStatus::Expired) | None => Err(AppError::Gone {
                status: ConsentStatus::Expired.as_str().to_string(),
                timestamp: consent.expires_at,
            }),
        }
    }

    // access 監査エントリーを記録する。失敗はそのまま呼び出し元に伝播する
    async fn record_access(
        &self,
        consent: &consent_model::Model,
        context: &AccessContext,
        details: serde_json::Value,
    ) -> AppResult<()> {
        let actor_id = context
            .ip_address
            .clone()
            .unwrap_or_else(|| "unknown".to_string());

        let mut builder = ConsentAuditBuilder::new(
            consent.id,
            ConsentAuditAction::Access,
            ActorType::Recipient,
        )
        .actor_id(actor_id)
        .details(details);

        if let Some(ip) = &context.ip_address {
            builder = builder.ip_address(ip.clone());
        }
        if let Some(agent) = &context.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        self.audit_repo.append(builder.build()).await?;
        Ok(())
    }

    /// 同意メタデータの公開ビュー取得
    ///
    /// 返却するのはサニタイズ済みの投影のみ。オーナーIDと生トークンは
    /// ハンドラー層のDTOに決して含めない。
    pub async fn access_consent(
        &self,
        token: &str,
        context: &AccessContext,
    ) -> AppResult<consent_model::Model> {
        let consent = self.resolve_live(token).await?;

        self.record_access(
            &consent,
            context,
            serde_json::json!({ "endpoint": "consent" }),
        )
        .await?;

        tracing::info!(consent_id = %consent.id, "Share link consent accessed");

        Ok(consent)
    }

    /// 共有対象ドキュメント一覧の取得
    ///
    /// スコープ不足は空リストを返す（エラーにしない）。リンクは有効だが
    /// 閲覧可能データがない、という応答に寄せて、信頼できない呼び出し側に
    /// スコープ構成を推測させない。
    pub async fn access_documents(
        &self,
        token: &str,
        context: &AccessContext,
    ) -> AppResult<Vec<health_document_model::Model>> {
        let consent = self.resolve_live(token).await?;

        let scope_granted = is_permitted(&consent.scope_list(), DataCategory::Documents);

        let documents = if scope_granted {
            self.document_repo.find_by_owner(consent.owner_id).await?
        } else {
            Vec::new()
        };

        self.record_access(
            &consent,
            context,
            serde_json::json!({
                "endpoint": "documents",
                "scope_granted": scope_granted,
                "document_count": documents.len(),
            }),
        )
        .await?;

        Ok(documents)
    }

    /// 個別ドキュメントへの署名付きURL取得
    ///
    /// 同意のオーナーとドキュメントのオーナーが一致しない場合は Forbidden。
    /// ID推測によるテナント越えへの多層防御として明示的に弾く。
    pub async fn access_document_file(
        &self,
        token: &str,
        document_id: Uuid,
        context: &AccessContext,
    ) -> AppResult<FileAccess> {
        let consent = self.resolve_live(token).await?;

        if !is_permitted(&consent.scope_list(), DataCategory::Documents) {
            return Err(forbidden_error(
                "This share link does not include document access",
                "share_access_service::access_document_file",
                None,
            ));
        }

        let document = self
            .document_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        if document.owner_id != consent.owner_id {
            return Err(forbidden_error(
                "Document does not belong to this share",
                "share_access_service::access_document_file",
                None,
            ));
        }

        let url = self
            .storage
            .generate_download_url(&document.storage_key, FILE_URL_EXPIRY_SECONDS)
            .await?;

        self.record_access(
            &consent,
            context,
            serde_json::json!({
                "endpoint": "document_file",
                "document_id": document_id,
            }),
        )
        .await?;

        tracing::info!(
            consent_id = %consent.id,
            document_id = %document_id,
            "Share link document file accessed"
        );

        Ok(FileAccess {
            url,
            expires_in: FILE_URL_EXPIRY_SECONDS,
        })
    }
}
