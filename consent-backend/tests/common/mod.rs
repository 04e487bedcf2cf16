// tests/common/mod.rs

//! サービステスト用の共通フィクスチャ
//!
//! インメモリバックエンドでライフサイクルエンジンとゲートウェイを組み立てる。
//! データベース不要で、認可コントラクトそのものを検証する。

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use consent_backend::domain::consent_model::{
    self, scopes_to_json, ConsentDurationType, ConsentStatus, RecipientRole,
};
use consent_backend::domain::consent_scope::ConsentScope;
use consent_backend::domain::health_document_model;
use consent_backend::error::AppResult;
use consent_backend::repository::consent_audit_repository::ConsentAuditRepository;
use consent_backend::repository::memory::{
    InMemoryBackend, InMemoryConsentAuditRepository, InMemoryConsentRepository,
    InMemoryHealthDocumentRepository,
};
use consent_backend::service::consent_service::{ConsentService, CreateConsentCommand};
use consent_backend::service::share_access_service::{AccessContext, ShareAccessService};
use consent_backend::service::storage_service::StorageService;

pub const SHARE_BASE_URL: &str = "http://localhost:3001";

/// 署名付きURL生成のスタブ
pub struct StubStorageService;

#[async_trait]
impl StorageService for StubStorageService {
    async fn generate_download_url(&self, key: &str, expires_in_seconds: u64) -> AppResult<String> {
        Ok(format!(
            "https://storage.test/{}?expires={}",
            key, expires_in_seconds
        ))
    }
}

pub struct TestHarness {
    pub backend: Arc<InMemoryBackend>,
    pub consent_service: Arc<ConsentService>,
    pub share_access_service: Arc<ShareAccessService>,
    pub audit_repo: Arc<dyn ConsentAuditRepository>,
}

pub fn build_harness() -> TestHarness {
    let backend = InMemoryBackend::new();
    let consent_repo = Arc::new(InMemoryConsentRepository::new(backend.clone()));
    let audit_repo: Arc<dyn ConsentAuditRepository> =
        Arc::new(InMemoryConsentAuditRepository::new(backend.clone()));
    let document_repo = Arc::new(InMemoryHealthDocumentRepository::new(backend.clone()));

    let consent_service = Arc::new(ConsentService::new(
        consent_repo,
        audit_repo.clone(),
        SHARE_BASE_URL.to_string(),
    ));
    let share_access_service = Arc::new(ShareAccessService::new(
        consent_service.clone(),
        audit_repo.clone(),
        document_repo,
        Arc::new(StubStorageService),
    ));

    TestHarness {
        backend,
        consent_service,
        share_access_service,
        audit_repo,
    }
}

/// 24時間有効の同意作成コマンド
pub fn create_command(owner_id: Uuid, scopes: Vec<ConsentScope>) -> CreateConsentCommand {
    CreateConsentCommand {
        owner_id,
        recipient_name: "Dr. Yamada".to_string(),
        recipient_role: RecipientRole::Doctor,
        scopes,
        duration_type: ConsentDurationType::TwentyFourHours,
        custom_expiry_date: None,
        purpose: "Follow-up consultation".to_string(),
    }
}

/// 期限を既に過ぎた active な同意をストアへ直接投入する
///
/// 遅延期限切れ遷移（読み取り時に expired を永続化する経路)の検証用。
pub fn seed_expired_consent(
    harness: &TestHarness,
    owner_id: Uuid,
    share_token: &str,
    scopes: Vec<ConsentScope>,
) -> consent_model::Model {
    let now = Utc::now();
    let consent = consent_model::Model {
        id: Uuid::new_v4(),
        owner_id,
        recipient_name: "Past Recipient".to_string(),
        recipient_role: RecipientRole::Lab.as_str().to_string(),
        scopes: scopes_to_json(&scopes),
        duration_type: ConsentDurationType::TwentyFourHours.as_str().to_string(),
        custom_expiry_date: None,
        purpose: "Old referral".to_string(),
        status: ConsentStatus::Active.as_str().to_string(),
        share_token: share_token.to_string(),
        expires_at: now - Duration::hours(1),
        revoked_at: None,
        created_at: now - Duration::hours(25),
    };
    harness.backend.insert_consent(consent.clone());
    consent
}

/// オーナーのドキュメントをストアへ投入する
pub fn seed_document(
    harness: &TestHarness,
    owner_id: Uuid,
    title: &str,
) -> health_document_model::Model {
    let document = health_document_model::Model {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_string(),
        category: "lab_report".to_string(),
        provider: Some("City Hospital".to_string()),
        document_date: Some(Utc::now() - Duration::days(3)),
        file_type: "pdf".to_string(),
        storage_key: format!("documents/{}/{}", owner_id, Uuid::new_v4()),
        created_at: Utc::now(),
    };
    harness.backend.insert_document(document.clone());
    document
}

/// 公開アクセスのリクエストコンテキスト
pub fn recipient_context() -> AccessContext {
    AccessContext {
        ip_address: Some("203.0.113.10".to_string()),
        user_agent: Some("Mozilla/5.0 (test)".to_string()),
    }
}
