// src/repository/memory.rs

//! インメモリ実装のストアバックエンド
//!
//! 認可コントラクトはバックエンドに依存しない。データベースを立てずに
//! ライフサイクルエンジンとゲートウェイを検証するための実装で、
//! ステータス遷移の条件付き更新セマンティクスはSeaORM実装と一致させている。

use crate::domain::consent_audit_model;
use crate::domain::consent_model::{self, ConsentStatus};
use crate::domain::health_document_model;
use crate::error::AppResult;
use crate::repository::consent_audit_repository::ConsentAuditRepository;
use crate::repository::consent_repository::ConsentRepository;
use crate::repository::health_document_repository::HealthDocumentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 同意・監査・ドキュメントを1つのロック境界で保持する共有バックエンド
#[derive(Default)]
pub struct InMemoryBackend {
    consents: Mutex<Vec<consent_model::Model>>,
    audit_logs: Mutex<Vec<consent_audit_model::Model>>,
    documents: Mutex<Vec<health_document_model::Model>>,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// テストデータ投入用。期限切れ済みの同意を直接差し込む場合などに使う
    pub fn insert_consent(&self, consent: consent_model::Model) {
        self.consents
            .lock()
            .expect("in-memory consent store poisoned")
            .push(consent);
    }

    pub fn insert_document(&self, document: health_document_model::Model) {
        self.documents
            .lock()
            .expect("in-memory document store poisoned")
            .push(document);
    }
}

pub struct InMemoryConsentRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryConsentRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ConsentRepository for InMemoryConsentRepository {
    async fn create_with_grant(
        &self,
        consent: consent_model::Model,
        grant_entry: consent_audit_model::Model,
    ) -> AppResult<consent_model::Model> {
        // 両テーブルを同一ロックスコープで更新し、片側だけの書き込みを防ぐ
        let mut consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        let mut audit_logs = self
            .backend
            .audit_logs
            .lock()
            .expect("in-memory audit store poisoned");

        consents.push(consent.clone());
        audit_logs.push(grant_entry);

        Ok(consent)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<consent_model::Model>> {
        let consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        Ok(consents.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<consent_model::Model>> {
        let consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        Ok(consents.iter().find(|c| c.share_token == token).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<consent_model::Model>> {
        let consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        let mut result: Vec<consent_model::Model> = consents
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn mark_expired_if_active(&self, id: Uuid) -> AppResult<Option<consent_model::Model>> {
        let mut consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        Ok(consents.iter_mut().find(|c| c.id == id).map(|consent| {
            if consent.status == ConsentStatus::Active.as_str() {
                consent.status = ConsentStatus::Expired.as_str().to_string();
            }
            consent.clone()
        }))
    }

    async fn revoke_if_active(
        &self,
        id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<(consent_model::Model, bool)>> {
        let mut consents = self
            .backend
            .consents
            .lock()
            .expect("in-memory consent store poisoned");
        Ok(consents.iter_mut().find(|c| c.id == id).map(|consent| {
            let transitioned = consent.status == ConsentStatus::Active.as_str();
            if transitioned {
                consent.status = ConsentStatus::Revoked.as_str().to_string();
                consent.revoked_at = Some(revoked_at);
            }
            (consent.clone(), transitioned)
        }))
    }
}

pub struct InMemoryConsentAuditRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryConsentAuditRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ConsentAuditRepository for InMemoryConsentAuditRepository {
    async fn append(
        &self,
        entry: consent_audit_model::Model,
    ) -> AppResult<consent_audit_model::Model> {
        let mut audit_logs = self
            .backend
            .audit_logs
            .lock()
            .expect("in-memory audit store poisoned");
        audit_logs.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_consent(
        &self,
        consent_id: Uuid,
    ) -> AppResult<Vec<consent_audit_model::Model>> {
        let audit_logs = self
            .backend
            .audit_logs
            .lock()
            .expect("in-memory audit store poisoned");
        let mut result: Vec<consent_audit_model::Model> = audit_logs
            .iter()
            .filter(|e| e.consent_id == consent_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

pub struct InMemoryHealthDocumentRepository {
    backend: Arc<InMemoryBackend>,
}

impl InMemoryHealthDocumentRepository {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl HealthDocumentRepository for InMemoryHealthDocumentRepository {
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<health_document_model::Model>> {
        let documents = self
            .backend
            .documents
            .lock()
            .expect("in-memory document store poisoned");
        let mut result: Vec<health_document_model::Model> = documents
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<health_document_model::Model>> {
        let documents = self
            .backend
            .documents
            .lock()
            .expect("in-memory document store poisoned");
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }
}
