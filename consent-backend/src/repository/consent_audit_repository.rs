// src/repository/consent_audit_repository.rs
use crate::db::DbPool;
use crate::domain::consent_audit_model::{self, Entity as ConsentAuditEntity};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sea_orm::{entity::*, query::*, ActiveModelTrait, Set};
use uuid::Uuid;

/// 監査ログストアの抽象（追記と読み取りのみ。更新・削除は存在しない）
#[async_trait]
pub trait ConsentAuditRepository: Send + Sync {
    async fn append(
        &self,
        entry: consent_audit_model::Model,
    ) -> AppResult<consent_audit_model::Model>;

    /// 同意の監査証跡を新しい順で取得
    async fn find_by_consent(
        &self,
        consent_id: Uuid,
    ) -> AppResult<Vec<consent_audit_model::Model>>;
}

pub struct SeaOrmConsentAuditRepository {
    db: DbPool,
}

impl SeaOrmConsentAuditRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConsentAuditRepository for SeaOrmConsentAuditRepository {
    async fn append(
        &self,
        entry: consent_audit_model::Model,
    ) -> AppResult<consent_audit_model::Model> {
        let active_model = consent_audit_model::ActiveModel {
            id: Set(entry.id),
            consent_id: Set(entry.consent_id),
            action: Set(entry.action),
            actor_type: Set(entry.actor_type),
            actor_id: Set(entry.actor_id),
            details: Set(entry.details),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            created_at: Set(entry.created_at),
        };

        active_model.insert(&self.db).await.map_err(AppError::DbErr)
    }

    async fn find_by_consent(
        &self,
        consent_id: Uuid,
    ) -> AppResult<Vec<consent_audit_model::Model>> {
        ConsentAuditEntity::find()
            .filter(consent_audit_model::Column::ConsentId.eq(consent_id))
            .order_by_desc(consent_audit_model::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::DbErr)
    }
}
