// src/repository/health_document_repository.rs
use crate::db::DbPool;
use crate::domain::health_document_model::{self, Entity as HealthDocumentEntity};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sea_orm::{entity::*, query::*};
use uuid::Uuid;

/// ドキュメントストアへの読み取り専用インターフェース
///
/// 書き込みは取り込みパイプライン側の責務。このサービスは
/// 共有アクセス用のサマリー取得にしか使わない。
#[async_trait]
pub trait HealthDocumentRepository: Send + Sync {
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<health_document_model::Model>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<health_document_model::Model>>;
}

pub struct SeaOrmHealthDocumentRepository {
    db: DbPool,
}

impl SeaOrmHealthDocumentRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthDocumentRepository for SeaOrmHealthDocumentRepository {
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<health_document_model::Model>> {
        HealthDocumentEntity::find()
            .filter(health_document_model::Column::OwnerId.eq(owner_id))
            .order_by_desc(health_document_model::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::DbErr)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<health_document_model::Model>> {
        HealthDocumentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::DbErr)
    }
}
