// src/repository/consent_repository.rs
use crate::db::DbPool;
use crate::domain::consent_audit_model;
use crate::domain::consent_model::{self, ConsentStatus, Entity as ConsentEntity};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ActiveModelTrait, Set, TransactionTrait};
use uuid::Uuid;

/// 同意ストアの抽象
///
/// ライフサイクルエンジンはバックエンド依存の詳細を知らない。
/// 本番はSeaORM実装、テストはインメモリ実装を差し込む。
#[async_trait]
pub trait ConsentRepository: Send + Sync {
    /// 同意と grant 監査エントリーを1つの論理操作として永続化する
    async fn create_with_grant(
        &self,
        consent: consent_model::Model,
        grant_entry: consent_audit_model::Model,
    ) -> AppResult<consent_model::Model>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<consent_model::Model>>;

    async fn find_by_token(&self, token: &str) -> AppResult<Option<consent_model::Model>>;

    /// オーナーの同意一覧を作成日時の降順で取得
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<consent_model::Model>>;

    /// active の場合のみ expired へ遷移させ、最新の行を返す
    ///
    /// 条件付きUPDATEなので並行する読み取りが競合しても冪等。
    async fn mark_expired_if_active(&self, id: Uuid) -> AppResult<Option<consent_model::Model>>;

    /// active の場合のみ revoked へ遷移させる
    ///
    /// 戻り値の bool はこの呼び出しが実際に遷移を行ったかどうか。
    /// 既に終端状態ならそのままの行と false を返す（エラーにはしない）。
    async fn revoke_if_active(
        &self,
        id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<(consent_model::Model, bool)>>;
}

pub struct SeaOrmConsentRepository {
    db: DbPool,
}

impl SeaOrmConsentRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn to_active_model(consent: consent_model::Model) -> consent_model::ActiveModel {
        consent_model::ActiveModel {
            id: Set(consent.id),
            owner_id: Set(consent.owner_id),
            recipient_name: Set(consent.recipient_name),
            recipient_role: Set(consent.recipient_role),
            scopes: Set(consent.scopes),
            duration_type: Set(consent.duration_type),
            custom_expiry_date: Set(consent.custom_expiry_date),
            purpose: Set(consent.purpose),
            status: Set(consent.status),
            share_token: Set(consent.share_token),
            expires_at: Set(consent.expires_at),
            revoked_at: Set(consent.revoked_at),
            created_at: Set(consent.created_at),
        }
    }
}

#[async_trait]
impl ConsentRepository for SeaOrmConsentRepository {
    async fn create_with_grant(
        &self,
        consent: consent_model::Model,
        grant_entry: consent_audit_model::Model,
    ) -> AppResult<consent_model::Model> {
        // 同意と grant エントリーは同一トランザクションで書く。
        // 片方だけ成功した状態を呼び出し側に見せない。
        let txn = self.db.begin().await.map_err(AppError::DbErr)?;

        let created = Self::to_active_model(consent)
            .insert(&txn)
            .await
            .map_err(AppError::DbErr)?;

        let audit_entry = consent_audit_model::ActiveModel {
            id: Set(grant_entry.id),
            consent_id: Set(grant_entry.consent_id),
            action: Set(grant_entry.action),
            actor_type: Set(grant_entry.actor_type),
            actor_id: Set(grant_entry.actor_id),
            details: Set(grant_entry.details),
            ip_address: Set(grant_entry.ip_address),
            user_agent: Set(grant_entry.user_agent),
            created_at: Set(grant_entry.created_at),
        };
        audit_entry.insert(&txn).await.map_err(AppError::DbErr)?;

        txn.commit().await.map_err(AppError::DbErr)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<consent_model::Model>> {
        ConsentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::DbErr)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<consent_model::Model>> {
        ConsentEntity::find()
            .filter(consent_model::Column::ShareToken.eq(token))
            .one(&self.db)
            .await
            .map_err(AppError::DbErr)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<consent_model::Model>> {
        ConsentEntity::find()
            .filter(consent_model::Column::OwnerId.eq(owner_id))
            .order_by_desc(consent_model::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::DbErr)
    }

    async fn mark_expired_if_active(&self, id: Uuid) -> AppResult<Option<consent_model::Model>> {
        // ステータス条件付きUPDATE。終端状態を上書きしない
        ConsentEntity::update_many()
            .col_expr(
                consent_model::Column::Status,
                Expr::value(ConsentStatus::Expired.as_str()),
            )
            .filter(consent_model::Column::Id.eq(id))
            .filter(consent_model::Column::Status.eq(ConsentStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::DbErr)?;

        self.find_by_id(id).await
    }

    async fn revoke_if_active(
        &self,
        id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<(consent_model::Model, bool)>> {
        let result = ConsentEntity::update_many()
            .col_expr(
                consent_model::Column::Status,
                Expr::value(ConsentStatus::Revoked.as_str()),
            )
            .col_expr(
                consent_model::Column::RevokedAt,
                Expr::value(Some(revoked_at)),
            )
            .filter(consent_model::Column::Id.eq(id))
            .filter(consent_model::Column::Status.eq(ConsentStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::DbErr)?;

        let transitioned = result.rows_affected > 0;

        Ok(self
            .find_by_id(id)
            .await?
            .map(|consent| (consent, transitioned)))
    }
}
