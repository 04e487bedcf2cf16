use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // オーナー別一覧（作成日時降順）用
        manager
            .create_index(
                Index::create()
                    .name("idx_consents_owner_id_created_at")
                    .table(Consents::Table)
                    .col(Consents::OwnerId)
                    .col(Consents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 共有トークンによる解決用
        manager
            .create_index(
                Index::create()
                    .name("idx_consents_share_token")
                    .table(Consents::Table)
                    .col(Consents::ShareToken)
                    .to_owned(),
            )
            .await?;

        // 遅延期限切れ判定のスキャン用
        manager
            .create_index(
                Index::create()
                    .name("idx_consents_status_expires_at")
                    .table(Consents::Table)
                    .col(Consents::Status)
                    .col(Consents::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // 監査証跡の時系列取得用
        manager
            .create_index(
                Index::create()
                    .name("idx_consent_audit_logs_consent_id_created_at")
                    .table(ConsentAuditLogs::Table)
                    .col(ConsentAuditLogs::ConsentId)
                    .col(ConsentAuditLogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_consents_owner_id_created_at")
                    .table(Consents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_consents_share_token")
                    .table(Consents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_consents_status_expires_at")
                    .table(Consents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_consent_audit_logs_consent_id_created_at")
                    .table(ConsentAuditLogs::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Consents {
    Table,
    OwnerId,
    ShareToken,
    Status,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum ConsentAuditLogs {
    Table,
    ConsentId,
    CreatedAt,
}
