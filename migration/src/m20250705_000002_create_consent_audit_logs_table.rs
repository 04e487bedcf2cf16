use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 同意監査ログテーブル（追記専用）
        manager
            .create_table(
                Table::create()
                    .table(ConsentAuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsentAuditLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(
                        ColumnDef::new(ConsentAuditLogs::ConsentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAuditLogs::Action).string().not_null())
                    .col(
                        ColumnDef::new(ConsentAuditLogs::ActorType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsentAuditLogs::ActorId).string().null())
                    .col(
                        ColumnDef::new(ConsentAuditLogs::Details)
                            .json_binary()
                            .null(),
                    )
                    .col(ColumnDef::new(ConsentAuditLogs::IpAddress).string().null())
                    .col(ColumnDef::new(ConsentAuditLogs::UserAgent).string().null())
                    .col(
                        ColumnDef::new(ConsentAuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consent_audit_logs_consent")
                            .from(ConsentAuditLogs::Table, ConsentAuditLogs::ConsentId)
                            .to(Consents::Table, Consents::Id)
                            // 同意は通常運用では削除されないが、整合性は保証しておく
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConsentAuditLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ConsentAuditLogs {
    Table,
    Id,
    ConsentId,
    Action,
    ActorType,
    ActorId,
    Details,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Consents {
    Table,
    Id,
}
