use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 同意テーブル
        manager
            .create_table(
                Table::create()
                    .table(Consents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consents::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(Consents::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Consents::RecipientName).text().not_null())
                    .col(
                        ColumnDef::new(Consents::RecipientRole)
                            .string()
                            .not_null(),
                    )
                    // 付与スコープはJSON配列として保持
                    .col(ColumnDef::new(Consents::Scopes).json_binary().not_null())
                    .col(ColumnDef::new(Consents::DurationType).string().not_null())
                    .col(
                        ColumnDef::new(Consents::CustomExpiryDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Consents::Purpose).text().not_null())
                    .col(
                        ColumnDef::new(Consents::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Consents::ShareToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Consents::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Consents::RevokedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Consents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Consents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Consents {
    Table,
    Id,
    OwnerId,
    RecipientName,
    RecipientRole,
    Scopes,
    DurationType,
    CustomExpiryDate,
    Purpose,
    Status,
    ShareToken,
    ExpiresAt,
    RevokedAt,
    CreatedAt,
}
