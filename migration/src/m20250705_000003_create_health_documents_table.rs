use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 健康記録ドキュメントテーブル
        // 書き込みは取り込みパイプライン側、このサービスからは読み取りのみ
        manager
            .create_table(
                Table::create()
                    .table(HealthDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HealthDocuments::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()"),
                    )
                    .col(ColumnDef::new(HealthDocuments::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(HealthDocuments::Title).text().not_null())
                    .col(ColumnDef::new(HealthDocuments::Category).string().not_null())
                    .col(ColumnDef::new(HealthDocuments::Provider).string().null())
                    .col(
                        ColumnDef::new(HealthDocuments::DocumentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(HealthDocuments::FileType).string().not_null())
                    .col(ColumnDef::new(HealthDocuments::StorageKey).text().not_null())
                    .col(
                        ColumnDef::new(HealthDocuments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_health_documents_owner_id")
                    .table(HealthDocuments::Table)
                    .col(HealthDocuments::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HealthDocuments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HealthDocuments {
    Table,
    Id,
    OwnerId,
    Title,
    Category,
    Provider,
    DocumentDate,
    FileType,
    StorageKey,
    CreatedAt,
}
