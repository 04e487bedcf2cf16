// src/domain/health_document_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

// 取り込みパイプラインが書き込むドキュメントテーブル。
// このサービスからは読み取り専用で、公開面にはサマリー項目のみを出す。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "health_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub category: String,
    #[sea_orm(nullable)]
    pub provider: Option<String>,
    #[sea_orm(nullable)]
    pub document_date: Option<DateTime<Utc>>,
    pub file_type: String,
    #[sea_orm(column_type = "Text")]
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
