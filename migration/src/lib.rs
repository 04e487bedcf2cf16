// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 同意テーブルと監査ログのマイグレーション
mod m20250705_000001_create_consents_table;
mod m20250705_000002_create_consent_audit_logs_table;

// ドキュメント参照用テーブル（取り込みパイプラインが書き込む）
mod m20250705_000003_create_health_documents_table;

// パフォーマンス向けインデックス
mod m20250706_000001_add_consent_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 基本テーブル作成（依存関係なし）
            Box::new(m20250705_000001_create_consents_table::Migration),
            Box::new(m20250705_000003_create_health_documents_table::Migration),
            // 2. 依存テーブル作成（consentsテーブルに依存）
            Box::new(m20250705_000002_create_consent_audit_logs_table::Migration),
            // 3. インデックス追加
            Box::new(m20250706_000001_add_consent_indexes::Migration),
        ]
    }
}
