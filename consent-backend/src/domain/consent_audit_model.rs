// src/domain/consent_audit_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub consent_id: Uuid,
    pub action: String,
    pub actor_type: String,
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,
    #[sea_orm(nullable)]
    pub details: Option<Json>,
    #[sea_orm(nullable)]
    pub ip_address: Option<String>,
    #[sea_orm(nullable)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consent_model::Entity",
        from = "Column::ConsentId",
        to = "super::consent_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Consent,
}

impl Related<super::consent_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 監査アクションの定義
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConsentAuditAction {
    // 同意ライフサイクル
    Grant,
    Revoke,

    // 共有リンク経由のアクセス
    Access,

    // その他
    Custom(String),
}

impl ConsentAuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            ConsentAuditAction::Grant => "grant",
            ConsentAuditAction::Revoke => "revoke",
            ConsentAuditAction::Access => "access",
            ConsentAuditAction::Custom(action) => action,
        }
    }
}

// 行為者タイプの定義
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    /// 記録のオーナー（セッション認証済み）
    User,
    /// 匿名の共有リンク保持者
    Recipient,
}

impl ActorType {
    pub fn as_str(&self) -> &str {
        match self {
            ActorType::User => "user",
            ActorType::Recipient => "recipient",
        }
    }
}

// 監査ログエントリービルダー
pub struct ConsentAuditBuilder {
    consent_id: Uuid,
    action: ConsentAuditAction,
    actor_type: ActorType,
    actor_id: Option<String>,
    details: Option<serde_json::Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl ConsentAuditBuilder {
    pub fn new(consent_id: Uuid, action: ConsentAuditAction, actor_type: ActorType) -> Self {
        Self {
            consent_id,
            action,
            actor_type,
            actor_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Model {
        Model {
            id: Uuid::new_v4(),
            consent_id: self.consent_id,
            action: self.action.as_str().to_string(),
            actor_type: self.actor_type.as_str().to_string(),
            actor_id: self.actor_id,
            details: self.details,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_populates_entry_fields() {
        let consent_id = Uuid::new_v4();
        let entry = ConsentAuditBuilder::new(
            consent_id,
            ConsentAuditAction::Access,
            ActorType::Recipient,
        )
        .actor_id("203.0.113.10")
        .details(serde_json::json!({ "endpoint": "documents" }))
        .ip_address("203.0.113.10")
        .user_agent("curl/8.0")
        .build();

        assert_eq!(entry.consent_id, consent_id);
        assert_eq!(entry.action, "access");
        assert_eq!(entry.actor_type, "recipient");
        assert_eq!(entry.actor_id.as_deref(), Some("203.0.113.10"));
        assert!(entry.details.is_some());
    }

    #[test]
    fn action_strings_are_stable() {
        assert_eq!(ConsentAuditAction::Grant.as_str(), "grant");
        assert_eq!(ConsentAuditAction::Revoke.as_str(), "revoke");
        assert_eq!(ConsentAuditAction::Access.as_str(), "access");
    }
}
