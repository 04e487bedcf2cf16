// src/domain/consent_model.rs
use crate::domain::consent_scope::ConsentScope;
use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub recipient_name: String,
    pub recipient_role: String,
    pub scopes: Json,
    pub duration_type: String,
    #[sea_orm(nullable)]
    pub custom_expiry_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text")]
    pub purpose: String,
    pub status: String,
    #[sea_orm(unique)]
    pub share_token: String,
    pub expires_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::consent_audit_model::Entity")]
    ConsentAuditLog,
}

impl Related<super::consent_audit_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsentAuditLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 同意ステータスの定義
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    Active,
    Expired,
    Revoked,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConsentStatus::Active => "active",
            ConsentStatus::Expired => "expired",
            ConsentStatus::Revoked => "revoked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ConsentStatus::Active),
            "expired" => Some(ConsentStatus::Expired),
            "revoked" => Some(ConsentStatus::Revoked),
            _ => None,
        }
    }
}

// 受領者ロールの定義（情報提供のみで認可には影響しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    Doctor,
    Lab,
    Insurance,
    Family,
    Other,
}

impl RecipientRole {
    pub fn as_str(&self) -> &str {
        match self {
            RecipientRole::Doctor => "doctor",
            RecipientRole::Lab => "lab",
            RecipientRole::Insurance => "insurance",
            RecipientRole::Family => "family",
            RecipientRole::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(RecipientRole::Doctor),
            "lab" => Some(RecipientRole::Lab),
            "insurance" => Some(RecipientRole::Insurance),
            "family" => Some(RecipientRole::Family),
            "other" => Some(RecipientRole::Other),
            _ => None,
        }
    }
}

// 有効期間タイプの定義
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentDurationType {
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "custom")]
    Custom,
}

impl ConsentDurationType {
    pub fn as_str(&self) -> &str {
        match self {
            ConsentDurationType::TwentyFourHours => "24h",
            ConsentDurationType::SevenDays => "7d",
            ConsentDurationType::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "24h" => Some(ConsentDurationType::TwentyFourHours),
            "7d" => Some(ConsentDurationType::SevenDays),
            "custom" => Some(ConsentDurationType::Custom),
            _ => None,
        }
    }

    /// 固定期間の長さ。custom は作成リクエストの日時をそのまま使うため None
    pub fn fixed_duration(&self) -> Option<Duration> {
        match self {
            ConsentDurationType::TwentyFourHours => Some(Duration::hours(24)),
            ConsentDurationType::SevenDays => Some(Duration::days(7)),
            ConsentDurationType::Custom => None,
        }
    }
}

impl Model {
    /// 保存ステータスと現在時刻から有効ステータスを計算する
    ///
    /// revoked は期限に関係なく終端。active で期限超過なら expired。
    /// ステータスの鮮度はこの関数が唯一の判定点で、永続化は最適化にすぎない。
    pub fn effective_status(&self, now: DateTime<Utc>) -> ConsentStatus {
        match ConsentStatus::from_str(&self.status) {
            Some(ConsentStatus::Active) if now > self.expires_at => ConsentStatus::Expired,
            Some(status) => status,
            // 不明な保存値はアクセス不能として扱う
            None => ConsentStatus::Expired,
        }
    }

    /// JSONカラムから付与スコープ一覧を復元する
    pub fn scope_list(&self) -> Vec<ConsentScope> {
        self.scopes
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().and_then(ConsentScope::from_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// スコープ一覧をJSONカラム表現に変換する
pub fn scopes_to_json(scopes: &[ConsentScope]) -> Json {
    Json::Array(
        scopes
            .iter()
            .map(|s| Json::String(s.as_str().to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consent_scope::ConsentScope;

    fn sample_consent(status: &str, expires_at: DateTime<Utc>) -> Model {
        Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            recipient_name: "Dr. Sato".to_string(),
            recipient_role: "doctor".to_string(),
            scopes: scopes_to_json(&[ConsentScope::Documents]),
            duration_type: "24h".to_string(),
            custom_expiry_date: None,
            purpose: "Follow-up visit".to_string(),
            status: status.to_string(),
            share_token: "token".to_string(),
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_consent_within_deadline_stays_active() {
        let consent = sample_consent("active", Utc::now() + Duration::hours(1));
        assert_eq!(consent.effective_status(Utc::now()), ConsentStatus::Active);
    }

    #[test]
    fn active_consent_past_deadline_is_expired() {
        let consent = sample_consent("active", Utc::now() - Duration::seconds(1));
        assert_eq!(consent.effective_status(Utc::now()), ConsentStatus::Expired);
    }

    #[test]
    fn revoked_consent_ignores_expiry() {
        // revoked は時間経過より優先される
        let consent = sample_consent("revoked", Utc::now() - Duration::hours(1));
        assert_eq!(consent.effective_status(Utc::now()), ConsentStatus::Revoked);
    }

    #[test]
    fn scope_list_round_trips() {
        let consent = sample_consent("active", Utc::now());
        assert_eq!(consent.scope_list(), vec![ConsentScope::Documents]);
    }

    #[test]
    fn fixed_durations_match_duration_type() {
        assert_eq!(
            ConsentDurationType::TwentyFourHours.fixed_duration(),
            Some(Duration::hours(24))
        );
        assert_eq!(
            ConsentDurationType::SevenDays.fixed_duration(),
            Some(Duration::days(7))
        );
        assert_eq!(ConsentDurationType::Custom.fixed_duration(), None);
    }
}
