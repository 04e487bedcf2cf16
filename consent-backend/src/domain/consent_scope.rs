// src/domain/consent_scope.rs
use serde::{Deserialize, Serialize};

// 同意で付与できるデータカテゴリー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentScope {
    Documents,
    Emergency,
    Insights,
    Timeline,
}

impl ConsentScope {
    pub fn as_str(&self) -> &str {
        match self {
            ConsentScope::Documents => "documents",
            ConsentScope::Emergency => "emergency",
            ConsentScope::Insights => "insights",
            ConsentScope::Timeline => "timeline",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "documents" => Some(ConsentScope::Documents),
            "emergency" => Some(ConsentScope::Emergency),
            "insights" => Some(ConsentScope::Insights),
            "timeline" => Some(ConsentScope::Timeline),
            _ => None,
        }
    }
}

/// 共有アクセス時に要求されるデータカテゴリー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCategory {
    Documents,
    Emergency,
    Insights,
    Timeline,
}

/// 付与スコープが要求カテゴリーへのアクセスを許可するかを判定する
///
/// タイムラインはドキュメントの制限ビューなので、documents カテゴリーは
/// documents / timeline どちらのスコープでも許可される。他のカテゴリーは
/// 完全一致のみ。一致するスコープがなければ常に拒否。
pub fn is_permitted(granted_scopes: &[ConsentScope], requested: DataCategory) -> bool {
    match requested {
        DataCategory::Documents => granted_scopes
            .iter()
            .any(|s| matches!(s, ConsentScope::Documents | ConsentScope::Timeline)),
        DataCategory::Emergency => granted_scopes.contains(&ConsentScope::Emergency),
        DataCategory::Insights => granted_scopes.contains(&ConsentScope::Insights),
        DataCategory::Timeline => granted_scopes.contains(&ConsentScope::Timeline),
    }
}
