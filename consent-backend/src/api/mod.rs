// src/api/mod.rs
use crate::service::consent_service::ConsentService;
use crate::service::share_access_service::ShareAccessService;
use crate::utils::jwt::JwtManager;
use std::sync::Arc;

pub mod dto;
pub mod handlers;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub consent_service: Arc<ConsentService>,
    pub share_access_service: Arc<ShareAccessService>,
    pub jwt_manager: Arc<JwtManager>,
    pub access_token_cookie_name: String,
}
