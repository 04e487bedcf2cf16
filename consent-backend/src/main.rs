// src/main.rs
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use consent_backend::api::handlers::consent_handler::consent_router;
use consent_backend::api::handlers::share_handler::share_router;
use consent_backend::api::handlers::system_handler::system_router;
use consent_backend::api::AppState;
use consent_backend::config::Config;
use consent_backend::db::create_db_pool;
use consent_backend::repository::consent_audit_repository::SeaOrmConsentAuditRepository;
use consent_backend::repository::consent_repository::SeaOrmConsentRepository;
use consent_backend::repository::health_document_repository::SeaOrmHealthDocumentRepository;
use consent_backend::service::consent_service::ConsentService;
use consent_backend::service::share_access_service::ShareAccessService;
use consent_backend::service::storage_service::{S3StorageService, StorageConfig};
use consent_backend::utils::jwt::JwtManager;
use migration::{Migrator, MigratorTrait};

// アクセストークンの有効期間（分）
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consent_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting Consent Backend server...");

    // 設定を読み込む
    let app_config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(environment = %app_config.environment, "Configuration loaded");

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created successfully.");

    // マイグレーションを適用
    Migrator::up(&db_pool, None).await?;

    // リポジトリの作成
    let consent_repo = Arc::new(SeaOrmConsentRepository::new(db_pool.clone()));
    let audit_repo = Arc::new(SeaOrmConsentAuditRepository::new(db_pool.clone()));
    let document_repo = Arc::new(SeaOrmHealthDocumentRepository::new(db_pool.clone()));

    // サービスの作成
    let storage = Arc::new(S3StorageService::new(StorageConfig::from_env()));
    let consent_service = Arc::new(ConsentService::new(
        consent_repo,
        audit_repo.clone(),
        app_config.frontend_url.clone(),
    ));
    let share_access_service = Arc::new(ShareAccessService::new(
        consent_service.clone(),
        audit_repo,
        document_repo,
        storage,
    ));

    let jwt_manager = Arc::new(JwtManager::from_secret(
        &app_config.jwt_secret,
        ACCESS_TOKEN_EXPIRY_MINUTES,
    ));

    let app_state = AppState {
        consent_service,
        share_access_service,
        jwt_manager,
        access_token_cookie_name: app_config.security.access_token_cookie_name.clone(),
    };

    // CORSの設定
    let allowed_origins: Vec<axum::http::HeaderValue> = app_config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    // ルーターの設定
    let app_router = axum::Router::new()
        .merge(system_router())
        .merge(consent_router(app_state.clone()))
        .merge(share_router(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // サーバーの起動
    let server_addr = app_config.server_addr();
    tracing::info!("Router configured. Server listening on {}", server_addr);

    let listener = TcpListener::bind(&server_addr).await?;
    axum::serve(listener, app_router.into_make_service()).await?;

    Ok(())
}
