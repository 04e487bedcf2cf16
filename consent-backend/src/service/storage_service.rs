// src/service/storage_service.rs

//! 署名付きURLによるファイルアクセスサービス
//!
//! ドキュメント本体はS3互換ストレージに置かれ、共有アクセス経路へは
//! 期限付きの署名済みダウンロードURLだけを渡す。

use crate::error::AppResult;
use crate::utils::error_helper::internal_server_error;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::{Client, Config};
use std::env;
use std::time::Duration;

/// ストレージ設定
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// MinIO等のローカルS3互換はpath styleを要求する
    pub force_path_style: bool,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "health-documents".to_string()),
            access_key: env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            force_path_style: env::var("STORAGE_FORCE_PATH_STYLE")
                .map(|v| v == "true")
                .unwrap_or(true),
        }
    }
}

/// ストレージサービスのトレイト定義
#[async_trait]
pub trait StorageService: Send + Sync {
    /// 署名付きダウンロードURLを生成
    async fn generate_download_url(&self, key: &str, expires_in_seconds: u64) -> AppResult<String>;
}

/// S3互換ストレージサービスの実装
pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    /// 新しいS3ストレージサービスのインスタンスを作成
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "storage_service",
        );

        let s3_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn generate_download_url(&self, key: &str, expires_in_seconds: u64) -> AppResult<String> {
        let expires_in = Duration::from_secs(expires_in_seconds);
        let presigning_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            internal_server_error(
                e,
                "s3_storage_service::generate_download_url",
                "Failed to create presigning config",
            )
        })?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                internal_server_error(
                    e,
                    "s3_storage_service::generate_download_url",
                    "Failed to generate presigned URL",
                )
            })?;

        Ok(presigned_request.uri().to_string())
    }
}
