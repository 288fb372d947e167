/*
 * Responsibility
 * - 起動時に致命的なエラーの定義 (設定不正 / ルート設定不正 / I/O)
 * - リクエスト単位の認証失敗はここに来ない (middleware 内で 401/403 に変換済み)
 */
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::{ConfigurationError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("security configuration error: {0}")]
    Security(#[from] ConfigurationError),

    #[error("invalid AUTH_USERS: {0}")]
    Users(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
