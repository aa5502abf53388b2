use domain::{FieldError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// アプリケーション全体で使用されるエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // ドメインエラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // システムエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

/// エラーの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
}

/// エラーの重要度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Error,
    Critical,
}

/// エラーメタデータ
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
}

impl ErrorMetadata {
    fn new(code: &str, category: ErrorCategory, severity: ErrorSeverity) -> Self {
        Self {
            code: code.to_string(),
            category,
            severity,
        }
    }
}

impl AppError {
    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        match self {
            AppError::Validation(_) => {
                ErrorMetadata::new("VALIDATION_ERROR", ErrorCategory::Client, ErrorSeverity::Info)
            }
            AppError::Serialization(_) => ErrorMetadata::new(
                "SERIALIZATION_ERROR",
                ErrorCategory::Server,
                ErrorSeverity::Error,
            ),
            AppError::Configuration(_) => ErrorMetadata::new(
                "CONFIGURATION_ERROR",
                ErrorCategory::Server,
                ErrorSeverity::Critical,
            ),
            AppError::Io(_) => {
                ErrorMetadata::new("IO_ERROR", ErrorCategory::Server, ErrorSeverity::Error)
            }
            AppError::Internal(_) => ErrorMetadata::new(
                "INTERNAL_ERROR",
                ErrorCategory::Server,
                ErrorSeverity::Critical,
            ),
        }
    }

    /// HTTPステータスコードを取得
    pub fn http_status_code(&self) -> u16 {
        match self.metadata().category {
            ErrorCategory::Client => 400,
            ErrorCategory::Server => 500,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) => "入力データが無効です".to_string(),
            _ => "予期しないエラーが発生しました".to_string(),
        }
    }

    /// フィールド単位のエラー（バリデーションエラー以外は空）
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(e) => e.errors(),
            _ => &[],
        }
    }
}

/// リクエストIDを生成
pub fn generate_request_id() -> String {
    ulid::Ulid::new().to_string()
}

/// 標準化されたエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// エラーコード
    pub code: String,
    /// ユーザー向けメッセージ
    pub message: String,
    /// 詳細情報（開発環境のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub request_id: String,
    pub timestamp: String,
    /// フィールド単位のエラー
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    /// AppErrorからErrorResponseを作成
    pub fn from_app_error(error: &AppError, request_id: String, include_details: bool) -> Self {
        let metadata = error.metadata();

        Self {
            code: metadata.code,
            message: error.user_message(),
            details: if include_details {
                Some(error.to_string())
            } else {
                None
            },
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            errors: error.field_errors().to_vec(),
        }
    }

    /// JSONレスポンスとして返すためのシリアライズ
    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::Serialization(e.to_string()))
    }
}
