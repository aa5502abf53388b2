use crate::errors::AppError;
use std::env;
use tracing::{debug, warn};

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn from_string(format: &str) -> Result<Self, AppError> {
        match format.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => {
                warn!(log_format = format, "不正なLOG_FORMAT");
                Err(AppError::Configuration(format!(
                    "LOG_FORMAT must be 'json' or 'pretty': {format}"
                )))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の検索関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let log_format = match lookup("LOG_FORMAT") {
            Some(format) => LogFormat::from_string(&format)?,
            None => LogFormat::Json,
        };

        let config = Config {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            log_format,
        };
        debug!(
            environment = %config.environment,
            log_format = config.log_format.as_str(),
            "設定読み込み完了"
        );
        Ok(config)
    }

    /// エラーレスポンスに詳細を含めるか（開発環境のみ）
    pub fn include_error_details(&self) -> bool {
        matches!(self.environment.as_str(), "dev" | "local")
    }
}
