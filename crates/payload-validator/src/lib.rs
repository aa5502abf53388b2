use clap::ValueEnum;
use domain::{parse_json, Schema, Todo, TodoCreate, TodoList, TodoUpdate};
use serde::Serialize;
use shared::{generate_request_id, AppError, ErrorResponse};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

/// 検証対象のスキーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// ToDo作成リクエスト
    Create,
    /// ToDo更新リクエスト
    Update,
    /// 永続化済みの ToDo
    Todo,
    /// ToDo 一覧
    List,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Create => "create",
            Shape::Update => "update",
            Shape::Todo => "todo",
            Shape::List => "list",
        }
    }
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

/// 実行結果（標準出力に書く内容と終了コード）
#[derive(Debug)]
pub struct Outcome {
    pub exit_code: i32,
    pub output: String,
}

fn normalize<T: Schema + Serialize>(text: &str) -> Result<String, AppError> {
    let value: T = parse_json(text)?;
    serde_json::to_string_pretty(&value).map_err(|e| AppError::Serialization(e.to_string()))
}

/// ペイロードを検証し、正規化した JSON を返す
pub fn validate_payload(shape: Shape, text: &str) -> Result<String, AppError> {
    match shape {
        Shape::Create => normalize::<TodoCreate>(text),
        Shape::Update => normalize::<TodoUpdate>(text),
        Shape::Todo => normalize::<Todo>(text),
        Shape::List => normalize::<TodoList>(text),
    }
}

/// 入力を読み込む。パスが None または "-" の場合は標準入力
pub fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    read_input_from(path, std::io::stdin())
}

/// パスが None または "-" の場合は `fallback` から読み込む
pub fn read_input_from(path: Option<&Path>, mut fallback: impl Read) -> Result<String, AppError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            fallback.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// エラーを標準エラーレスポンスと終了コードに変換する
///
/// バリデーションエラーのみ EXIT_INVALID、それ以外（設定・I/O・初期化）は EXIT_FAILURE。
pub fn failure_outcome(error: &AppError, include_details: bool) -> Outcome {
    let exit_code = match error {
        AppError::Validation(_) => EXIT_INVALID,
        _ => EXIT_FAILURE,
    };

    let response = ErrorResponse::from_app_error(error, generate_request_id(), include_details);
    Outcome {
        exit_code,
        output: response.to_json().unwrap_or_else(|e| e.to_string()),
    }
}

pub fn run(shape: Shape, path: Option<&Path>, include_details: bool) -> Outcome {
    let result = read_input(path).and_then(|text| validate_payload(shape, &text));

    match result {
        Ok(output) => {
            info!(shape = shape.as_str(), "ペイロード検証成功");
            Outcome {
                exit_code: EXIT_OK,
                output,
            }
        }
        Err(e) => {
            match &e {
                AppError::Validation(v) => warn!(
                    shape = shape.as_str(),
                    error_count = v.errors().len(),
                    "ペイロード検証失敗: {}",
                    v
                ),
                other => error!(shape = shape.as_str(), "ペイロード処理エラー: {}", other),
            }
            failure_outcome(&e, include_details)
        }
    }
}
