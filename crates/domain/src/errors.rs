use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ペイロード全体を指すロケーション
pub const ROOT_LOC: &str = "body";

/// フィールドエラーの種類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// 必須フィールドが存在しない
    Missing,
    /// null を許可しないフィールドに null が指定された
    Null,
    /// 型が一致しない
    InvalidType { expected: String },
    /// 空文字列が指定された
    Empty,
    /// 文字列の書式が不正（タイムスタンプなど）
    InvalidFormat,
    /// JSON として解析できない
    InvalidJson,
}

impl FieldErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::Missing => "missing",
            FieldErrorKind::Null => "null",
            FieldErrorKind::InvalidType { .. } => "invalid_type",
            FieldErrorKind::Empty => "empty",
            FieldErrorKind::InvalidFormat => "invalid_format",
            FieldErrorKind::InvalidJson => "invalid_json",
        }
    }
}

/// 単一フィールドのバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// ドット区切りのフィールド位置（例: `todos.0.title`）
    pub loc: String,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(loc: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing(loc: &str) -> Self {
        Self::new(loc, FieldErrorKind::Missing, "field required")
    }

    pub fn null(loc: &str) -> Self {
        Self::new(loc, FieldErrorKind::Null, "field may not be null")
    }

    pub fn invalid_type(loc: &str, expected: &str) -> Self {
        Self::new(
            loc,
            FieldErrorKind::InvalidType {
                expected: expected.to_string(),
            },
            format!("value is not a valid {expected}"),
        )
    }

    pub fn empty(loc: &str) -> Self {
        Self::new(loc, FieldErrorKind::Empty, "value may not be empty")
    }

    pub fn invalid_format(loc: &str, message: impl Into<String>) -> Self {
        Self::new(loc, FieldErrorKind::InvalidFormat, message)
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(ROOT_LOC, FieldErrorKind::InvalidJson, message)
    }

    /// 親フィールドの位置を先頭に付与する
    pub fn nested(mut self, prefix: &str) -> Self {
        self.loc = if self.loc == ROOT_LOC {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.loc)
        };
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.loc, self.message)
    }
}

/// ペイロードのバリデーション失敗
///
/// 1つのペイロードで検出されたすべてのフィールドエラーを保持する。
/// 空のエラーリストを持つ値は作られない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error: {}", join_errors(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// エラーリストが空なら `Ok(())` を返す
    pub fn check(errors: Vec<FieldError>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// 指定位置にエラーがあるか
    pub fn has_error_at(&self, loc: &str) -> bool {
        self.errors.iter().any(|e| e.loc == loc)
    }

    pub fn nested(self, prefix: &str) -> Self {
        Self {
            errors: self.errors.into_iter().map(|e| e.nested(prefix)).collect(),
        }
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
