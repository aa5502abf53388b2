use crate::errors::{FieldError, ValidationError};
use crate::fields::{self, FieldReader, Schema};
use crate::patch::Patch;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ToDo ID（永続化層が採番する整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TodoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.is_empty() {
        errors.push(FieldError::empty("title"));
    }
}

/// ToDo作成リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct TodoCreate {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl TodoCreate {
    /// タイトルのみ指定し、残りはデフォルト値で作成
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

impl Schema for TodoCreate {
    const NAME: &'static str = "TodoCreate";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value)?;
        let title = reader.required("title", fields::non_empty_string);
        let description = reader.optional("description", fields::string);
        let completed = reader.with_default("completed", fields::boolean, false);
        reader.finish()?;

        Ok(Self {
            // finish() が成功した時点で必須フィールドは揃っている
            title: title.unwrap_or_default(),
            description,
            completed,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        validate_title(&self.title, &mut errors);
        ValidationError::check(errors)
    }
}

impl TryFrom<Value> for TodoCreate {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// ToDo更新リクエスト（部分更新）
///
/// 省略されたフィールドは変更しない。`description` のみ null による消去を受け付ける。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct TodoUpdate {
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unset")]
    pub completed: Patch<bool>,
}

impl TodoUpdate {
    /// 変更内容を含まない更新か
    pub fn is_empty(&self) -> bool {
        self.title.is_unset() && self.description.is_unset() && self.completed.is_unset()
    }

    /// 永続化済みの ToDo に反映する。変更があれば true
    ///
    /// `id`・`created_at`・`updated_at` には触れない。
    pub fn apply_to(&self, todo: &mut Todo) -> bool {
        let title_changed = self.title.merge_into(&mut todo.title);
        let description_changed = self.description.merge_into_option(&mut todo.description);
        let completed_changed = self.completed.merge_into(&mut todo.completed);

        title_changed || description_changed || completed_changed
    }
}

impl Schema for TodoUpdate {
    const NAME: &'static str = "TodoUpdate";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value)?;
        let title = reader.patch("title", false, fields::non_empty_string);
        let description = reader.patch("description", true, fields::string);
        let completed = reader.patch("completed", false, fields::boolean);
        reader.finish()?;

        Ok(Self {
            title,
            description,
            completed,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        match &self.title {
            Patch::Set(title) => validate_title(title, &mut errors),
            Patch::Null => errors.push(FieldError::null("title")),
            Patch::Unset => {}
        }
        if self.completed.is_null() {
            errors.push(FieldError::null("completed"));
        }
        ValidationError::check(errors)
    }
}

impl TryFrom<Value> for TodoUpdate {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// ToDo の属性を公開する型（データベースの行など）
pub trait TodoAttributes {
    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn completed(&self) -> bool;
    fn created_at(&self) -> NaiveDateTime;
    fn updated_at(&self) -> Option<NaiveDateTime>;
}

/// 永続化済み・レスポンス用の ToDo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// 作成日時（タイムゾーンなし）
    ///
    /// オフセット付きの入力は UTC に変換され、オフセットは保持されない。
    /// `"2024-01-01T09:00:00+09:00"` は `"2024-01-01T00:00:00"` として再出力される。
    pub created_at: NaiveDateTime,
    /// 更新日時。`created_at` と同じく UTC に正規化され、オフセットは保持されない
    pub updated_at: Option<NaiveDateTime>,
}

impl Todo {
    /// 属性を持つ任意の型から構築し、検証する
    pub fn from_attributes<A: TodoAttributes + ?Sized>(source: &A) -> Result<Self, ValidationError> {
        let todo = Self {
            id: TodoId::new(source.id()),
            title: source.title().to_string(),
            description: source.description().map(str::to_string),
            completed: source.completed(),
            created_at: source.created_at(),
            updated_at: source.updated_at(),
        };
        todo.validate()?;
        Ok(todo)
    }
}

impl TodoAttributes for Todo {
    fn id(&self) -> i64 {
        self.id.value()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn completed(&self) -> bool {
        self.completed
    }

    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    fn updated_at(&self) -> Option<NaiveDateTime> {
        self.updated_at
    }
}

impl Schema for Todo {
    const NAME: &'static str = "Todo";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value)?;
        let id = reader.required("id", fields::integer);
        let title = reader.required("title", fields::non_empty_string);
        let description = reader.optional("description", fields::string);
        let completed = reader.with_default("completed", fields::boolean, false);
        let created_at = reader.required("created_at", fields::timestamp);
        let updated_at = reader.optional("updated_at", fields::timestamp);
        reader.finish()?;

        match (id, title, created_at) {
            (Some(id), Some(title), Some(created_at)) => Ok(Self {
                id: TodoId::new(id),
                title,
                description,
                completed,
                created_at,
                updated_at,
            }),
            // finish() が成功していれば到達しない
            _ => Err(FieldError::missing("id").into()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        validate_title(&self.title, &mut errors);
        ValidationError::check(errors)
    }
}

impl TryFrom<Value> for Todo {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// ToDo 一覧のレスポンス
///
/// `todos` は空でも常に配列として出力される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(todos: Vec<Todo>) -> Self {
        Self { todos }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
        self.todos.iter()
    }
}

impl Schema for TodoList {
    const NAME: &'static str = "TodoList";

    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value)?;
        let empty = Vec::new();
        let items = reader.required("todos", fields::array).unwrap_or(&empty);

        let mut todos = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match Todo::from_value(item) {
                Ok(todo) => todos.push(todo),
                Err(e) => reader.extend(e.nested(&format!("todos.{index}"))),
            }
        }
        reader.finish()?;

        Ok(Self { todos })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for (index, todo) in self.todos.iter().enumerate() {
            if let Err(e) = todo.validate() {
                errors.extend(e.nested(&format!("todos.{index}")).into_errors());
            }
        }
        ValidationError::check(errors)
    }
}

impl TryFrom<Value> for TodoList {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<Vec<Todo>> for TodoList {
    fn from(todos: Vec<Todo>) -> Self {
        Self::new(todos)
    }
}

impl IntoIterator for TodoList {
    type Item = Todo;
    type IntoIter = std::vec::IntoIter<Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.todos.into_iter()
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a Todo;
    type IntoIter = std::slice::Iter<'a, Todo>;

    fn into_iter(self) -> Self::IntoIter {
        self.todos.iter()
    }
}
