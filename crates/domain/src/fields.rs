use crate::errors::{FieldError, ValidationError, ROOT_LOC};
use crate::patch::Patch;
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

/// JSON 値から検証済みの型を構築できるスキーマ
pub trait Schema: Sized {
    /// スキーマ名（ログ出力用）
    const NAME: &'static str;

    fn from_value(value: &Value) -> Result<Self, ValidationError>;

    fn validate(&self) -> Result<(), ValidationError>;
}

/// JSON テキストを解析してスキーマを検証する
///
/// serde の `Deserialize` 経由ではエラーがメッセージに平坦化されるため、
/// フィールド単位のエラーが必要な場合はこちらを使う。
pub fn parse_json<T: Schema>(text: &str) -> Result<T, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        debug!(schema = T::NAME, error = %e, "JSON解析エラー");
        ValidationError::from(FieldError::invalid_json(e.to_string()))
    })?;

    T::from_value(&value).inspect_err(|e| {
        debug!(schema = T::NAME, error_count = e.errors().len(), "バリデーションエラー");
    })
}

/// JSON オブジェクトからフィールドを読み出し、エラーを蓄積する
pub(crate) struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(value: &'a Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: Vec::new(),
            }),
            _ => Err(FieldError::invalid_type(ROOT_LOC, "object").into()),
        }
    }

    fn lookup(&self, name: &str) -> Patch<&'a Value> {
        match self.object.get(name) {
            None => Patch::Unset,
            Some(Value::Null) => Patch::Null,
            Some(value) => Patch::Set(value),
        }
    }

    fn convert<T>(
        &mut self,
        name: &str,
        value: &'a Value,
        conv: impl FnOnce(&str, &'a Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match conv(name, value) {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// 必須かつ非 null のフィールド
    pub(crate) fn required<T>(
        &mut self,
        name: &str,
        conv: impl FnOnce(&str, &'a Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match self.lookup(name) {
            Patch::Unset => {
                self.errors.push(FieldError::missing(name));
                None
            }
            Patch::Null => {
                self.errors.push(FieldError::null(name));
                None
            }
            Patch::Set(value) => self.convert(name, value, conv),
        }
    }

    /// 省略可能かつ null 許可のフィールド
    pub(crate) fn optional<T>(
        &mut self,
        name: &str,
        conv: impl FnOnce(&str, &'a Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match self.lookup(name) {
            Patch::Unset | Patch::Null => None,
            Patch::Set(value) => self.convert(name, value, conv),
        }
    }

    /// 省略時はデフォルト値、null は不可のフィールド
    pub(crate) fn with_default<T>(
        &mut self,
        name: &str,
        conv: impl FnOnce(&str, &'a Value) -> Result<T, FieldError>,
        default: T,
    ) -> T {
        match self.lookup(name) {
            Patch::Unset => default,
            Patch::Null => {
                self.errors.push(FieldError::null(name));
                default
            }
            Patch::Set(value) => self.convert(name, value, conv).unwrap_or(default),
        }
    }

    /// 部分更新のフィールド
    pub(crate) fn patch<T>(
        &mut self,
        name: &str,
        nullable: bool,
        conv: impl FnOnce(&str, &'a Value) -> Result<T, FieldError>,
    ) -> Patch<T> {
        match self.lookup(name) {
            Patch::Unset => Patch::Unset,
            Patch::Null if nullable => Patch::Null,
            Patch::Null => {
                self.errors.push(FieldError::null(name));
                Patch::Unset
            }
            Patch::Set(value) => match self.convert(name, value, conv) {
                Some(v) => Patch::Set(v),
                None => Patch::Unset,
            },
        }
    }

    /// 入れ子のスキーマで検出したエラーを取り込む
    pub(crate) fn extend(&mut self, error: ValidationError) {
        self.errors.extend(error.into_errors());
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        ValidationError::check(self.errors)
    }
}

pub(crate) fn string(loc: &str, value: &Value) -> Result<String, FieldError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FieldError::invalid_type(loc, "string"))
}

pub(crate) fn non_empty_string(loc: &str, value: &Value) -> Result<String, FieldError> {
    let s = string(loc, value)?;
    if s.is_empty() {
        return Err(FieldError::empty(loc));
    }
    Ok(s)
}

pub(crate) fn boolean(loc: &str, value: &Value) -> Result<bool, FieldError> {
    value
        .as_bool()
        .ok_or_else(|| FieldError::invalid_type(loc, "boolean"))
}

/// 64bit 符号付き整数を読み出す
///
/// 整数だが範囲外の値は型エラーではなく書式エラーとして報告する。
pub(crate) fn integer(loc: &str, value: &Value) -> Result<i64, FieldError> {
    let Value::Number(number) = value else {
        return Err(FieldError::invalid_type(loc, "integer"));
    };
    if let Some(i) = number.as_i64() {
        return Ok(i);
    }

    let out_of_range = number.is_u64()
        || number
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f.abs() >= i64::MAX as f64);
    if out_of_range {
        return Err(FieldError::invalid_format(loc, "integer out of range"));
    }
    Err(FieldError::invalid_type(loc, "integer"))
}

pub(crate) fn array<'a>(loc: &str, value: &'a Value) -> Result<&'a Vec<Value>, FieldError> {
    value
        .as_array()
        .ok_or_else(|| FieldError::invalid_type(loc, "array"))
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// タイムスタンプを解析する
///
/// オフセットなしの ISO-8601 をそのまま受け付け、RFC 3339 のオフセット付きは UTC に正規化する。
pub(crate) fn timestamp(loc: &str, value: &Value) -> Result<NaiveDateTime, FieldError> {
    let s = value
        .as_str()
        .ok_or_else(|| FieldError::invalid_type(loc, "datetime"))?;

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.naive_utc())
        .map_err(|_| FieldError::invalid_format(loc, format!("invalid datetime: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldErrorKind;
    use chrono::Timelike;
    use serde_json::json;

    #[test]
    fn test_reader_rejects_non_object() {
        let value = json!(["title"]);
        let error = FieldReader::new(&value).err().unwrap();
        assert!(error.has_error_at(ROOT_LOC));
    }

    #[test]
    fn test_reader_collects_all_errors() {
        let value = json!({ "completed": "yes", "count": 1.5 });
        let mut reader = FieldReader::new(&value).unwrap();

        assert_eq!(reader.required("title", string), None);
        assert!(!reader.with_default("completed", boolean, false));
        assert_eq!(reader.optional("count", integer), None);

        let errors = reader.finish().unwrap_err().into_errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].kind, FieldErrorKind::Missing);
        assert_eq!(errors[1].loc, "completed");
        assert_eq!(errors[2].loc, "count");
    }

    #[test]
    fn test_reader_patch_null_handling() {
        let value = json!({ "description": null, "title": null });
        let mut reader = FieldReader::new(&value).unwrap();

        assert_eq!(reader.patch("description", true, string), Patch::Null);
        assert_eq!(reader.patch("title", false, string), Patch::Unset);
        assert_eq!(reader.patch("completed", false, boolean), Patch::Unset);

        let error = reader.finish().unwrap_err();
        assert_eq!(error.errors().len(), 1);
        assert_eq!(error.errors()[0].kind, FieldErrorKind::Null);
    }

    #[test]
    fn test_strict_scalars() {
        assert!(boolean("completed", &json!("true")).is_err());
        assert!(boolean("completed", &json!(1)).is_err());
        assert!(integer("id", &json!(true)).is_err());
        assert!(integer("id", &json!(1.5)).is_err());
        assert_eq!(integer("id", &json!(7)).unwrap(), 7);
        assert_eq!(
            non_empty_string("title", &json!("")).unwrap_err().kind,
            FieldErrorKind::Empty
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        for big in [
            json!(9_223_372_036_854_775_808_u64),
            json!(u64::MAX),
            serde_json::from_str::<Value>("100000000000000000000").unwrap(),
        ] {
            let error = integer("id", &big).unwrap_err();
            assert_eq!(error.kind, FieldErrorKind::InvalidFormat, "{big}");
            assert_eq!(error.message, "integer out of range");
        }

        assert_eq!(integer("id", &json!(i64::MAX)).unwrap(), i64::MAX);
        assert_eq!(integer("id", &json!(i64::MIN)).unwrap(), i64::MIN);
        assert!(matches!(
            integer("id", &json!(1.5)).unwrap_err().kind,
            FieldErrorKind::InvalidType { .. }
        ));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();

        assert_eq!(timestamp("t", &json!("2024-01-01T00:00:00")).unwrap(), expected);
        assert_eq!(timestamp("t", &json!("2024-01-01 00:00:00")).unwrap(), expected);
        assert_eq!(timestamp("t", &json!("2024-01-01T09:00:00+09:00")).unwrap(), expected);
        assert_eq!(timestamp("t", &json!("2024-01-01T00:00:00Z")).unwrap(), expected);

        let with_fraction = timestamp("t", &json!("2024-01-01T00:00:00.250")).unwrap();
        assert_eq!(with_fraction.nanosecond(), 250_000_000);

        assert_eq!(
            timestamp("t", &json!("yesterday")).unwrap_err().kind,
            FieldErrorKind::InvalidFormat
        );
        assert!(matches!(
            timestamp("t", &json!(0)).unwrap_err().kind,
            FieldErrorKind::InvalidType { .. }
        ));
    }
}
