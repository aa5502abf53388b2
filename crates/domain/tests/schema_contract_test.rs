use domain::{
    parse_json, FieldErrorKind, Patch, Schema, Todo, TodoCreate, TodoList, TodoUpdate, ROOT_LOC,
};
use serde_json::{json, Value};

/// 既存クライアントが送受信するペイロードとの互換性テスト
fn persisted_payload(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "completed": false,
        "created_at": "2024-01-01T00:00:00",
        "updated_at": null
    })
}

#[test]
fn test_create_payload_defaults() {
    let create: TodoCreate = parse_json(r#"{"title":"ゴミ出し"}"#).unwrap();

    assert_eq!(create.title, "ゴミ出し");
    assert_eq!(create.description, None);
    assert!(!create.completed);
}

#[test]
fn test_create_payload_missing_title() {
    let error = parse_json::<TodoCreate>(r#"{"description":"燃えるゴミ","completed":false}"#)
        .unwrap_err();

    assert_eq!(error.errors().len(), 1);
    let field = &error.errors()[0];
    assert_eq!(field.loc, "title");
    assert_eq!(field.kind, FieldErrorKind::Missing);
}

#[test]
fn test_create_payload_collects_every_error() {
    let error =
        parse_json::<TodoCreate>(r#"{"title":"","description":3,"completed":"false"}"#).unwrap_err();

    let locs: Vec<&str> = error.errors().iter().map(|e| e.loc.as_str()).collect();
    assert_eq!(locs, vec!["title", "description", "completed"]);
}

#[test]
fn test_invalid_json_is_reported_at_body() {
    let error = parse_json::<TodoCreate>(r#"{"title": "#).unwrap_err();

    assert!(error.has_error_at(ROOT_LOC));
    assert_eq!(error.errors()[0].kind, FieldErrorKind::InvalidJson);

    let not_object = parse_json::<TodoUpdate>("[]").unwrap_err();
    assert!(matches!(
        not_object.errors()[0].kind,
        FieldErrorKind::InvalidType { .. }
    ));
}

#[test]
fn test_unknown_fields_are_ignored() {
    let create: TodoCreate = parse_json(r#"{"title":"x","priority":"high"}"#).unwrap();
    assert_eq!(create, TodoCreate::new("x"));
}

#[test]
fn test_empty_update_needs_no_server_fields() {
    let update: TodoUpdate = parse_json("{}").unwrap();

    assert!(update.is_empty());
    assert!(update.validate().is_ok());
}

#[test]
fn test_update_partial_patch() {
    let update: TodoUpdate = parse_json(r#"{"completed":true}"#).unwrap();

    assert_eq!(update.completed, Patch::Set(true));
    assert!(update.title.is_unset());
    assert!(update.description.is_unset());

    let mut todo: Todo = serde_json::from_value(persisted_payload(1, "x")).unwrap();
    assert!(update.apply_to(&mut todo));
    assert!(todo.completed);
    assert_eq!(todo.title, "x");
}

#[test]
fn test_persisted_round_trip_without_loss() {
    let payload = persisted_payload(1, "x");

    let todo: Todo = serde_json::from_value(payload.clone()).unwrap();
    let text = serde_json::to_string(&todo).unwrap();
    let decoded: Todo = parse_json(&text).unwrap();

    assert_eq!(decoded, todo);
    assert_eq!(serde_json::to_value(&decoded).unwrap(), payload);
}

#[test]
fn test_persisted_timestamps_with_offset_are_normalized() {
    let todo: Todo = parse_json(
        r#"{"id":3,"title":"x","created_at":"2024-01-01T09:00:00+09:00","updated_at":"2024-01-02T00:00:00.5Z"}"#,
    )
    .unwrap();

    let json = serde_json::to_value(&todo).unwrap();
    assert_eq!(json["created_at"], "2024-01-01T00:00:00");
    assert_eq!(json["updated_at"], "2024-01-02T00:00:00.500");
}

#[test]
fn test_persisted_id_out_of_range() {
    let error = parse_json::<Todo>(
        r#"{"id":9223372036854775808,"title":"x","created_at":"2024-01-01T00:00:00"}"#,
    )
    .unwrap_err();

    assert_eq!(error.errors().len(), 1);
    assert_eq!(error.errors()[0].loc, "id");
    assert_eq!(error.errors()[0].kind, FieldErrorKind::InvalidFormat);
    assert_eq!(error.errors()[0].message, "integer out of range");
}

#[test]
fn test_empty_list_is_an_array() {
    let json = serde_json::to_value(TodoList::default()).unwrap();

    assert_eq!(json, json!({ "todos": [] }));
    assert!(json["todos"].is_array());
}

#[test]
fn test_list_round_trip_keeps_order() {
    let payload = json!({
        "todos": [persisted_payload(3, "c"), persisted_payload(1, "a"), persisted_payload(2, "b")]
    });

    let list: TodoList = serde_json::from_value(payload.clone()).unwrap();
    let titles: Vec<&str> = list.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "a", "b"]);

    assert_eq!(serde_json::to_value(&list).unwrap(), payload);
}

#[test]
fn test_list_element_errors_are_indexed() {
    let mut broken = persisted_payload(2, "b");
    broken["completed"] = json!(0);

    let text = json!({ "todos": [persisted_payload(1, "a"), broken] }).to_string();
    let error = parse_json::<TodoList>(&text).unwrap_err();

    assert_eq!(error.errors().len(), 1);
    assert_eq!(error.errors()[0].loc, "todos.1.completed");
}

#[test]
fn test_serde_deserialize_rejects_string_completed() {
    let result = serde_json::from_str::<TodoCreate>(r#"{"title":"x","completed":"true"}"#);
    assert!(result.is_err());

    let result = serde_json::from_str::<TodoUpdate>(r#"{"completed":1}"#);
    assert!(result.is_err());
}
