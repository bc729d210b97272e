//! Integration tests for the plain table map
//!
//! Every test runs against its own in-memory SQLite database.

use config::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use table_map::prelude::*;
use table_map::SerdeValueMapper;

fn items() -> Arc<TableDescriptor> {
    Arc::new(
        TableDescriptor::builder("items")
            .key_column("id", ColumnType::Integer)
            .column("val", ColumnType::Text)
            .nullable_column("expires", ColumnType::DateTimeOffset)
            .build()
            .unwrap(),
    )
}

async fn items_map() -> TableMap<i32, String, SqliteDriver> {
    let driver = Arc::new(SqliteDriver::from_config(&DatabaseConfig::sqlite_memory()).unwrap());
    let map = TableMap::new(
        driver,
        items(),
        ColumnKeyMapper::<i32>::new("id"),
        ColumnValueMapper::<String>::new("val"),
    );
    map.ensure_table().await.unwrap();
    map
}

#[tokio::test]
async fn test_put_reports_created_then_replaced() {
    let map = items_map().await;

    assert_eq!(map.put(&1, &"a".to_string()).await.unwrap(), PutOutcome::Created);
    assert_eq!(map.put(&1, &"b".to_string()).await.unwrap(), PutOutcome::Replaced);
    assert_eq!(map.get(&1).await.unwrap(), Some("b".to_string()));
    assert_eq!(map.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_get_missing_key() {
    let map = items_map().await;
    assert_eq!(map.get(&42).await.unwrap(), None);
    assert!(!map.contains_key(&42).await.unwrap());
}

#[tokio::test]
async fn test_remove() {
    let map = items_map().await;
    map.put(&1, &"a".to_string()).await.unwrap();

    assert!(map.remove(&1).await.unwrap());
    assert!(!map.remove(&1).await.unwrap());
    assert!(!map.contains_key(&1).await.unwrap());
}

#[tokio::test]
async fn test_entries_and_keys_follow_key_order() {
    let map = items_map().await;
    for (id, val) in [(3, "c"), (1, "a"), (2, "b")] {
        map.put(&id, &val.to_string()).await.unwrap();
    }

    assert_eq!(map.keys().await.unwrap(), vec![1, 2, 3]);
    assert_eq!(
        map.entries().await.unwrap(),
        vec![
            (1, "a".to_string()),
            (2, "b".to_string()),
            (3, "c".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_page() {
    let map = items_map().await;
    for id in 1..=5 {
        map.put(&id, &format!("v{}", id)).await.unwrap();
    }

    let page = map.page(1, 2).await.unwrap();
    assert_eq!(page, vec![(2, "v2".to_string()), (3, "v3".to_string())]);
    assert!(map.page(10, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_distinct_values() {
    let map = items_map().await;
    for (id, val) in [(1, "x"), (2, "y"), (3, "x"), (4, "z")] {
        map.put(&id, &val.to_string()).await.unwrap();
    }

    assert_eq!(
        map.distinct("val").await.unwrap(),
        vec![
            SqlValue::Text("x".to_string()),
            SqlValue::Text("y".to_string()),
            SqlValue::Text("z".to_string()),
        ]
    );
    assert_eq!(map.distinct_count("val").await.unwrap(), 3);
    assert_eq!(
        map.distinct_page("val", 1, 1).await.unwrap(),
        vec![SqlValue::Text("y".to_string())]
    );
}

#[tokio::test]
async fn test_clear() {
    let map = items_map().await;
    map.put(&1, &"a".to_string()).await.unwrap();
    map.put(&2, &"b".to_string()).await.unwrap();

    assert_eq!(map.clear().await.unwrap(), 2);
    assert_eq!(map.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upsert() {
    let map = items_map().await;
    map.upsert(&1, &"a".to_string()).await.unwrap();
    map.upsert(&1, &"b".to_string()).await.unwrap();
    assert_eq!(map.get(&1).await.unwrap(), Some("b".to_string()));
}

#[tokio::test]
async fn test_value_column_named_like_a_filter_parameter() {
    let driver = Arc::new(SqliteDriver::from_config(&DatabaseConfig::sqlite_memory()).unwrap());
    let table = Arc::new(
        TableDescriptor::builder("flags")
            .key_column("id", ColumnType::Integer)
            .column("where_id", ColumnType::Text)
            .build()
            .unwrap(),
    );
    let map = TableMap::new(
        driver,
        table,
        ColumnKeyMapper::<i32>::new("id"),
        ColumnValueMapper::<String>::new("where_id"),
    );
    map.ensure_table().await.unwrap();

    assert_eq!(map.put(&1, &"a".to_string()).await.unwrap(), PutOutcome::Created);
    assert_eq!(map.put(&1, &"b".to_string()).await.unwrap(), PutOutcome::Replaced);
    assert_eq!(map.get(&1).await.unwrap(), Some("b".to_string()));
    map.upsert(&2, &"c".to_string()).await.unwrap();
    assert_eq!(map.get(&2).await.unwrap(), Some("c".to_string()));
}

#[tokio::test]
async fn test_command_timeout_releases_the_connection() {
    let map = items_map().await;
    let hurried = map.clone().with_command_timeout(Duration::ZERO);

    let err = hurried.count().await.unwrap_err();
    assert!(err.is_timeout(), "expected a timeout, got {err:?}");

    // The pool holds a single connection, so this only succeeds if it came back
    map.ensure_table().await.unwrap();
    map.put(&1, &"a".to_string()).await.unwrap();
    assert_eq!(map.get(&1).await.unwrap(), Some("a".to_string()));
}

#[tokio::test]
async fn test_ensure_table_is_idempotent() {
    let map = items_map().await;
    map.put(&1, &"a".to_string()).await.unwrap();
    map.ensure_table().await.unwrap();
    assert_eq!(map.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_column_is_a_mapping_error() {
    let map = items_map().await;
    let result = map.distinct("nope").await;
    assert!(matches!(result, Err(MapError::Mapping(_))));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    hits: i64,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[tokio::test]
async fn test_struct_values_through_serde() {
    let table = Arc::new(
        TableDescriptor::builder("sessions")
            .key_column("token", ColumnType::Uuid)
            .column("user", ColumnType::Text)
            .column("hits", ColumnType::BigInt)
            .nullable_column("data", ColumnType::Json)
            .build()
            .unwrap(),
    );
    let driver = Arc::new(SqliteDriver::from_config(&DatabaseConfig::sqlite_memory()).unwrap());
    let map = TableMap::new(
        driver,
        Arc::clone(&table),
        ColumnKeyMapper::<uuid::Uuid>::new("token"),
        SerdeValueMapper::<Session>::new(table),
    );
    map.ensure_table().await.unwrap();

    let token = uuid::Uuid::new_v4();
    let session = Session {
        user: "ada".to_string(),
        hits: 3,
        data: Some(serde_json::json!({"theme": "dark"})),
    };
    assert_eq!(map.put(&token, &session).await.unwrap(), PutOutcome::Created);
    assert_eq!(map.get(&token).await.unwrap(), Some(session));
}
