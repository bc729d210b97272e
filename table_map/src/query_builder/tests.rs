use crate::descriptor::TableDescriptor;
use crate::dialects::{PostgresDriver, SqliteDriver};
use crate::errors::MapError;
use crate::expiration::ExpiringDriver;
use crate::query_builder::{BoundParameter, Command, CommandFabric, Paging, Predicate, NOW_PARAMETER};
use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;
use type_mapping::{ColumnType, SqlValue};

const TIMEOUT: Duration = Duration::from_secs(5);

fn items() -> TableDescriptor {
    TableDescriptor::builder("items")
        .key_column("id", ColumnType::Integer)
        .column("val", ColumnType::Text)
        .nullable_column("expires", ColumnType::DateTimeOffset)
        .build()
        .unwrap()
}

fn pairs() -> TableDescriptor {
    TableDescriptor::builder("pairs")
        .key_column("a", ColumnType::Text)
        .key_column("b", ColumnType::Integer)
        .column("payload", ColumnType::Json)
        .build()
        .unwrap()
}

fn sqlite() -> SqliteDriver {
    let pool = SqlitePoolOptions::new()
        .connect_lazy("sqlite::memory:")
        .unwrap();
    SqliteDriver::new(pool, None, TIMEOUT)
}

fn postgres() -> PostgresDriver {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/test")
        .unwrap();
    PostgresDriver::new(pool, None, TIMEOUT)
}

fn new_command() -> Command {
    Command::new(TIMEOUT)
}

/// A command as an expiring connection would hand it out
fn command_with_now() -> Command {
    let mut command = new_command();
    command.add_parameter(BoundParameter::new(
        NOW_PARAMETER,
        SqlValue::Timestamp(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        Some(ColumnType::DateTimeOffset),
    ));
    command
}

fn key(id: i64) -> Vec<(String, SqlValue)> {
    vec![("id".to_string(), SqlValue::Integer(id))]
}

fn bound_names(command: &Command) -> Vec<&str> {
    command.bound_parameters().map(|p| p.name()).collect()
}

// ========================================
// Plain rendering
// ========================================

#[tokio::test]
async fn test_select_one_sqlite() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let command = fabric.select_one(new_command(), &key(1)).unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "id", "val", "expires" FROM "main"."items" WHERE "id" = ?1 LIMIT 1"#
    );
    assert_eq!(bound_names(&command), vec!["@where:id"]);
    assert_eq!(command.projection().len(), 3);
    assert_eq!(command.operation(), "get");
    assert_eq!(command.table(), "items");
}

#[tokio::test]
async fn test_select_one_postgres() {
    let driver = postgres();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let command = fabric.select_one(new_command(), &key(1)).unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "id", "val", "expires" FROM "public"."items" WHERE "id" = $1 FETCH FIRST 1 ROWS ONLY"#
    );
}

#[tokio::test]
async fn test_select_all_is_ordered_by_key() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let command = fabric.select_all(new_command()).unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "id", "val", "expires" FROM "main"."items" ORDER BY "id""#
    );
    assert_eq!(command.bound_parameters().count(), 0);

    let keys = fabric.select_keys(new_command()).unwrap();
    assert_eq!(
        keys.text(),
        r#"SELECT "id" FROM "main"."items" ORDER BY "id""#
    );
}

#[tokio::test]
async fn test_paging_per_dialect() {
    let table = items();

    let lite = sqlite();
    let command = CommandFabric::new(&lite, &table)
        .select_page(new_command(), Paging::new(20, 10))
        .unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "id", "val", "expires" FROM "main"."items" ORDER BY "id" LIMIT 10 OFFSET 20"#
    );

    let pg = postgres();
    let command = CommandFabric::new(&pg, &table)
        .select_page(new_command(), Paging::new(20, 10))
        .unwrap();
    assert_eq!(
        command.text(),
        r#"SELECT "id", "val", "expires" FROM "public"."items" ORDER BY "id" OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"#
    );
}

#[tokio::test]
async fn test_count_and_exists() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let count = fabric.count(new_command()).unwrap();
    assert_eq!(count.text(), r#"SELECT COUNT(*) FROM "main"."items""#);
    assert_eq!(count.projection()[0].column_type(), ColumnType::BigInt);

    let exists = fabric.exists(new_command(), &key(3)).unwrap();
    assert_eq!(
        exists.text(),
        r#"SELECT EXISTS (SELECT 1 FROM "main"."items" WHERE "id" = ?1)"#
    );
    assert_eq!(exists.projection()[0].column_type(), ColumnType::Boolean);
}

#[tokio::test]
async fn test_distinct_queries() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let distinct = fabric.distinct(new_command(), "val", None).unwrap();
    assert_eq!(
        distinct.text(),
        r#"SELECT DISTINCT "val" FROM "main"."items" ORDER BY "val""#
    );

    let paged = fabric
        .distinct(new_command(), "val", Some(Paging::new(0, 5)))
        .unwrap();
    assert_eq!(
        paged.text(),
        r#"SELECT DISTINCT "val" FROM "main"."items" ORDER BY "val" LIMIT 5 OFFSET 0"#
    );

    let count = fabric.distinct_count(new_command(), "val").unwrap();
    assert_eq!(
        count.text(),
        r#"SELECT COUNT(*) FROM (SELECT DISTINCT "val" FROM "main"."items") AS distinct_rows"#
    );
    assert_eq!(count.projection()[0].name(), "count");
}

#[tokio::test]
async fn test_write_statements() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);
    let row = vec![
        ("id".to_string(), SqlValue::Integer(1)),
        ("val".to_string(), SqlValue::Text("a".to_string())),
    ];

    let insert = fabric.insert(new_command(), &row).unwrap();
    assert_eq!(
        insert.text(),
        r#"INSERT INTO "main"."items" ("id", "val") VALUES (?1, ?2)"#
    );
    assert_eq!(bound_names(&insert), vec!["@set:id", "@set:val"]);

    let update = fabric
        .update(new_command(), &key(1), &row[1..], &[])
        .unwrap();
    assert_eq!(
        update.text(),
        r#"UPDATE "main"."items" SET "val" = ?1 WHERE "id" = ?2"#
    );
    assert_eq!(bound_names(&update), vec!["@set:val", "@where:id"]);

    let delete = fabric.delete(new_command(), &key(1), &[]).unwrap();
    assert_eq!(delete.text(), r#"DELETE FROM "main"."items" WHERE "id" = ?1"#);

    let clear = fabric.delete(new_command(), &[], &[]).unwrap();
    assert_eq!(clear.text(), r#"DELETE FROM "main"."items""#);
}

#[tokio::test]
async fn test_column_named_like_a_filter_keeps_its_own_value() {
    let driver = sqlite();
    let table = TableDescriptor::builder("flags")
        .key_column("id", ColumnType::Integer)
        .column("where_id", ColumnType::Text)
        .build()
        .unwrap();
    let fabric = CommandFabric::new(&driver, &table);
    let values = vec![("where_id".to_string(), SqlValue::Text("b".to_string()))];

    let update = fabric
        .update(new_command(), &key(1), &values, &[])
        .unwrap();
    assert_eq!(
        update.text(),
        r#"UPDATE "main"."flags" SET "where_id" = ?1 WHERE "id" = ?2"#
    );
    let bound: Vec<&SqlValue> = update.bound_parameters().map(|p| p.value()).collect();
    assert_eq!(
        bound,
        vec![&SqlValue::Text("b".to_string()), &SqlValue::Integer(1)]
    );
}

#[tokio::test]
async fn test_merge_per_dialect() {
    let table = items();
    let row = vec![
        ("id".to_string(), SqlValue::Integer(1)),
        ("val".to_string(), SqlValue::Text("a".to_string())),
    ];

    let pg = postgres();
    let merge = CommandFabric::new(&pg, &table).merge(new_command(), &row).unwrap();
    assert_eq!(
        merge.text(),
        r#"INSERT INTO "public"."items" ("id", "val") VALUES ($1, $2) ON CONFLICT ("id") DO UPDATE SET "val" = EXCLUDED."val" RETURNING (xmax = 0) AS inserted"#
    );
    assert_eq!(merge.projection()[0].name(), "inserted");

    let lite = sqlite();
    let merge = CommandFabric::new(&lite, &table).merge(new_command(), &row).unwrap();
    assert!(!merge.text().contains("RETURNING"));
    assert!(merge.projection().is_empty());
}

#[tokio::test]
async fn test_create_table() {
    let lite = sqlite();
    let table = items();
    let create = CommandFabric::new(&lite, &table)
        .create_table(new_command())
        .unwrap();
    assert_eq!(
        create.text(),
        r#"CREATE TABLE IF NOT EXISTS "main"."items" ("id" INTEGER NOT NULL, "val" TEXT NOT NULL, "expires" TEXT, PRIMARY KEY ("id"))"#
    );

    let pg = postgres();
    let create = CommandFabric::new(&pg, &table)
        .create_table(new_command())
        .unwrap();
    assert!(create.text().contains(r#""expires" TIMESTAMPTZ,"#));
}

#[tokio::test]
async fn test_table_schema_overrides_driver_default() {
    let driver = postgres();
    let table = TableDescriptor::builder("items")
        .schema("cache")
        .key_column("id", ColumnType::Integer)
        .build()
        .unwrap();
    let command = CommandFabric::new(&driver, &table).count(new_command()).unwrap();
    assert_eq!(command.text(), r#"SELECT COUNT(*) FROM "cache"."items""#);
}

// ========================================
// Binding order
// ========================================

#[tokio::test]
async fn test_composite_key_binds_in_marker_order() {
    let driver = postgres();
    let table = pairs();
    let fabric = CommandFabric::new(&driver, &table);
    let filter = vec![
        ("a".to_string(), SqlValue::Text("x".to_string())),
        ("b".to_string(), SqlValue::Integer(2)),
    ];

    let command = fabric.select_one(new_command(), &filter).unwrap();
    assert!(command.text().contains(r#"WHERE "a" = $1 AND "b" = $2"#));
    let values: Vec<_> = command.bound_parameters().map(|p| p.value().clone()).collect();
    assert_eq!(
        values,
        vec![SqlValue::Text("x".to_string()), SqlValue::Integer(2)]
    );
}

#[tokio::test]
async fn test_staged_but_unreferenced_parameters_are_not_bound() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let command = fabric.delete(command_with_now(), &key(1), &[]).unwrap();
    assert_eq!(command.staged_parameters().len(), 2);
    assert_eq!(bound_names(&command), vec!["@where:id"]);
}

#[tokio::test]
async fn test_extra_predicates_follow_key_terms() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let command = fabric
        .update(
            new_command(),
            &key(1),
            &[("expires".to_string(), SqlValue::Null)],
            &[Predicate::not_null("expires")],
        )
        .unwrap();
    assert_eq!(
        command.text(),
        r#"UPDATE "main"."items" SET "expires" = ?1 WHERE "id" = ?2 AND "expires" IS NOT NULL"#
    );
}

// ========================================
// Visibility predicate
// ========================================

#[tokio::test]
async fn test_expiring_driver_filters_reads() {
    let driver = ExpiringDriver::new(Arc::new(sqlite()), "expires");
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let get = fabric.select_one(command_with_now(), &key(1)).unwrap();
    assert_eq!(
        get.text(),
        r#"SELECT "id", "val", "expires" FROM "main"."items" WHERE "id" = ?1 AND ("expires" IS NULL OR "expires" > ?2) LIMIT 1"#
    );
    assert_eq!(bound_names(&get), vec!["@where:id", NOW_PARAMETER]);

    let all = fabric.select_all(command_with_now()).unwrap();
    assert_eq!(
        all.text(),
        r#"SELECT "id", "val", "expires" FROM "main"."items" WHERE ("expires" IS NULL OR "expires" > ?1) ORDER BY "id""#
    );

    let count = fabric.count(command_with_now()).unwrap();
    assert_eq!(
        count.text(),
        r#"SELECT COUNT(*) FROM "main"."items" WHERE ("expires" IS NULL OR "expires" > ?1)"#
    );

    let exists = fabric.exists(command_with_now(), &key(1)).unwrap();
    assert_eq!(
        exists.text(),
        r#"SELECT EXISTS (SELECT 1 FROM "main"."items" WHERE "id" = ?1 AND ("expires" IS NULL OR "expires" > ?2))"#
    );

    let distinct_count = fabric.distinct_count(command_with_now(), "val").unwrap();
    assert_eq!(
        distinct_count.text(),
        r#"SELECT COUNT(*) FROM (SELECT DISTINCT "val" FROM "main"."items" WHERE ("expires" IS NULL OR "expires" > ?1)) AS distinct_rows"#
    );
}

#[tokio::test]
async fn test_expiring_driver_predicate_precedes_paging() {
    let driver = ExpiringDriver::new(Arc::new(postgres()), "expires");
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let page = fabric
        .select_page(command_with_now(), Paging::new(0, 10))
        .unwrap();
    assert_eq!(
        page.text(),
        r#"SELECT "id", "val", "expires" FROM "public"."items" WHERE ("expires" IS NULL OR "expires" > $1) ORDER BY "id" OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"#
    );
}

#[tokio::test]
async fn test_expiring_driver_leaves_writes_alone() {
    let driver = ExpiringDriver::new(Arc::new(sqlite()), "expires");
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let delete = fabric.delete(command_with_now(), &key(1), &[]).unwrap();
    assert_eq!(delete.text(), r#"DELETE FROM "main"."items" WHERE "id" = ?1"#);

    let update = fabric
        .update(
            command_with_now(),
            &key(1),
            &[("val".to_string(), SqlValue::Text("b".to_string()))],
            &[],
        )
        .unwrap();
    assert!(!update.text().contains("IS NULL OR"));
    assert!(!bound_names(&update).contains(&NOW_PARAMETER));
}

#[tokio::test]
async fn test_purge_predicate_binds_now() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let purge = fabric
        .delete(
            command_with_now(),
            &[],
            &[Predicate::at_or_before("expires", NOW_PARAMETER)],
        )
        .unwrap();
    assert_eq!(
        purge.text(),
        r#"DELETE FROM "main"."items" WHERE "expires" <= ?1"#
    );
    assert_eq!(bound_names(&purge), vec![NOW_PARAMETER]);
}

// ========================================
// Rejections
// ========================================

#[tokio::test]
async fn test_read_without_now_is_missing_parameter() {
    let driver = ExpiringDriver::new(Arc::new(sqlite()), "expires");
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let result = fabric.count(new_command());
    assert!(matches!(result, Err(MapError::MissingParameter(name)) if name == NOW_PARAMETER));
}

#[tokio::test]
async fn test_unknown_column_is_rejected() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let filter = vec![("nope".to_string(), SqlValue::Integer(1))];
    assert!(matches!(
        fabric.select_one(new_command(), &filter),
        Err(MapError::Mapping(_))
    ));
    assert!(matches!(
        fabric.distinct(new_command(), "nope", None),
        Err(MapError::Mapping(_))
    ));
}

#[tokio::test]
async fn test_null_key_is_rejected() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let filter = vec![("id".to_string(), SqlValue::Null)];
    assert!(matches!(
        fabric.delete(new_command(), &filter, &[]),
        Err(MapError::Mapping(_))
    ));
}

#[tokio::test]
async fn test_incompatible_value_is_rejected() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let filter = vec![("id".to_string(), SqlValue::Text("one".to_string()))];
    assert!(matches!(
        fabric.select_one(new_command(), &filter),
        Err(MapError::Conversion(_))
    ));
}

#[tokio::test]
async fn test_update_without_assignments_is_rejected() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    assert!(matches!(
        fabric.update(new_command(), &key(1), &[], &[]),
        Err(MapError::Mapping(_))
    ));
}

#[tokio::test]
async fn test_insert_without_columns_is_rejected() {
    let driver = sqlite();
    let table = items();
    let fabric = CommandFabric::new(&driver, &table);

    let result = fabric.insert(new_command(), &[]);
    assert!(matches!(result, Err(MapError::Template(_))));
}
