//! Statement template catalog
//!
//! One set of skeletons per dialect, built once when a driver is created.

use super::template::{Clause, StatementKind, StatementTemplate};
use config::Dialect;
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dialect: Dialect,
    templates: HashMap<StatementKind, StatementTemplate>,
}

impl TemplateCatalog {
    pub fn for_dialect(dialect: Dialect) -> Self {
        let templates = StatementKind::ALL
            .iter()
            .map(|&kind| (kind, build(dialect, kind)))
            .collect();
        Self { dialect, templates }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn get(&self, kind: StatementKind) -> StatementTemplate {
        self.templates
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| build(self.dialect, kind))
    }
}

fn text(s: &'static str) -> Clause {
    Clause::Text(Cow::Borrowed(s))
}

fn filter() -> Clause {
    Clause::Filter(Vec::new())
}

fn paging(s: &'static str) -> Clause {
    Clause::Paging(Cow::Borrowed(s))
}

fn top1(dialect: Dialect) -> Clause {
    match dialect {
        Dialect::Postgres => paging("FETCH FIRST 1 ROWS ONLY"),
        Dialect::Sqlite => paging("LIMIT 1"),
    }
}

fn skip_take(dialect: Dialect) -> Clause {
    match dialect {
        Dialect::Postgres => paging("OFFSET {skip} ROWS FETCH NEXT {take} ROWS ONLY"),
        Dialect::Sqlite => paging("LIMIT {take} OFFSET {skip}"),
    }
}

fn build(dialect: Dialect, kind: StatementKind) -> StatementTemplate {
    const SELECT: &str = "SELECT {columns} FROM {table}";
    const SELECT_DISTINCT: &str = "SELECT DISTINCT {columns} FROM {table}";

    let clauses = match kind {
        StatementKind::Select => vec![text(SELECT), filter(), Clause::OrderBy],
        StatementKind::SelectTop1 => vec![text(SELECT), filter(), Clause::OrderBy, top1(dialect)],
        StatementKind::SelectSkipTake => {
            vec![text(SELECT), filter(), Clause::OrderBy, skip_take(dialect)]
        }
        StatementKind::SelectDistinct => vec![text(SELECT_DISTINCT), filter(), Clause::OrderBy],
        StatementKind::SelectDistinctCount => vec![
            text("SELECT COUNT(*) FROM (SELECT DISTINCT {columns} FROM {table}"),
            filter(),
            text(") AS distinct_rows"),
        ],
        StatementKind::SelectDistinctSkipTake => vec![
            text(SELECT_DISTINCT),
            filter(),
            Clause::OrderBy,
            skip_take(dialect),
        ],
        StatementKind::SelectCount => vec![text("SELECT COUNT(*) FROM {table}"), filter()],
        StatementKind::Exists => vec![
            text("SELECT EXISTS (SELECT 1 FROM {table}"),
            filter(),
            text(")"),
        ],
        StatementKind::Insert => vec![text("INSERT INTO {table} ({columns}) VALUES ({values})")],
        StatementKind::Update => vec![text("UPDATE {table} SET {assignments}"), filter()],
        StatementKind::Delete => vec![text("DELETE FROM {table}"), filter()],
        StatementKind::Merge => match dialect {
            Dialect::Postgres => vec![text(
                "INSERT INTO {table} ({columns}) VALUES ({values}) \
                 ON CONFLICT ({keys}) DO UPDATE SET {upsert} \
                 RETURNING (xmax = 0) AS inserted",
            )],
            Dialect::Sqlite => vec![text(
                "INSERT INTO {table} ({columns}) VALUES ({values}) \
                 ON CONFLICT ({keys}) DO UPDATE SET {upsert}",
            )],
        },
        StatementKind::CreateTable => vec![text(
            "CREATE TABLE IF NOT EXISTS {table} ({definitions}, PRIMARY KEY ({keys}))",
        )],
    };

    StatementTemplate::new(kind, clauses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_cataloged() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let catalog = TemplateCatalog::for_dialect(dialect);
            for kind in StatementKind::ALL {
                assert_eq!(catalog.get(kind).kind(), kind);
            }
        }
    }

    #[test]
    fn test_read_kinds_carry_a_filter_clause() {
        let catalog = TemplateCatalog::for_dialect(Dialect::Sqlite);
        for kind in StatementKind::ALL.into_iter().filter(|k| k.is_read()) {
            assert!(catalog.get(kind).has_filter(), "{} lacks a filter", kind);
        }
    }

    #[test]
    fn test_paging_differs_per_dialect() {
        let pg = TemplateCatalog::for_dialect(Dialect::Postgres).get(StatementKind::SelectSkipTake);
        let lite = TemplateCatalog::for_dialect(Dialect::Sqlite).get(StatementKind::SelectSkipTake);
        assert!(pg.to_string().ends_with("OFFSET {skip} ROWS FETCH NEXT {take} ROWS ONLY"));
        assert!(lite.to_string().ends_with("LIMIT {take} OFFSET {skip}"));
    }

    #[test]
    fn test_template_skeleton() {
        let select = TemplateCatalog::for_dialect(Dialect::Sqlite).get(StatementKind::Select);
        assert_eq!(
            select.to_string(),
            "SELECT {columns} FROM {table} WHERE {filter} ORDER BY {order}"
        );
    }
}
