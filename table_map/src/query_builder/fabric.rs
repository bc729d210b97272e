//! Command fabric
//!
//! Turns a driver's statement templates into executable commands for one
//! table. Every parameter is staged and referenced in the same pass that
//! writes its marker, so the text and the bind sequence cannot drift apart.

use super::command::Command;
use super::pagination::Paging;
use super::predicate::Predicate;
use super::substitution::substitute;
use super::template::{Clause, StatementKind};
use crate::descriptor::{ColumnDescriptor, TableDescriptor};
use crate::errors::MapError;
use crate::traits::{Driver, UpsertStrategy};
use type_mapping::{is_compatible, ColumnType, ConversionError, SqlValue};

/// Parameter name prefixes; `@` never occurs in a validated column name
const FILTER_PREFIX: &str = "@where:";
const VALUE_PREFIX: &str = "@set:";

/// Inputs of one rendering pass
#[derive(Default)]
struct Request<'r> {
    filter: &'r [(String, SqlValue)],
    columns: &'r [(String, SqlValue)],
    projection: Vec<ColumnDescriptor>,
    order: Vec<String>,
    paging: Option<Paging>,
    extra: &'r [Predicate],
}

pub struct CommandFabric<'a, D: Driver> {
    driver: &'a D,
    table: &'a TableDescriptor,
}

impl<'a, D: Driver> CommandFabric<'a, D> {
    pub fn new(driver: &'a D, table: &'a TableDescriptor) -> Self {
        Self { driver, table }
    }

    /// First row matching the filter, all columns
    pub fn select_one(
        &self,
        command: Command,
        filter: &[(String, SqlValue)],
    ) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::SelectTop1,
            "get",
            Request {
                filter,
                projection: self.table.columns().to_vec(),
                paging: Some(Paging::new(0, 1)),
                ..Request::default()
            },
        )
    }

    /// One column of the first row matching the filter
    pub fn select_column(
        &self,
        command: Command,
        filter: &[(String, SqlValue)],
        column: &str,
    ) -> Result<Command, MapError> {
        let descriptor = self.column(column)?.clone();
        self.render(
            command,
            StatementKind::SelectTop1,
            "select_column",
            Request {
                filter,
                projection: vec![descriptor],
                paging: Some(Paging::new(0, 1)),
                ..Request::default()
            },
        )
    }

    /// Every row, ordered by primary key
    pub fn select_all(&self, command: Command) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::Select,
            "entries",
            Request {
                projection: self.table.columns().to_vec(),
                order: self.table.primary_key().to_vec(),
                ..Request::default()
            },
        )
    }

    /// Primary key columns of every row, ordered by primary key
    pub fn select_keys(&self, command: Command) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::Select,
            "keys",
            Request {
                projection: self.table.key_columns(),
                order: self.table.primary_key().to_vec(),
                ..Request::default()
            },
        )
    }

    pub fn select_page(&self, command: Command, paging: Paging) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::SelectSkipTake,
            "page",
            Request {
                projection: self.table.columns().to_vec(),
                order: self.table.primary_key().to_vec(),
                paging: Some(paging),
                ..Request::default()
            },
        )
    }

    pub fn count(&self, command: Command) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::SelectCount,
            "count",
            Request {
                projection: vec![ColumnDescriptor::new("count", ColumnType::BigInt)],
                ..Request::default()
            },
        )
    }

    pub fn exists(
        &self,
        command: Command,
        filter: &[(String, SqlValue)],
    ) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::Exists,
            "contains_key",
            Request {
                filter,
                projection: vec![ColumnDescriptor::new("exists", ColumnType::Boolean)],
                ..Request::default()
            },
        )
    }

    /// Distinct values of one column, ordered by that column
    pub fn distinct(
        &self,
        command: Command,
        column: &str,
        paging: Option<Paging>,
    ) -> Result<Command, MapError> {
        let descriptor = self.column(column)?.clone();
        let kind = if paging.is_some() {
            StatementKind::SelectDistinctSkipTake
        } else {
            StatementKind::SelectDistinct
        };
        self.render(
            command,
            kind,
            "distinct",
            Request {
                projection: vec![descriptor],
                order: vec![column.to_string()],
                paging,
                ..Request::default()
            },
        )
    }

    pub fn distinct_count(&self, command: Command, column: &str) -> Result<Command, MapError> {
        let descriptor = self.column(column)?.clone();
        let projection = vec![descriptor];
        let mut command = self.render(
            command,
            StatementKind::SelectDistinctCount,
            "distinct_count",
            Request {
                projection,
                ..Request::default()
            },
        )?;
        command.set_projection(vec![ColumnDescriptor::new("count", ColumnType::BigInt)]);
        Ok(command)
    }

    pub fn insert(
        &self,
        command: Command,
        columns: &[(String, SqlValue)],
    ) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::Insert,
            "insert",
            Request {
                columns,
                ..Request::default()
            },
        )
    }

    /// Assign `columns` on rows matching the filter and every extra predicate
    pub fn update(
        &self,
        command: Command,
        filter: &[(String, SqlValue)],
        columns: &[(String, SqlValue)],
        extra: &[Predicate],
    ) -> Result<Command, MapError> {
        if columns.is_empty() {
            return Err(MapError::mapping(format!(
                "update on {} assigns no column",
                self.table.name()
            )));
        }
        self.render(
            command,
            StatementKind::Update,
            "update",
            Request {
                filter,
                columns,
                extra,
                ..Request::default()
            },
        )
    }

    /// Delete rows matching the filter and every extra predicate
    ///
    /// An empty filter with no predicate deletes every row.
    pub fn delete(
        &self,
        command: Command,
        filter: &[(String, SqlValue)],
        extra: &[Predicate],
    ) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::Delete,
            "delete",
            Request {
                filter,
                extra,
                ..Request::default()
            },
        )
    }

    /// Insert, or update the non-key columns when the key already exists
    pub fn merge(
        &self,
        command: Command,
        columns: &[(String, SqlValue)],
    ) -> Result<Command, MapError> {
        let projection = if self.driver.upsert_strategy() == UpsertStrategy::Merge {
            vec![ColumnDescriptor::new("inserted", ColumnType::Boolean)]
        } else {
            Vec::new()
        };
        self.render(
            command,
            StatementKind::Merge,
            "merge",
            Request {
                columns,
                projection,
                ..Request::default()
            },
        )
    }

    pub fn create_table(&self, command: Command) -> Result<Command, MapError> {
        self.render(
            command,
            StatementKind::CreateTable,
            "create_table",
            Request::default(),
        )
    }

    fn render(
        &self,
        mut command: Command,
        kind: StatementKind,
        operation: &'static str,
        request: Request<'_>,
    ) -> Result<Command, MapError> {
        let template = self.driver.template(kind);
        command.begin(self.table.name(), operation);

        let mut sql = String::new();
        let mut filtered = false;
        for clause in template.clauses() {
            match clause {
                Clause::Text(text) => {
                    let rendered = substitute(text, |name| {
                        self.placeholder(name, kind, &mut command, &request)
                    })?;
                    sql.push_str(&rendered);
                }
                Clause::Filter(predicates) => {
                    filtered = true;
                    let mut terms = Vec::with_capacity(
                        request.filter.len() + predicates.len() + request.extra.len(),
                    );
                    for (column, value) in request.filter {
                        terms.push(self.filter_term(&mut command, column, value)?);
                    }
                    for predicate in predicates.iter().chain(request.extra) {
                        terms.push(predicate.render(self.driver, &mut command)?);
                    }
                    if !terms.is_empty() {
                        sql.push_str(" WHERE ");
                        sql.push_str(&terms.join(" AND "));
                    }
                }
                Clause::OrderBy => {
                    if !request.order.is_empty() {
                        let order = request
                            .order
                            .iter()
                            .map(|column| self.driver.parse_identifier(column))
                            .collect::<Vec<_>>()
                            .join(", ");
                        sql.push_str(" ORDER BY ");
                        sql.push_str(&order);
                    }
                }
                Clause::Paging(text) => {
                    if let Some(paging) = request.paging {
                        let rendered = substitute(text, |name| {
                            paging.placeholder(name).ok_or_else(|| {
                                MapError::template(format!(
                                    "unknown paging placeholder '{}' in {} template",
                                    name, kind
                                ))
                            })
                        })?;
                        sql.push(' ');
                        sql.push_str(&rendered);
                    }
                }
            }
        }

        if !filtered && (!request.filter.is_empty() || !request.extra.is_empty()) {
            return Err(MapError::template(format!(
                "{} template has no filter clause",
                kind
            )));
        }

        crate::debug_log!("[{}] Table: {}", operation.to_uppercase(), self.table.name());
        crate::debug_log!("[{}] SQL: {}", operation.to_uppercase(), sql);
        crate::trace_log!(
            "[{}] Bound parameters: {}",
            operation.to_uppercase(),
            command.bound_parameters().count()
        );

        command.finish(sql, request.projection);
        Ok(command)
    }

    fn placeholder(
        &self,
        name: &str,
        kind: StatementKind,
        command: &mut Command,
        request: &Request<'_>,
    ) -> Result<String, MapError> {
        match name {
            "table" => Ok(self.qualified_table()),
            "columns" => {
                let names: Vec<&str> = if request.columns.is_empty() {
                    request.projection.iter().map(|c| c.name()).collect()
                } else {
                    request.columns.iter().map(|(c, _)| c.as_str()).collect()
                };
                if names.is_empty() {
                    return Err(MapError::template(format!(
                        "{} template needs at least one column",
                        kind
                    )));
                }
                Ok(self.identifier_list(names))
            }
            "values" => {
                let mut markers = Vec::with_capacity(request.columns.len());
                for (column, value) in request.columns {
                    markers.push(self.bind(command, format!("{VALUE_PREFIX}{column}"), column, value)?);
                }
                Ok(markers.join(", "))
            }
            "assignments" => {
                let mut assignments = Vec::with_capacity(request.columns.len());
                for (column, value) in request.columns {
                    let marker = self.bind(command, format!("{VALUE_PREFIX}{column}"), column, value)?;
                    assignments.push(format!(
                        "{} = {}",
                        self.driver.parse_identifier(column),
                        marker
                    ));
                }
                Ok(assignments.join(", "))
            }
            "keys" => Ok(self.identifier_list(self.table.primary_key().iter().map(String::as_str))),
            "upsert" => {
                let mut targets: Vec<&str> = request
                    .columns
                    .iter()
                    .map(|(c, _)| c.as_str())
                    .filter(|c| !self.table.is_key_column(c))
                    .collect();
                if targets.is_empty() {
                    targets = self.table.primary_key().iter().map(String::as_str).collect();
                }
                Ok(targets
                    .into_iter()
                    .map(|c| {
                        let column = self.driver.parse_identifier(c);
                        format!("{column} = EXCLUDED.{column}")
                    })
                    .collect::<Vec<_>>()
                    .join(", "))
            }
            "definitions" => Ok(self
                .table
                .columns()
                .iter()
                .map(|c| {
                    let mut definition = format!(
                        "{} {}",
                        self.driver.parse_identifier(c.name()),
                        self.driver.type_name(c.column_type())
                    );
                    if !c.is_nullable() {
                        definition.push_str(" NOT NULL");
                    }
                    definition
                })
                .collect::<Vec<_>>()
                .join(", ")),
            other => request
                .paging
                .and_then(|paging| paging.placeholder(other))
                .ok_or_else(|| {
                    MapError::template(format!(
                        "unknown placeholder '{}' in {} template",
                        other, kind
                    ))
                }),
        }
    }

    fn filter_term(
        &self,
        command: &mut Command,
        column: &str,
        value: &SqlValue,
    ) -> Result<String, MapError> {
        if value.is_null() {
            return Err(MapError::mapping(format!(
                "filter on {}.{} cannot match NULL",
                self.table.name(),
                column
            )));
        }
        let marker = self.bind(command, format!("{FILTER_PREFIX}{column}"), column, value)?;
        Ok(format!("{} = {}", self.driver.parse_identifier(column), marker))
    }

    /// Stage a value for `column` under `parameter` and return its marker
    fn bind(
        &self,
        command: &mut Command,
        parameter: String,
        column: &str,
        value: &SqlValue,
    ) -> Result<String, MapError> {
        let column_type = self.column(column)?.column_type();
        if !is_compatible(column_type, value) {
            return Err(ConversionError::Incompatible {
                value: value.to_string(),
                column_type,
            }
            .into());
        }
        command.add_parameter(self.driver.create_parameter(
            &parameter,
            value.clone(),
            Some(column_type),
        ));
        let position = command.reference(&parameter)?;
        Ok(self.driver.parameter_marker(position))
    }

    fn column(&self, name: &str) -> Result<&'a ColumnDescriptor, MapError> {
        self.table.column(name).ok_or_else(|| {
            MapError::mapping(format!(
                "table {} has no column '{}'",
                self.table.name(),
                name
            ))
        })
    }

    fn qualified_table(&self) -> String {
        let schema = self
            .table
            .schema()
            .unwrap_or_else(|| self.driver.default_schema());
        self.driver
            .parse_identifier(&format!("{}.{}", schema, self.table.name()))
    }

    fn identifier_list<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> String {
        names
            .into_iter()
            .map(|name| self.driver.parse_identifier(name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
