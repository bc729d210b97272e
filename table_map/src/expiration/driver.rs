use super::connection::ExpiringConnection;
use crate::errors::MapError;
use crate::query_builder::{BoundParameter, Predicate, StatementKind, StatementTemplate, NOW_PARAMETER};
use crate::traits::{Driver, UpsertStrategy};
use async_trait::async_trait;
use config::Dialect;
use std::sync::Arc;
use std::time::Duration;
use type_mapping::{ColumnType, SqlValue};

/// Driver that hides expired rows from every read statement
///
/// Read templates get `(column IS NULL OR column > now)` added to their
/// filter; everything else is the wrapped driver's. Its connections are the
/// wrapped driver's connections inside an [`ExpiringConnection`], so the
/// `now` the predicate references is always staged.
pub struct ExpiringDriver<D> {
    inner: Arc<D>,
    column: String,
}

impl<D> Clone for ExpiringDriver<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            column: self.column.clone(),
        }
    }
}

impl<D: Driver> ExpiringDriver<D> {
    pub fn new(inner: Arc<D>, column: impl Into<String>) -> Self {
        Self {
            inner,
            column: column.into(),
        }
    }

    pub fn inner(&self) -> &Arc<D> {
        &self.inner
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    fn visibility(&self) -> Predicate {
        Predicate::null_or_after(self.column.clone(), NOW_PARAMETER)
    }
}

#[async_trait]
impl<D: Driver> Driver for ExpiringDriver<D> {
    type Connection = ExpiringConnection<D::Connection>;

    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn template(&self, kind: StatementKind) -> StatementTemplate {
        let template = self.inner.template(kind);
        if kind.is_read() {
            template.with_predicate(self.visibility())
        } else {
            template
        }
    }

    fn parse_identifier(&self, name: &str) -> String {
        self.inner.parse_identifier(name)
    }

    fn parameter_marker(&self, position: usize) -> String {
        self.inner.parameter_marker(position)
    }

    fn create_parameter(
        &self,
        name: &str,
        value: SqlValue,
        column_type: Option<ColumnType>,
    ) -> BoundParameter {
        self.inner.create_parameter(name, value, column_type)
    }

    fn type_name(&self, column_type: ColumnType) -> &'static str {
        self.inner.type_name(column_type)
    }

    fn default_schema(&self) -> &str {
        self.inner.default_schema()
    }

    fn command_timeout(&self) -> Duration {
        self.inner.command_timeout()
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        self.inner.upsert_strategy()
    }

    async fn create_connection(&self) -> Result<Self::Connection, MapError> {
        Ok(ExpiringConnection::new(self.inner.create_connection().await?))
    }
}
