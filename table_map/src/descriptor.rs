//! Table and column descriptors
//!
//! A [`TableDescriptor`] is built once, validated, and then shared by
//! reference between a map and every decorator wrapped around it.

use crate::errors::MapError;
use crate::validation::ValidatedIdentifier;
use std::collections::HashSet;
use type_mapping::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    name: String,
    column_type: ColumnType,
    nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Shape of the single table a map persists to
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnDescriptor>,
    primary_key: Vec<String>,
}

impl TableDescriptor {
    pub fn builder(name: impl Into<String>) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            schema: None,
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key.iter().any(|k| k == name)
    }

    /// Key columns in primary key order
    pub fn key_columns(&self) -> Vec<ColumnDescriptor> {
        self.primary_key
            .iter()
            .filter_map(|k| self.column(k).cloned())
            .collect()
    }
}

pub struct TableDescriptorBuilder {
    schema: Option<String>,
    name: String,
    columns: Vec<ColumnDescriptor>,
    primary_key: Vec<String>,
}

impl TableDescriptorBuilder {
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDescriptor::new(name, column_type));
        self
    }

    pub fn nullable_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDescriptor::nullable(name, column_type));
        self
    }

    /// Add a column and mark it as part of the primary key
    pub fn key_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        self.primary_key.push(name.clone());
        self.columns.push(ColumnDescriptor::new(name, column_type));
        self
    }

    pub fn build(self) -> Result<TableDescriptor, MapError> {
        if let Some(schema) = &self.schema {
            ValidatedIdentifier::new(schema)?;
        }
        ValidatedIdentifier::new(&self.name)?;

        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            ValidatedIdentifier::new(&column.name)?;
            if !seen.insert(column.name.as_str()) {
                return Err(MapError::configuration(format!(
                    "Column '{}' declared twice on table '{}'",
                    column.name, self.name
                )));
            }
        }

        if self.primary_key.is_empty() {
            return Err(MapError::configuration(format!(
                "Table '{}' has no primary key column",
                self.name
            )));
        }

        Ok(TableDescriptor {
            schema: self.schema,
            name: self.name,
            columns: self.columns,
            primary_key: self.primary_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_items_table() {
        let table = TableDescriptor::builder("items")
            .key_column("id", ColumnType::Integer)
            .column("val", ColumnType::Text)
            .nullable_column("expires", ColumnType::DateTime)
            .build()
            .unwrap();

        assert_eq!(table.name(), "items");
        assert_eq!(table.primary_key(), ["id".to_string()]);
        assert!(table.column("expires").unwrap().is_nullable());
        assert!(!table.column("val").unwrap().is_nullable());
        assert!(table.column("missing").is_none());
        assert_eq!(table.key_columns().len(), 1);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = TableDescriptor::builder("items")
            .key_column("id", ColumnType::Integer)
            .column("id", ColumnType::Text)
            .build();
        assert!(matches!(result, Err(MapError::Configuration(_))));
    }

    #[test]
    fn test_missing_primary_key_rejected() {
        let result = TableDescriptor::builder("items")
            .column("val", ColumnType::Text)
            .build();
        assert!(matches!(result, Err(MapError::Configuration(_))));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let bad_table = TableDescriptor::builder("items;")
            .key_column("id", ColumnType::Integer)
            .build();
        assert!(matches!(bad_table, Err(MapError::Validation(_))));

        let bad_schema = TableDescriptor::builder("items")
            .schema("1public")
            .key_column("id", ColumnType::Integer)
            .build();
        assert!(matches!(bad_schema, Err(MapError::Validation(_))));
    }
}
