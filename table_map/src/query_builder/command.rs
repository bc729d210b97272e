use crate::descriptor::ColumnDescriptor;
use crate::errors::MapError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use type_mapping::{ColumnType, SqlValue};

/// Name of the implicit parameter holding the instant a command was created
pub const NOW_PARAMETER: &str = "__now__";

/// A named value staged on a command
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    name: String,
    value: SqlValue,
    column_type: Option<ColumnType>,
}

impl BoundParameter {
    pub fn new(name: impl Into<String>, value: SqlValue, column_type: Option<ColumnType>) -> Self {
        Self {
            name: name.into(),
            value,
            column_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &SqlValue {
        &self.value
    }

    /// Declared type of the target column, when known
    pub fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }
}

/// A statement ready to execute on one connection
///
/// Parameters are staged by name and only bound once the text references
/// them; positions follow the order of first reference.
#[derive(Debug, Clone)]
pub struct Command {
    text: String,
    parameters: Vec<BoundParameter>,
    bindings: Vec<usize>,
    projection: Vec<ColumnDescriptor>,
    timeout: Duration,
    operation: &'static str,
    table: String,
}

impl Command {
    pub fn new(timeout: Duration) -> Self {
        Self {
            text: String::new(),
            parameters: Vec::new(),
            bindings: Vec::new(),
            projection: Vec::new(),
            timeout,
            operation: "command",
            table: String::new(),
        }
    }

    /// Stage a parameter, replacing any staged one with the same name
    pub fn add_parameter(&mut self, parameter: BoundParameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&BoundParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn staged_parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    /// Position (1-based) of a staged parameter in the bind sequence
    ///
    /// The first reference appends the parameter to the sequence, later
    /// references reuse its position.
    pub fn reference(&mut self, name: &str) -> Result<usize, MapError> {
        let index = self
            .parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| MapError::MissingParameter(name.to_string()))?;

        if let Some(position) = self.bindings.iter().position(|&bound| bound == index) {
            return Ok(position + 1);
        }
        self.bindings.push(index);
        Ok(self.bindings.len())
    }

    /// Parameters in the order their markers number them
    pub fn bound_parameters(&self) -> impl Iterator<Item = &BoundParameter> {
        self.bindings.iter().map(move |&index| &self.parameters[index])
    }

    /// Instant staged under [`NOW_PARAMETER`], if this command carries one
    pub fn now(&self) -> Option<DateTime<Utc>> {
        self.parameter(NOW_PARAMETER)
            .and_then(|p| p.value().as_timestamp())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn projection(&self) -> &[ColumnDescriptor] {
        &self.projection
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Operation name used in errors and logs
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Start rendering a new statement, keeping staged parameters
    pub(crate) fn begin(&mut self, table: &str, operation: &'static str) {
        self.text.clear();
        self.bindings.clear();
        self.projection.clear();
        self.table = table.to_string();
        self.operation = operation;
    }

    /// Columns rows are decoded into, when they differ from the rendered ones
    pub(crate) fn set_projection(&mut self, projection: Vec<ColumnDescriptor>) {
        self.projection = projection;
    }

    pub(crate) fn finish(&mut self, text: String, projection: Vec<ColumnDescriptor>) {
        self.text = text;
        self.projection = projection;
    }
}
