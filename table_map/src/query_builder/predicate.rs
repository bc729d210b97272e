use super::command::Command;
use crate::errors::MapError;
use crate::traits::Driver;
use std::borrow::Cow;
use std::fmt;

/// Structured condition appended to a template's filter clause
///
/// Parameters are referenced by name and resolved against the command at
/// render time.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `(column IS NULL OR column > parameter)`
    NullOrAfter {
        column: String,
        parameter: Cow<'static, str>,
    },
    /// `column <= parameter`
    AtOrBefore {
        column: String,
        parameter: Cow<'static, str>,
    },
    /// `column IS NOT NULL`
    NotNull { column: String },
}

impl Predicate {
    pub fn null_or_after(column: impl Into<String>, parameter: impl Into<Cow<'static, str>>) -> Self {
        Predicate::NullOrAfter {
            column: column.into(),
            parameter: parameter.into(),
        }
    }

    pub fn at_or_before(column: impl Into<String>, parameter: impl Into<Cow<'static, str>>) -> Self {
        Predicate::AtOrBefore {
            column: column.into(),
            parameter: parameter.into(),
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Predicate::NotNull {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::NullOrAfter { column, .. }
            | Predicate::AtOrBefore { column, .. }
            | Predicate::NotNull { column } => column,
        }
    }

    /// Render for a dialect, binding the referenced parameter on `command`
    pub fn render<D: Driver>(&self, driver: &D, command: &mut Command) -> Result<String, MapError> {
        match self {
            Predicate::NullOrAfter { column, parameter } => {
                let column = driver.parse_identifier(column);
                let marker = driver.parameter_marker(command.reference(parameter)?);
                Ok(format!("({column} IS NULL OR {column} > {marker})"))
            }
            Predicate::AtOrBefore { column, parameter } => {
                let column = driver.parse_identifier(column);
                let marker = driver.parameter_marker(command.reference(parameter)?);
                Ok(format!("{column} <= {marker}"))
            }
            Predicate::NotNull { column } => {
                Ok(format!("{} IS NOT NULL", driver.parse_identifier(column)))
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::NullOrAfter { column, parameter } => {
                write!(f, "({column} IS NULL OR {column} > @{parameter})")
            }
            Predicate::AtOrBefore { column, parameter } => write!(f, "{column} <= @{parameter}"),
            Predicate::NotNull { column } => write!(f, "{column} IS NOT NULL"),
        }
    }
}
