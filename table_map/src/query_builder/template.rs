use super::predicate::Predicate;
use std::borrow::Cow;
use std::fmt;

/// Operation a statement template is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    SelectTop1,
    SelectSkipTake,
    SelectDistinct,
    SelectDistinctCount,
    SelectDistinctSkipTake,
    SelectCount,
    Exists,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTable,
}

impl StatementKind {
    pub const ALL: [StatementKind; 13] = [
        StatementKind::Select,
        StatementKind::SelectTop1,
        StatementKind::SelectSkipTake,
        StatementKind::SelectDistinct,
        StatementKind::SelectDistinctCount,
        StatementKind::SelectDistinctSkipTake,
        StatementKind::SelectCount,
        StatementKind::Exists,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
        StatementKind::Merge,
        StatementKind::CreateTable,
    ];

    /// Kinds whose rows are observed by the caller
    pub fn is_read(self) -> bool {
        matches!(
            self,
            StatementKind::Select
                | StatementKind::SelectTop1
                | StatementKind::SelectSkipTake
                | StatementKind::SelectDistinct
                | StatementKind::SelectDistinctCount
                | StatementKind::SelectDistinctSkipTake
                | StatementKind::SelectCount
                | StatementKind::Exists
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::SelectTop1 => "select_top1",
            StatementKind::SelectSkipTake => "select_skip_take",
            StatementKind::SelectDistinct => "select_distinct",
            StatementKind::SelectDistinctCount => "select_distinct_count",
            StatementKind::SelectDistinctSkipTake => "select_distinct_skip_take",
            StatementKind::SelectCount => "select_count",
            StatementKind::Exists => "exists",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Merge => "merge",
            StatementKind::CreateTable => "create_table",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause of a statement skeleton
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Literal text with `{placeholder}`s
    Text(Cow<'static, str>),
    /// `WHERE` clause: key terms supplied at render time, then these predicates
    Filter(Vec<Predicate>),
    /// `ORDER BY`, rendered only when an ordering is requested
    OrderBy,
    /// Paging text with `{skip}` and `{take}`, rendered only when paging is requested
    Paging(Cow<'static, str>),
}

/// Statement skeleton handed out by a driver
///
/// Clause order is fixed by the catalog. A decorator that needs another
/// condition calls [`with_predicate`](Self::with_predicate) on its copy and
/// never touches the text.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementTemplate {
    kind: StatementKind,
    clauses: Vec<Clause>,
}

impl StatementTemplate {
    pub fn new(kind: StatementKind, clauses: Vec<Clause>) -> Self {
        Self { kind, clauses }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn has_filter(&self) -> bool {
        self.clauses.iter().any(|c| matches!(c, Clause::Filter(_)))
    }

    /// Predicates injected so far
    pub fn predicates(&self) -> &[Predicate] {
        self.clauses
            .iter()
            .find_map(|c| match c {
                Clause::Filter(predicates) => Some(predicates.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Add a condition to the filter clause
    ///
    /// Without a filter clause, one is created right before `ORDER BY`
    /// (or paging), or at the end of the statement.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        if let Some(Clause::Filter(predicates)) = self
            .clauses
            .iter_mut()
            .find(|c| matches!(c, Clause::Filter(_)))
        {
            predicates.push(predicate);
            return self;
        }

        let position = self
            .clauses
            .iter()
            .position(|c| matches!(c, Clause::OrderBy | Clause::Paging(_)))
            .unwrap_or(self.clauses.len());
        self.clauses
            .insert(position, Clause::Filter(vec![predicate]));
        self
    }
}

impl fmt::Display for StatementTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for clause in &self.clauses {
            match clause {
                Clause::Text(text) => f.write_str(text)?,
                Clause::Filter(predicates) => {
                    f.write_str(" WHERE {filter}")?;
                    for predicate in predicates {
                        write!(f, " AND {}", predicate)?;
                    }
                }
                Clause::OrderBy => f.write_str(" ORDER BY {order}")?,
                Clause::Paging(text) => write!(f, " {}", text)?,
            }
        }
        Ok(())
    }
}
