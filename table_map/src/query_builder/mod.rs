//! Statement templates and command construction
//!
//! Templates are structured clause lists. Decorators inject predicates into
//! the filter clause, and the [`CommandFabric`] renders the final text in a
//! separate step, binding parameters in the same pass.

pub mod catalog;
pub mod command;
pub mod fabric;
pub mod pagination;
pub mod predicate;
pub mod substitution;
pub mod template;

#[cfg(test)]
mod tests;

pub use catalog::TemplateCatalog;
pub use command::{BoundParameter, Command, NOW_PARAMETER};
pub use fabric::CommandFabric;
pub use pagination::Paging;
pub use predicate::Predicate;
pub use substitution::substitute;
pub use template::{Clause, StatementKind, StatementTemplate};
