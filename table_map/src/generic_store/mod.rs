pub mod core;
pub mod table_map;

pub use core::{PutOutcome, TableMap};
