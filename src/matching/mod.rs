//! Fuzzy intent matching: scorer, response tables and the matcher.

pub mod matcher;
pub mod scorer;
pub mod table;

pub use matcher::{MatchResult, best_match, first_above};
pub use scorer::score;
pub use table::{ResponseTable, ResponseTables, TableEntry};
