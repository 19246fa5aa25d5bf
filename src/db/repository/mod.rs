//! Repository layer: table-scoped database operations.
//!
//! Reference tables link to medicines by name only, so every lookup here is a
//! case-insensitive exact or `LIKE` match on a name column.

mod condition;
mod dosage;
mod effectiveness;
mod interaction;
mod medicine;
mod pattern;
mod side_effect;

pub use condition::*;
pub use dosage::*;
pub use effectiveness::*;
pub use interaction::*;
pub use medicine::*;
pub use pattern::*;
pub use side_effect::*;

/// `%term%` pattern for LIKE lookups.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}
