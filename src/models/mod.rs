pub mod enums;
pub mod medicine;
pub mod interaction;
pub mod side_effect;
pub mod dosage;
pub mod effectiveness;
pub mod condition;
pub mod pattern;

pub use medicine::*;
pub use interaction::*;
pub use side_effect::*;
pub use dosage::*;
pub use effectiveness::*;
pub use condition::*;
pub use pattern::*;

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
