//! Domain models for the clinic records system.

mod intake;
mod patient;
mod visit;

pub use intake::*;
pub use patient::*;
pub use visit::*;
