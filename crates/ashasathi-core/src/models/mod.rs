//! Domain models for the AshaSathi record store.

mod location;
mod patient;
mod visit;

pub use location::*;
pub use patient::*;
pub use visit::*;
