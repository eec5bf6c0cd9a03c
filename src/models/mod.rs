//! Data models exchanged with the notes backend.
//!
//! Field names follow the backend's JSON exactly.

mod note;
mod user;

pub use note::*;
pub use user::*;
