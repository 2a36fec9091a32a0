//! Request handlers.

pub mod concat;
pub mod health;

pub use concat::*;
pub use health::*;
