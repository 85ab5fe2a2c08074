//! Utility functions

pub mod crypto;
pub mod parse;
pub mod precise;
pub mod safe;
pub mod time;

pub use parse::ParseContext;
pub use precise::Precise;
pub use safe::*;
