//! Normalized answers and backend output parsing.
//!
//! Raw backend text is turned into a [`NormalizedAnswer`] whose canonical
//! value is what the arbiter compares. Step trail wording never takes part
//! in agreement.

pub mod entities;
pub mod parsing;

pub use entities::{NormalizedAnswer, canonicalize};
pub use parsing::{ParseError, parse_answer};
