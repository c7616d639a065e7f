//! Prompt construction for reasoning strategies.

pub mod template;

pub use template::{Prompt, PromptTemplate};
