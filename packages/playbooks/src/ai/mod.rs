//! AI implementations.

mod openai;

pub use openai::{OpenAI, OPENROUTER_BASE_URL};
