//! Test doubles for code that depends on [`crate::LanguageModel`].
mod model;

pub use model::{MockGenerateResult, MockLanguageModel};
