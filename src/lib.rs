//! Mommy — mood-driven, templated encouragement.
//!
//! Picks a mood, fills one of its templates with randomly chosen words,
//! and hands back the text. Given a seeded random source, the same
//! inputs always produce the same response.

pub mod core;
pub mod schema;

pub use crate::core::defaults::default_responses;
pub use crate::core::generator::{Generator, GeneratorError};
pub use crate::core::template::{Span, Template};
pub use crate::schema::responses::{
    Mood, Overrides, ResponseType, Responses, ResponsesError, Spiciness, Variable, VariableKey,
};
