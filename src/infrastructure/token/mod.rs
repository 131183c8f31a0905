//! Token generation

mod generator;

pub use generator::{TokenGenerator, TOKEN_LENGTH};
