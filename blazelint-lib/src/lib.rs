//! BlazeLint: accessibility linting for CSS/SCSS stylesheets.
//!
//! The library parses stylesheet text into an owned syntax tree and runs a
//! set of lint rules over it, producing positioned issue records.

pub mod ast;
pub mod blaze_lint;
pub mod error;
pub mod parser;
pub mod rules;

pub use error::{Error, Result};
