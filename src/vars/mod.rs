//! Variable store and resolver.
//!
//! This module collects `@var` declaration sections into a
//! [`VariableScope`] and substitutes `{{path}}` / `{{path:default}}` tokens
//! throughout request text. A scope is computed per block and never crosses
//! block boundaries.

pub mod scope;
pub mod substitution;

pub use scope::{VarError, VariableScope};
pub use substitution::render_value;
