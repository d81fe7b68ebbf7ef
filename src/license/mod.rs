//! License expression parsing and registry-backed validation.
//!
//! - [`registry`] — immutable id → [`License`](crate::models::License) table built from
//!   the embedded SPDX data plus custom licenses.
//! - [`expression`] — tokenizer and recursive descent parser for `AND` / `OR` / `WITH`
//!   expressions.
//! - [`validator`] — entry point that parses an expression and reports unknown tokens.

pub mod expression;
pub mod registry;
pub mod validator;
