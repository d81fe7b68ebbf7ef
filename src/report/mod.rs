//! Terminal renderers for the `validate` and `list` commands.
//!
//! - [`terminal`] — colored validation summary with "did you mean" hints, and a
//!   tabular registry listing; both respect `--quiet`.

pub mod terminal;
