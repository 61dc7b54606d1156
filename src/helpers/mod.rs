//! Helper functions for templates
//!
//! Date formatting and the built-in locale tables used by the listing and
//! detail pages.

mod date;
mod locale;

pub use date::*;
pub use locale::{Labels, Locale};
