//! Core types - pure abstractions shared across the codebase.

mod document;
mod locale;

pub use document::{CollectionKind, DocKind, DocRef, HOMEPAGE_SLUG, RawDoc};
pub use locale::{Locale, LocaleSet};
