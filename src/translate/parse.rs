//! Incoming path parsing.
//!
//! Maps a request path onto a document identity against the slug registry:
//! strip a supported locale prefix (else assume the default), then decide
//! homepage / collection item / page from the remaining segments.

use percent_encoding::percent_decode_str;

use crate::core::{DocKind, DocRef, HOMEPAGE_SLUG};
use crate::registry::SlugRegistry;

/// Parse a request path into a document identity.
///
/// Query string and fragment are ignored; percent-encoding is decoded on
/// input. A collection root is only recognized when at least one more
/// segment follows it, and only against the path locale's own mapping.
pub fn parse_path(pathname: &str, registry: &SlugRegistry) -> DocRef {
    let locales = registry.locales();

    let path = pathname.split(['?', '#']).next().unwrap_or(pathname);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string());

    let mut segments: Vec<&str> = decoded
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let locale = match segments.first().and_then(|s| locales.get(s)) {
        Some(locale) => {
            let locale = locale.clone();
            segments.remove(0);
            locale
        }
        None => locales.default_locale().clone(),
    };

    if segments.is_empty() {
        return DocRef::new(DocKind::Page, locale, HOMEPAGE_SLUG);
    }

    if segments.len() >= 2
        && let Some(kind) = registry.kind_from_slug(segments[0], &locale)
    {
        return DocRef::new(DocKind::Collection(kind), locale, segments[1..].join("/"));
    }

    DocRef::new(DocKind::Page, locale, segments.join("/"))
}
