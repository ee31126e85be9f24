//! Per-document metadata: canonical URL and hreflang alternates.
//!
//! The alternate set of a document is derived from its translation set; the
//! same derivation backs both live page metadata and batch sitemap emission,
//! so the two surfaces cannot drift apart.

use serde::Serialize;

use crate::core::DocRef;
use crate::log;
use crate::registry::SlugRegistry;
use crate::resolve::{ResolveOptions, SlugSource, UrlResolver};
use crate::store::ContentStore;
use crate::translate::{TranslationSet, gather_translations};

/// Hreflang value for the fallback entry, mapped to the default locale.
pub const X_DEFAULT: &str = "x-default";

/// One alternate-language link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub hreflang: String,
    pub href: String,
}

/// Canonical + alternates for one document.
#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    pub canonical: String,
    pub alternates: Vec<AlternateLink>,
}

/// Alternate links for a translation set: one absolute URL per member locale,
/// plus `x-default` when a default-locale member exists.
pub fn alternate_links<S: SlugSource>(
    set: &TranslationSet,
    resolver: &UrlResolver<'_, S>,
) -> Vec<AlternateLink> {
    let opts = ResolveOptions::absolute();
    let mut links: Vec<AlternateLink> = set
        .iter()
        .map(|doc| AlternateLink {
            hreflang: doc.locale.to_string(),
            href: resolver.resolve_ref(doc, &opts),
        })
        .collect();

    if let Some(default_doc) = set.get(resolver.locales().default_locale()) {
        links.push(AlternateLink {
            hreflang: X_DEFAULT.to_string(),
            href: resolver.resolve_ref(default_doc, &opts),
        });
    }
    links
}

/// Build metadata for one document.
///
/// The canonical URL is always produced; a store failure during the
/// translation gather yields an empty alternate set rather than an error.
pub async fn build_metadata<S: ContentStore>(
    store: &S,
    registry: &SlugRegistry,
    base: Option<&str>,
    doc: &DocRef,
) -> PageMetadata {
    let resolver = UrlResolver::new(registry, registry.locales(), base);
    let canonical = resolver.resolve_ref(doc, &ResolveOptions::absolute());

    let alternates = match gather_translations(store, doc).await {
        Ok(set) => alternate_links(&set, &resolver),
        Err(e) => {
            log!("seo"; "alternates for {} unavailable: {e}", doc.slug);
            Vec::new()
        }
    };

    PageMetadata {
        canonical,
        alternates,
    }
}
