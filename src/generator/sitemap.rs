//! Sitemap generation.
//!
//! One `<urlset>` document per locale plus a `<sitemapindex>` linking them.
//! Every entry carries the document's alternate-language links, produced by
//! the same derivation as live page metadata.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
//!         xmlns:xhtml="http://www.w3.org/1999/xhtml">
//!   <url>
//!     <loc>https://example.com/nb/artikler/hei</loc>
//!     <lastmod>2026-01-01</lastmod>
//!     <priority>0.6</priority>
//!     <xhtml:link rel="alternate" hreflang="en" href="https://example.com/articles/hello"/>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

use crate::core::{DocKind, DocRef, Locale, LocaleSet};
use crate::resolve::{ResolveOptions, SlugSource, UrlResolver};
use crate::seo::{AlternateLink, alternate_links};
use crate::store::{SitemapDoc, TranslationLinkTable};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// One `<url>` entry.
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub priority: f32,
    pub alternates: Vec<AlternateLink>,
}

/// `<priority>` for a document: homepage 1.0, collection items by kind,
/// everything else 0.5.
pub fn priority_for(doc: &DocRef) -> f32 {
    if doc.is_homepage() {
        return 1.0;
    }
    match doc.kind {
        DocKind::Collection(kind) => kind.sitemap_priority(),
        DocKind::Page => 0.5,
    }
}

/// Relative output path of one locale's sitemap document.
pub fn sitemap_path(locale: &Locale) -> String {
    format!("sitemaps/{locale}.xml")
}

/// Build the entries of one locale's sitemap.
///
/// `docs` must already have no-index documents filtered out; `links` is the
/// prefetched bulk translation-link table for the same snapshot.
pub fn locale_entries<S: SlugSource>(
    docs: &[SitemapDoc],
    links: &TranslationLinkTable,
    resolver: &UrlResolver<'_, S>,
) -> Vec<SitemapEntry> {
    docs.iter()
        .map(|doc| {
            let identity = doc.identity();
            let set = links.set_for(&identity);
            SitemapEntry {
                loc: resolver.resolve_ref(&identity, &ResolveOptions::absolute()),
                lastmod: doc.lastmod.clone(),
                priority: priority_for(&identity),
                alternates: alternate_links(&set, resolver),
            }
        })
        .collect()
}

/// Render a locale's `<urlset>` document.
pub fn urlset_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\" xmlns:xhtml=\"");
    xml.push_str(XHTML_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.loc));
        xml.push_str("</loc>\n");
        if let Some(lastmod) = &entry.lastmod {
            xml.push_str("    <lastmod>");
            xml.push_str(&escape_xml(lastmod));
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("    <priority>");
        xml.push_str(&format!("{:.1}", entry.priority));
        xml.push_str("</priority>\n");
        for link in &entry.alternates {
            xml.push_str("    <xhtml:link rel=\"alternate\" hreflang=\"");
            xml.push_str(&escape_xml(&link.hreflang));
            xml.push_str("\" href=\"");
            xml.push_str(&escape_xml(&link.href));
            xml.push_str("\"/>\n");
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Render the `<sitemapindex>` document linking every locale's sitemap.
pub fn index_xml(locales: &LocaleSet, base: &str) -> String {
    let base = base.trim_end_matches('/');
    let mut xml = String::with_capacity(512);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<sitemapindex xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for locale in locales.iter() {
        xml.push_str("  <sitemap>\n    <loc>");
        xml.push_str(&escape_xml(&format!("{base}/{}", sitemap_path(locale))));
        xml.push_str("</loc>\n  </sitemap>\n");
    }

    xml.push_str("</sitemapindex>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
