//! Batch sitemap emission.
//!
//! Fetches the bulk translation-link table plus every locale's document
//! projection (concurrently - the fetches are independent), then writes one
//! sitemap document per locale and the index. A failed locale is logged and
//! skipped so the remaining locales still get written; the command fails at
//! the end if any locale failed.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::SiteConfig;
use crate::core::Locale;
use crate::generator::sitemap::{index_xml, locale_entries, sitemap_path, urlset_xml};
use crate::log;
use crate::registry::SlugRegistry;
use crate::resolve::UrlResolver;
use crate::store::ContentStore;

pub fn run(config: &SiteConfig) -> Result<()> {
    let registry = config.slug_registry()?;
    let store = config.http_store()?;
    let base = config
        .base_url()
        .context("site.url is required for sitemap generation")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    rt.block_on(write_sitemaps(
        &config.build.output,
        &registry,
        &store,
        base,
    ))
}

/// Fetch projections and write every sitemap document under `output`.
async fn write_sitemaps<S: ContentStore>(
    output: &Path,
    registry: &SlugRegistry,
    store: &S,
    base: &str,
) -> Result<()> {
    let locales = registry.locales();

    let fetches = futures::future::join_all(
        locales
            .iter()
            .map(|locale| async move { (locale, store.sitemap_documents(locale).await) }),
    );
    let (links, fetches) = tokio::join!(store.translation_links(), fetches);
    let links = links.context("failed to fetch translation links")?;

    fs::create_dir_all(output.join("sitemaps"))
        .with_context(|| format!("failed to create {}", output.display()))?;

    let resolver = UrlResolver::new(registry, locales, Some(base));
    let mut failed: Vec<&Locale> = Vec::new();

    for (locale, result) in fetches {
        match result {
            Ok(docs) => {
                let docs: Vec<_> = docs.into_iter().filter(|d| !d.no_index).collect();
                let entries = locale_entries(&docs, &links, &resolver);
                let path = output.join(sitemap_path(locale));
                fs::write(&path, urlset_xml(&entries))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log!("sitemap"; "sitemaps/{locale}.xml ({} entries)", entries.len());
            }
            Err(e) => {
                log!("error"; "sitemap for locale `{locale}` failed: {e}");
                failed.push(locale);
            }
        }
    }

    let index_path = output.join("sitemap.xml");
    fs::write(&index_path, index_xml(locales, base))
        .with_context(|| format!("failed to write {}", index_path.display()))?;
    log!("sitemap"; "sitemap.xml");

    if !failed.is_empty() {
        let codes: Vec<&str> = failed.iter().map(|l| l.as_str()).collect();
        bail!("sitemap generation failed for locale(s): {}", codes.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Locale, LocaleSet};
    use crate::store::testing::StubStore;
    use rustc_hash::FxHashMap;

    fn registry() -> SlugRegistry {
        SlugRegistry::new(LocaleSet::new(
            Locale::new("en"),
            ["en", "nb"].map(Locale::new),
        ))
    }

    fn sitemap_docs() -> FxHashMap<Locale, Vec<crate::store::SitemapDoc>> {
        let mut sitemap = FxHashMap::default();
        sitemap.insert(
            Locale::new("en"),
            serde_json::from_value(serde_json::json!([
                {"type": "page", "locale": "en", "slug": "index"},
                {"type": "page", "locale": "en", "slug": "about"},
                {"type": "page", "locale": "en", "slug": "hidden", "noIndex": true},
            ]))
            .unwrap(),
        );
        sitemap.insert(
            Locale::new("nb"),
            serde_json::from_value(serde_json::json!([
                {"type": "page", "locale": "nb", "slug": "index"},
            ]))
            .unwrap(),
        );
        sitemap
    }

    #[tokio::test]
    async fn test_writes_locale_sitemaps_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = StubStore {
            sitemap: sitemap_docs(),
            ..Default::default()
        };

        write_sitemaps(dir.path(), &registry(), &store, "https://x.io")
            .await
            .unwrap();

        let en = fs::read_to_string(dir.path().join("sitemaps/en.xml")).unwrap();
        assert!(en.contains("<loc>https://x.io/</loc>"));
        assert!(en.contains("<loc>https://x.io/about</loc>"));
        // No-index documents are filtered before assembly.
        assert!(!en.contains("hidden"));

        let nb = fs::read_to_string(dir.path().join("sitemaps/nb.xml")).unwrap();
        assert!(nb.contains("<loc>https://x.io/nb</loc>"));

        let index = fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(index.contains("<loc>https://x.io/sitemaps/en.xml</loc>"));
        assert!(index.contains("<loc>https://x.io/sitemaps/nb.xml</loc>"));
    }

    #[tokio::test]
    async fn test_store_failure_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        let store = StubStore {
            fail: true,
            ..Default::default()
        };

        let result = write_sitemaps(dir.path(), &registry(), &store, "https://x.io").await;
        assert!(result.is_err());
    }
}
