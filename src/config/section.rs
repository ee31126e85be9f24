//! Configuration section definitions for `tolk.toml`.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;
use crate::core::{CollectionKind, Locale, LocaleSet};
use crate::store::RetryPolicy;

// ============================================================================
// [site]
// ============================================================================

/// Site identity: base URL and supported locales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site URL used for absolute link and sitemap generation
    /// (e.g., "https://example.com").
    pub url: Option<String>,

    /// Default locale; carries no URL prefix.
    pub default_locale: String,

    /// Supported locale codes.
    pub locales: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: None,
            default_locale: "en".into(),
            locales: vec!["en".into()],
        }
    }
}

impl SiteSection {
    /// Build the locale set. Call after `validate`.
    pub fn locale_set(&self) -> LocaleSet {
        LocaleSet::new(
            Locale::new(&self.default_locale),
            self.locales.iter().map(|l| Locale::new(l)),
        )
    }

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` must be a valid http(s) URL with a host, when set
    /// - locale list must be non-empty, unique, and contain the default
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url_str) = &self.url {
            match url::Url::parse(url_str) {
                Ok(parsed) => {
                    if !matches!(parsed.scheme(), "http" | "https") {
                        diag.error_with_hint(
                            "site.url",
                            format!(
                                "scheme '{}' not supported, must be http or https",
                                parsed.scheme()
                            ),
                            "use format like https://example.com",
                        );
                    }
                    if parsed.host_str().is_none() {
                        diag.error_with_hint(
                            "site.url",
                            "URL must have a valid host",
                            "use format like https://example.com",
                        );
                    }
                }
                Err(e) => {
                    diag.error_with_hint(
                        "site.url",
                        format!("invalid URL: {e}"),
                        "use format like https://example.com",
                    );
                }
            }
        }

        if self.default_locale.trim().is_empty() {
            diag.error("site.default_locale", "default locale must not be empty");
        }
        if self.locales.is_empty() {
            diag.error("site.locales", "at least one locale must be configured");
        }
        for (i, locale) in self.locales.iter().enumerate() {
            if locale.trim().is_empty() {
                diag.error("site.locales", format!("locale #{} is empty", i + 1));
            }
            if self.locales[..i].contains(locale) {
                diag.warn("site.locales", format!("duplicate locale `{locale}`"));
            }
        }
        if !self.locales.is_empty() && !self.locales.contains(&self.default_locale) {
            diag.error_with_hint(
                "site.default_locale",
                format!("default locale `{}` is not in site.locales", self.default_locale),
                "add it to site.locales",
            );
        }
    }
}

// ============================================================================
// [collections]
// ============================================================================

/// Per-collection locale → listing-root-slug overrides.
///
/// One sub-table per collection; the table key is the locale code:
///
/// ```toml
/// [collections.articles]
/// nb = "artikler"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsSection {
    pub articles: FxHashMap<String, String>,
    pub docs: FxHashMap<String, String>,
    pub changelog: FxHashMap<String, String>,
    pub events: FxHashMap<String, String>,
    pub newsletter: FxHashMap<String, String>,
}

impl CollectionsSection {
    /// Slug overrides for one collection.
    pub fn overrides(&self, kind: CollectionKind) -> &FxHashMap<String, String> {
        match kind {
            CollectionKind::Articles => &self.articles,
            CollectionKind::Docs => &self.docs,
            CollectionKind::Changelog => &self.changelog,
            CollectionKind::Events => &self.events,
            CollectionKind::Newsletter => &self.newsletter,
        }
    }

    /// Validate that override keys name supported locales and slugs are sane.
    pub fn validate(&self, locales: &LocaleSet, diag: &mut ConfigDiagnostics) {
        for kind in CollectionKind::ALL {
            for (locale, slug) in self.overrides(kind) {
                let field = format!("collections.{kind}.{locale}");
                if !locales.contains(locale) {
                    diag.error_with_hint(
                        field.as_str(),
                        format!("`{locale}` is not a configured locale"),
                        "add it to site.locales or remove the override",
                    );
                }
                if slug.trim().is_empty() {
                    diag.error(field.as_str(), "slug must not be empty");
                } else if slug.contains('/') {
                    diag.error(field.as_str(), "slug must be a single path segment");
                }
            }
        }
    }
}

// ============================================================================
// [store]
// ============================================================================

/// Content-store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Query endpoint of the content store.
    pub endpoint: String,

    /// Bearer token for authenticated stores.
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Attempts per query (including the first one).
    pub retries: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: None,
            timeout_secs: 10,
            retries: 3,
        }
    }
}

impl StoreSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(500))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.endpoint.is_empty() {
            diag.error_with_hint(
                "store.endpoint",
                "content store endpoint is not configured",
                "set store.endpoint, e.g.: \"https://content.example.com/api\"",
            );
            return;
        }
        match url::Url::parse(&self.endpoint) {
            Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => {
                diag.error(
                    "store.endpoint",
                    format!("scheme '{}' not supported, must be http or https", parsed.scheme()),
                );
            }
            Ok(_) => {}
            Err(e) => {
                diag.error("store.endpoint", format!("invalid URL: {e}"));
            }
        }
    }
}

// ============================================================================
// [build]
// ============================================================================

/// Batch sitemap emission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Output directory for generated sitemap documents.
    pub output: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: "public".into(),
        }
    }
}

// ============================================================================
// [serve]
// ============================================================================

/// HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSection {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// Port number to listen on.
    pub port: u16,

    /// `max-age` of sitemap responses, in seconds.
    pub cache_max_age: u32,

    /// `stale-while-revalidate` window of sitemap responses, in seconds.
    pub stale_while_revalidate: u32,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5299,
            cache_max_age: 14400,
            stale_while_revalidate: 86400,
        }
    }
}

impl ServeSection {
    /// `Cache-Control` header value for sitemap responses.
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.cache_max_age, self.stale_while_revalidate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.default_locale, "en");
        assert_eq!(config.site.locales, vec!["en".to_string()]);
        assert_eq!(config.store.timeout_secs, 10);
        assert_eq!(config.store.retries, 3);
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.serve.port, 5299);
        assert_eq!(config.serve.cache_max_age, 14400);
    }

    #[test]
    fn test_site_validate_rejects_bad_url() {
        let mut section = SiteSection {
            url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        assert!(diag.has_errors());

        section.url = Some("https://example.com".into());
        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_site_validate_default_must_be_supported() {
        let section = SiteSection {
            default_locale: "de".into(),
            locales: vec!["en".into(), "nb".into()],
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        section.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_collections_parsing() {
        let config = test_parse_config("[collections.articles]\nnb = \"artikler\"");
        assert_eq!(
            config.collections.articles.get("nb").map(String::as_str),
            Some("artikler")
        );
        assert!(config.collections.docs.is_empty());
    }

    #[test]
    fn test_collections_validate_unknown_locale() {
        let config = test_parse_config("[collections.articles]\nde = \"artikel\"");
        let mut diag = ConfigDiagnostics::new();
        config
            .collections
            .validate(&config.site.locale_set(), &mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_collections_validate_multi_segment_slug() {
        let config = test_parse_config("[collections.articles]\nen = \"a/b\"");
        let mut diag = ConfigDiagnostics::new();
        config
            .collections
            .validate(&config.site.locale_set(), &mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_store_validate_requires_endpoint() {
        let mut diag = ConfigDiagnostics::new();
        StoreSection::default().validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_store_timeout_floor() {
        let section = StoreSection {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(section.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_cache_control_header() {
        let serve = ServeSection::default();
        assert_eq!(
            serve.cache_control(),
            "public, max-age=14400, stale-while-revalidate=86400"
        );
    }
}
