//! HTTP surfaces: sitemap documents and translation-lookup endpoints.
//!
//! Routes:
//!
//! | Route                    | Response                                   |
//! |--------------------------|--------------------------------------------|
//! | `/sitemap.xml`           | sitemap index (one entry per locale)       |
//! | `/sitemaps/{locale}.xml` | that locale's urlset                       |
//! | `/api/translation`       | translation lookup (`path`, `locale`, `target`) |
//! | `/api/metadata`          | canonical + hreflang alternates (`path`)   |
//!
//! Sitemap responses carry a multi-hour cache policy. A store failure while
//! producing one locale's sitemap is a 500 for that document only; lookup
//! endpoints always answer 200 with the degraded shape instead of failing.

mod response;

use std::sync::Arc;

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};
use url::form_urlencoded;

use crate::config::SiteConfig;
use crate::generator::sitemap::{index_xml, locale_entries, urlset_xml};
use crate::log;
use crate::registry::SlugRegistry;
use crate::resolve::UrlResolver;
use crate::seo::build_metadata;
use crate::store::{ContentStore, HttpStore};
use crate::translate::{find_available_translation, parse_path};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

pub fn run(config: &SiteConfig) -> Result<()> {
    let registry = config.slug_registry()?;
    let store = config.http_store()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_shutdown(Arc::clone(&server))?;

    log!("serve"; "http://{addr}");

    for request in server.incoming_requests() {
        if let Err(e) = rt.block_on(handle_request(request, config, &registry, &store)) {
            log!("serve"; "request error: {e}");
        }
    }

    log!("serve"; "shutting down");
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, std::net::SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = std::net::SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Unblock the accept loop on ctrl-c so the process can exit cleanly.
fn register_shutdown(server: Arc<Server>) -> Result<()> {
    ctrlc::set_handler(move || server.unblock()).context("failed to set ctrl-c handler")
}

/// Handle a single HTTP request.
async fn handle_request(
    request: Request,
    config: &SiteConfig,
    registry: &SlugRegistry,
    store: &HttpStore,
) -> Result<()> {
    if request.method() != &Method::Get {
        return response::respond_status(request, 405, "405 Method Not Allowed");
    }

    let url = request.url().to_string();
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url.as_str(), ""),
    };

    match path {
        "/sitemap.xml" => respond_sitemap_index(request, config, registry),
        "/api/translation" => respond_translation(request, registry, store, query).await,
        "/api/metadata" => respond_metadata(request, config, registry, store, query).await,
        _ => match sitemap_locale(path) {
            Some(code) => respond_locale_sitemap(request, config, registry, store, code).await,
            None => response::respond_status(request, 404, "404 Not Found"),
        },
    }
}

/// Extract the locale code from a `/sitemaps/{locale}.xml` path.
fn sitemap_locale(path: &str) -> Option<&str> {
    let code = path.strip_prefix("/sitemaps/")?.strip_suffix(".xml")?;
    if code.is_empty() || code.contains('/') {
        return None;
    }
    Some(code)
}

/// Extract the first value of a query parameter.
fn query_value(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn respond_sitemap_index(
    request: Request,
    config: &SiteConfig,
    registry: &SlugRegistry,
) -> Result<()> {
    let Some(base) = config.base_url() else {
        return response::respond_status(request, 500, "500 site.url not configured");
    };
    let xml = index_xml(registry.locales(), base);
    response::respond_xml(request, xml, &config.serve.cache_control())
}

async fn respond_locale_sitemap(
    request: Request,
    config: &SiteConfig,
    registry: &SlugRegistry,
    store: &HttpStore,
    code: &str,
) -> Result<()> {
    let Some(locale) = registry.locales().get(code).cloned() else {
        return response::respond_status(request, 404, "404 Not Found");
    };
    let Some(base) = config.base_url() else {
        return response::respond_status(request, 500, "500 site.url not configured");
    };

    let (docs, links) = tokio::join!(store.sitemap_documents(&locale), store.translation_links());
    let (docs, links) = match (docs, links) {
        (Ok(docs), Ok(links)) => (docs, links),
        (Err(e), _) | (_, Err(e)) => {
            // One locale failing must not take the others down with it.
            log!("error"; "sitemap for locale `{locale}` failed: {e}");
            return response::respond_status(request, 500, "500 sitemap unavailable");
        }
    };

    let docs: Vec<_> = docs.into_iter().filter(|d| !d.no_index).collect();
    let resolver = UrlResolver::new(registry, registry.locales(), Some(base));
    let entries = locale_entries(&docs, &links, &resolver);
    response::respond_xml(request, urlset_xml(&entries), &config.serve.cache_control())
}

async fn respond_translation(
    request: Request,
    registry: &SlugRegistry,
    store: &HttpStore,
    query: &str,
) -> Result<()> {
    let Some(path) = query_value(query, "path") else {
        return response::respond_status(request, 400, "400 missing `path` parameter");
    };
    let Some(locale) = query_value(query, "locale") else {
        return response::respond_status(request, 400, "400 missing `locale` parameter");
    };
    let target = query_value(query, "target");

    let outcome =
        find_available_translation(store, registry, &path, &locale, target.as_deref()).await;
    response::respond_json(request, &outcome)
}

async fn respond_metadata(
    request: Request,
    config: &SiteConfig,
    registry: &SlugRegistry,
    store: &HttpStore,
    query: &str,
) -> Result<()> {
    let Some(path) = query_value(query, "path") else {
        return response::respond_status(request, 400, "400 missing `path` parameter");
    };

    let identity = parse_path(&path, registry);
    let metadata = build_metadata(store, registry, config.base_url(), &identity).await;
    response::respond_json(request, &metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_locale_extraction() {
        assert_eq!(sitemap_locale("/sitemaps/en.xml"), Some("en"));
        assert_eq!(sitemap_locale("/sitemaps/nb.xml"), Some("nb"));
        assert_eq!(sitemap_locale("/sitemaps/.xml"), None);
        assert_eq!(sitemap_locale("/sitemaps/a/b.xml"), None);
        assert_eq!(sitemap_locale("/sitemap.xml"), None);
        assert_eq!(sitemap_locale("/sitemaps/en"), None);
    }

    #[test]
    fn test_query_value() {
        assert_eq!(
            query_value("path=%2Fen%2Fabout&locale=en", "path").as_deref(),
            Some("/en/about")
        );
        assert_eq!(
            query_value("path=/x&locale=en", "locale").as_deref(),
            Some("en")
        );
        assert_eq!(query_value("path=/x", "target"), None);
        assert_eq!(query_value("", "path"), None);
    }
}
