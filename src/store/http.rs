//! HTTP content-store client.
//!
//! One uniform fetch capability: every projection is a named query sent as
//! `GET {endpoint}?query=<name>&<params>`, returning JSON or `null`. A `null`
//! body and a 404 both mean "no such document" - a normal outcome, never
//! retried. Transient failures are retried with bounded backoff.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    ContentStore, RetryPolicy, SitemapDoc, StoreError, TranslationLink, TranslationLinkTable,
    with_retry,
};
use crate::core::{CollectionKind, Locale, RawDoc};

/// Content-store client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
    retry: RetryPolicy,
}

impl HttpStore {
    /// Build a client for the given endpoint.
    ///
    /// `timeout` bounds every request; hitting it is a transport error and
    /// fails open downstream like any other fetch failure.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid content store endpoint `{endpoint}`"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build content store client")?;
        Ok(Self {
            client,
            endpoint,
            token,
            retry,
        })
    }

    /// Run one named query with retry, decoding the JSON payload.
    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, StoreError> {
        with_retry(
            &self.retry,
            query,
            || self.fetch_once(query, params),
            StoreError::is_transient,
        )
        .await
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, StoreError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("query", query)])
            .query(params);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() || body.as_ref() == b"null" {
            return Ok(None);
        }
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(StoreError::Decode)
    }
}

impl ContentStore for HttpStore {
    async fn homepages(&self) -> Result<Vec<RawDoc>, StoreError> {
        let docs = self.fetch("homepages", &[]).await?;
        Ok(docs.unwrap_or_default())
    }

    async fn collection_items(
        &self,
        kind: CollectionKind,
        slug: &str,
    ) -> Result<Vec<RawDoc>, StoreError> {
        let docs = self
            .fetch("collection-items", &[("type", kind.key()), ("slug", slug)])
            .await?;
        Ok(docs.unwrap_or_default())
    }

    async fn page_translations(
        &self,
        slug: &str,
        locale: &Locale,
    ) -> Result<Vec<RawDoc>, StoreError> {
        let docs = self
            .fetch(
                "page-translations",
                &[("slug", slug), ("locale", locale.as_str())],
            )
            .await?;
        Ok(docs.unwrap_or_default())
    }

    async fn sitemap_documents(&self, locale: &Locale) -> Result<Vec<SitemapDoc>, StoreError> {
        let docs = self
            .fetch("sitemap-documents", &[("locale", locale.as_str())])
            .await?;
        Ok(docs.unwrap_or_default())
    }

    async fn translation_links(&self) -> Result<TranslationLinkTable, StoreError> {
        let links: Option<Vec<TranslationLink>> = self.fetch("translation-links", &[]).await?;
        Ok(TranslationLinkTable::from_links(links.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(5))
    }

    fn store(uri: &str) -> HttpStore {
        HttpStore::new(uri, None, Duration::from_secs(2), fast_retry()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(HttpStore::new("not a url", None, Duration::from_secs(1), fast_retry()).is_err());
    }

    #[tokio::test]
    async fn test_homepages_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "homepages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "page", "locale": "en", "slug": "index"},
                {"type": "page", "locale": "nb", "slug": "index"},
            ])))
            .mount(&server)
            .await;

        let docs = store(&server.uri()).homepages().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].locale.as_ref().map(Locale::as_str), Some("nb"));
    }

    #[tokio::test]
    async fn test_collection_items_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "collection-items"))
            .and(query_param("type", "articles"))
            .and(query_param("slug", "hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "articles", "locale": "en", "slug": "hello"},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let docs = store(&server.uri())
            .collection_items(CollectionKind::Articles, "hello")
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_null_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let docs = store(&server.uri()).homepages().await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_404_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let docs = store(&server.uri()).homepages().await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_retried_until_success() {
        let server = MockServer::start().await;
        // First two attempts fail, third succeeds.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "page", "locale": "en", "slug": "index"},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let docs = store(&server.uri()).homepages().await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let err = store(&server.uri()).homepages().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 400 }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = store(&server.uri()).homepages().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpStore::new(
            &server.uri(),
            Some("secret".into()),
            Duration::from_secs(2),
            fast_retry(),
        )
        .unwrap();
        store.homepages().await.unwrap();
    }
}
