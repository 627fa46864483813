//! Geocode client: response cache first, then the service.

use log::{debug, error};
use reqwest::header::CONTENT_TYPE;

use super::request::GeocodeRequest;
use super::response::{parse_result_set, GeocodeResultSet, Provenance};
use super::throttle::RequestThrottle;
use crate::config::GeocodeOptions;
use crate::error_handling::GeocodeError;
use crate::storage::ResponseCache;

/// Client for the GEOLocate web service.
///
/// Owns the response cache for the duration of a run; call [`close`] to
/// release it.
///
/// [`close`]: GeocodeClient::close
pub struct GeocodeClient {
    http: reqwest::Client,
    endpoint: String,
    options: GeocodeOptions,
    cache: ResponseCache,
    throttle: RequestThrottle,
}

impl GeocodeClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        options: GeocodeOptions,
        cache: ResponseCache,
        throttle: RequestThrottle,
    ) -> Self {
        GeocodeClient {
            http,
            endpoint: endpoint.into(),
            options,
            cache,
            throttle,
        }
    }

    pub fn options(&self) -> &GeocodeOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Geocodes one locality with the client's options.
    pub async fn georef(
        &mut self,
        locality: &str,
        country: &str,
        state_province: &str,
        county: &str,
    ) -> Result<GeocodeResultSet, GeocodeError> {
        let request = GeocodeRequest::new(locality, country, state_province, county, self.options);
        self.fetch(&request).await
    }

    /// Resolves `request` from the cache, or from the service on a miss.
    ///
    /// Live responses are cached only after they parse, so a bad payload is
    /// fetched again on the next run instead of being replayed.
    ///
    /// # Errors
    ///
    /// - `GeocodeError::Transport` if the service is unreachable or answers
    ///   with a non-success status
    /// - `GeocodeError::MalformedResponse` if the payload cannot be parsed
    /// - `GeocodeError::Cache` if the cache cannot be read or written
    pub async fn fetch(
        &mut self,
        request: &GeocodeRequest,
    ) -> Result<GeocodeResultSet, GeocodeError> {
        let key = request.cache_key();

        if let Some(raw) = self.cache.get(&key).await? {
            debug!("Using cached response for '{}'", request.locality);
            return parse_result_set(&raw, Provenance::Cache).inspect_err(|e| {
                error!("Cached response for {key} is unreadable: {e}");
            });
        }

        self.throttle.wait_turn().await;
        let exchange = self.post(&key).await;
        self.throttle.mark_done();
        let raw = exchange?;
        debug!("{raw}");

        let result_set = parse_result_set(&raw, Provenance::Network).inspect_err(|e| {
            error!("{e} (request: {key})");
        })?;
        self.cache.put(&key, &raw).await?;
        Ok(result_set)
    }

    async fn post(&self, body: &str) -> Result<String, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Releases the response cache.
    pub async fn close(self) {
        self.cache.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ONE_RESULT: &str = r#"{"engineVersion":"GLC:6.0","numResults":1,"resultSet":{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[-95.2353,38.9717]},"properties":{"uncertaintyRadiusMeters":500,"precision":"High","score":88,"parsePattern":"LAWRENCE"}}]}}"#;

    fn client(server: &MockServer, cache: ResponseCache) -> GeocodeClient {
        GeocodeClient::new(
            reqwest::Client::new(),
            format!("{}/glcwrap.aspx", server.uri()),
            GeocodeOptions::default(),
            cache,
            RequestThrottle::new(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_second_identical_request_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("locality=Lawrence"))
            .and(body_string_contains("fmt=json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_RESULT))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db")).await.unwrap();
        let mut client = client(&server, cache);

        let first = client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap();
        let second = client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap();

        assert_eq!(first.provenance, Provenance::Network);
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(first.results, second.results);
        client.close().await;
    }

    #[tokio::test]
    async fn test_delay_runs_from_the_previous_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_RESULT)
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let mut client = GeocodeClient::new(
            reqwest::Client::new(),
            format!("{}/glcwrap.aspx", server.uri()),
            GeocodeOptions::default(),
            ResponseCache::disabled(),
            RequestThrottle::new(Duration::from_millis(600)),
        );
        let started = std::time::Instant::now();
        client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap();
        client.georef("Topeka", "USA", "Kansas", "Shawnee").await.unwrap();
        // Two slow responses plus the full pause between them.
        assert!(started.elapsed() >= Duration::from_millis(1600));
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut client = client(&server, ResponseCache::disabled());
        let err = client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let mut client = GeocodeClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/glcwrap.aspx",
            GeocodeOptions::default(),
            ResponseCache::disabled(),
            RequestThrottle::new(Duration::ZERO),
        );
        let err = client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::open(&dir.path().join("cache.db")).await.unwrap();
        let mut client = client(&server, cache);

        for _ in 0..2 {
            let err = client.georef("Lawrence", "USA", "Kansas", "Douglas").await.unwrap_err();
            assert!(matches!(err, GeocodeError::MalformedResponse { .. }));
        }
        assert_eq!(client.cache().len().await.unwrap(), 0);
        client.close().await;
    }
}
