//! REST adapter that never fails a request
//!
//! Every call resolves to a [`RestResponse`]; transport errors and timeouts
//! come back as descriptors with `ok == false` instead of as errors.

use indexmap::IndexMap;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::time::Duration;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use super::query::with_query;
use super::response::{RestResponse, raw_headers};
use crate::error::AdapterError;

/// HTTP methods the adapter issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RestRequestType {
    Get,
    Post,
    Delete,
}

impl RestRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestRequestType::Get => "GET",
            RestRequestType::Post => "POST",
            RestRequestType::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RestRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues REST calls against a fixed base URI
#[derive(Clone)]
pub struct RestMessageAdapter {
    uri: String,
    connection_id: String,
    timeout: Duration,
    ignore_cache: bool,
    headers: IndexMap<String, String>,
    agent: Agent,
}

impl RestMessageAdapter {
    /// Create an adapter. A zero `timeout` disables the time limit.
    pub fn new(
        uri: impl Into<String>,
        connection_id: impl Into<String>,
        timeout: Duration,
        ignore_cache: bool,
        headers: IndexMap<String, String>,
    ) -> Result<Self, AdapterError> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(AdapterError::ArgumentMissing("uri"));
        }

        let config = Agent::config_builder()
            .timeout_global((!timeout.is_zero()).then_some(timeout))
            .http_status_as_error(false)
            .build();

        Ok(Self {
            uri,
            connection_id: connection_id.into(),
            timeout,
            ignore_cache,
            headers,
            agent: Agent::new_with_config(config),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one request and wait for its single outcome
    pub async fn request(
        &self,
        method: RestRequestType,
        query_params: &IndexMap<String, String>,
        body: Option<&Value>,
    ) -> RestResponse {
        let call = PendingCall {
            agent: self.agent.clone(),
            connection_id: self.connection_id.clone(),
            method,
            url: with_query(&self.uri, query_params),
            headers: self.request_headers(),
            body: match body {
                Some(value) if method == RestRequestType::Post && is_truthy(value) => Some(value.to_string()),
                _ => None,
            },
        };

        let connection_id = self.connection_id.clone();
        match tokio::task::spawn_blocking(move || call.send()).await {
            Ok(response) => response,
            Err(e) => {
                error!("[{}] Request worker did not complete: {}", connection_id, e);
                RestResponse::network_error()
            }
        }
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        // Configured headers first, cache directive last
        let mut headers: Vec<(String, String)> =
            self.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        if self.ignore_cache {
            headers.push(("Cache-Control".to_string(), "no-cache".to_string()));
        }
        headers
    }
}

impl std::fmt::Debug for RestMessageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestMessageAdapter")
            .field("uri", &self.uri)
            .field("connection_id", &self.connection_id)
            .field("timeout", &self.timeout)
            .field("ignore_cache", &self.ignore_cache)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Everything one blocking call needs, owned so it can move to a worker thread
struct PendingCall {
    agent: Agent,
    connection_id: String,
    method: RestRequestType,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl PendingCall {
    fn send(self) -> RestResponse {
        debug!("[{}] {} {}", self.connection_id, self.method, self.url);

        let result = match self.method {
            RestRequestType::Get => apply_headers(self.agent.get(&self.url), &self.headers).call(),
            RestRequestType::Delete => apply_headers(self.agent.delete(&self.url), &self.headers).call(),
            RestRequestType::Post => {
                match &self.body {
                    Some(body) => {
                        // The JSON content type replaces any configured one
                        let headers: Vec<(String, String)> = self
                            .headers
                            .iter()
                            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
                            .cloned()
                            .collect();
                        apply_headers(self.agent.post(&self.url), &headers)
                            .header("Content-Type", "application/json")
                            .send(body.as_bytes())
                    }
                    None => apply_headers(self.agent.post(&self.url), &self.headers).send_empty(),
                }
            }
        };

        match result.and_then(read_response) {
            Ok(response) => {
                debug!("[{}] {} {} -> {}", self.connection_id, self.method, self.url, response.status);
                response
            }
            Err(e) if is_timeout(&e) => {
                warn!("[{}] {} {} timed out: {}", self.connection_id, self.method, self.url, e);
                RestResponse::timeout()
            }
            Err(e) => {
                warn!("[{}] {} {} failed: {}", self.connection_id, self.method, self.url, e);
                RestResponse::network_error()
            }
        }
    }
}

fn apply_headers<B>(mut request: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

/// Bodies are read whole and decoded lossily, so any received response is a completion
fn read_response(mut response: Response<Body>) -> Result<RestResponse, ureq::Error> {
    let status = response.status();
    let headers = raw_headers(response.headers());
    let bytes = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

    Ok(RestResponse::completed(
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
        headers,
        String::from_utf8_lossy(&bytes).into_owned(),
    ))
}

/// JSON bodies that count as "no body": null, false, zero and the empty string
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_timeout(error: &ureq::Error) -> bool {
    match error {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(e) => e.kind() == io::ErrorKind::TimedOut,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::response::{NETWORK_ERROR_MESSAGE, TIMEOUT_MESSAGE};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(uri: &str) -> RestMessageAdapter {
        RestMessageAdapter::new(uri, "conn-1", Duration::from_secs(5), false, IndexMap::new()).unwrap()
    }

    fn no_params() -> IndexMap<String, String> {
        IndexMap::new()
    }

    /// URI of a port nothing listens on
    fn closed_uri() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/api", port)
    }

    #[test]
    fn test_empty_uri_rejected() {
        let err = RestMessageAdapter::new("", "conn-1", Duration::from_secs(1), false, IndexMap::new()).unwrap_err();
        assert_eq!(err, AdapterError::ArgumentMissing("uri"));
    }

    #[test]
    fn test_request_type_display() {
        assert_eq!(RestRequestType::Get.to_string(), "GET");
        assert_eq!(RestRequestType::Post.to_string(), "POST");
        assert_eq!(RestRequestType::Delete.to_string(), "DELETE");
    }

    #[tokio::test]
    async fn test_get_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/voices"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-trace", "t-9")
                    .set_body_json(json!({"voices": ["a", "b"]})),
            )
            .mount(&server)
            .await;

        let response = adapter(&format!("{}/voices", server.uri()))
            .request(RestRequestType::Get, &no_params(), None)
            .await;

        assert!(response.ok);
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert!(response.headers.contains("x-trace: t-9\r\n"));
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body, json!({"voices": ["a", "b"]}));
    }

    #[tokio::test]
    async fn test_query_params_on_wire() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("b", "two words"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut params = IndexMap::new();
        params.insert("a".to_string(), "1".to_string());
        params.insert("b".to_string(), "two words".to_string());

        let response = adapter(&format!("{}/q", server.uri()))
            .request(RestRequestType::Get, &params, None)
            .await;
        assert!(response.ok);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("a=1&b=two%20words"));
    }

    #[tokio::test]
    async fn test_post_with_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"text": "hello"})))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let body = json!({"text": "hello"});
        let response = adapter(&format!("{}/submit", server.uri()))
            .request(RestRequestType::Post, &no_params(), Some(&body))
            .await;

        assert!(response.ok);
        assert_eq!(response.status, 201);
        assert_eq!(response.data, "created");
    }

    #[tokio::test]
    async fn test_post_without_body_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let response = adapter(&server.uri())
            .request(RestRequestType::Post, &no_params(), Some(&Value::Null))
            .await;
        assert!(response.ok);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].body.is_empty());
        assert!(requests[0].headers.get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_delete_no_content_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let response = adapter(&format!("{}/items/3", server.uri()))
            .request(RestRequestType::Delete, &no_params(), None)
            .await;

        assert!(response.ok);
        assert_eq!(response.status, 204);
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_a_completed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let response = adapter(&server.uri())
            .request(RestRequestType::Get, &no_params(), None)
            .await;

        assert!(!response.ok);
        assert_eq!(response.status, 503);
        assert_eq!(response.data, "busy");
    }

    #[tokio::test]
    async fn test_configured_headers_and_no_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-api-key", "secret"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut headers = IndexMap::new();
        headers.insert("X-Api-Key".to_string(), "secret".to_string());
        let adapter = RestMessageAdapter::new(server.uri(), "conn-2", Duration::from_secs(5), true, headers).unwrap();

        let response = adapter.request(RestRequestType::Get, &no_params(), None).await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn test_no_cache_header_absent_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        adapter(&server.uri())
            .request(RestRequestType::Get, &no_params(), None)
            .await;

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("cache-control").is_none());
    }

    #[tokio::test]
    async fn test_timeout_resolves_with_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let adapter =
            RestMessageAdapter::new(server.uri(), "conn-3", Duration::from_millis(200), false, IndexMap::new())
                .unwrap();

        for method in [RestRequestType::Get, RestRequestType::Post, RestRequestType::Delete] {
            let response = adapter.request(method, &no_params(), None).await;
            assert!(!response.ok, "{} should time out", method);
            assert_eq!(response.data, TIMEOUT_MESSAGE);
            assert_eq!(response.json::<String>().unwrap(), TIMEOUT_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_network_error_resolves_with_descriptor() {
        let adapter = adapter(&closed_uri());

        for method in [RestRequestType::Get, RestRequestType::Post, RestRequestType::Delete] {
            let body = json!({"x": 1});
            let response = adapter.request(method, &no_params(), Some(&body)).await;
            assert!(!response.ok, "{} should fail", method);
            assert_eq!(response.status, 0);
            assert_eq!(response.data, NETWORK_ERROR_MESSAGE);
            assert_eq!(response.json::<String>().unwrap(), NETWORK_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_a_completed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'h', b'i', 0xff, 0xfe]))
            .mount(&server)
            .await;

        let response = adapter(&server.uri())
            .request(RestRequestType::Get, &no_params(), None)
            .await;

        assert!(response.ok);
        assert_eq!(response.status, 200);
        assert!(response.data.starts_with("hi"));
        assert!(response.data.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_large_body_is_read_whole() {
        let server = MockServer::start().await;
        let body = "a".repeat(11 * 1024 * 1024);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;

        let response = adapter(&server.uri())
            .request(RestRequestType::Get, &no_params(), None)
            .await;

        assert!(response.ok);
        assert_eq!(response.data.len(), body.len());
    }

    #[tokio::test]
    async fn test_post_falsy_bodies_send_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let adapter = adapter(&server.uri());
        for body in [json!(false), json!(0), json!("")] {
            let response = adapter.request(RestRequestType::Post, &no_params(), Some(&body)).await;
            assert!(response.ok);
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert!(request.body.is_empty());
            assert!(request.headers.get("content-type").is_none());
        }
    }

    #[tokio::test]
    async fn test_post_body_replaces_configured_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        headers.insert("X-Api-Key".to_string(), "secret".to_string());
        let adapter = RestMessageAdapter::new(server.uri(), "conn-4", Duration::from_secs(5), false, headers).unwrap();

        let body = json!({"text": "hello"});
        let response = adapter.request(RestRequestType::Post, &no_params(), Some(&body)).await;
        assert!(response.ok);

        let requests = server.received_requests().await.unwrap();
        let content_types: Vec<&str> = requests[0]
            .headers
            .get_all("content-type")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(content_types, vec!["application/json"]);
        assert_eq!(requests[0].headers.get("x-api-key").unwrap().to_str().unwrap(), "secret");
    }
}
