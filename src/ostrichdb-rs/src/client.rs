use crate::builders::ProjectBuilder;
use crate::response::{parse_name_list, split_lines, HealthCheck};
use crate::{ClientError, Result};
use ostrichdb_core::{endpoint, ClientConfig, RecordId, SearchOptions};
use parking_lot::RwLock;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// OstrichDB REST API Client
///
/// Cloning is cheap: clones (and every builder derived from them) share one
/// connection pool and one token slot. The token is not synchronized with
/// in-flight requests; a request already being built may go out with either
/// the old or the new token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    timeout: Duration,
    token: RwLock<Option<String>>,
    http: HttpClient,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .field("has_token", &self.inner.token.read().is_some())
            .finish()
    }
}

impl Client {
    /// Create a new client connected to the given base URL, with default
    /// timeout and no token
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::default().with_base_url(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let timeout = config.timeout();
        let http = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout,
                token: RwLock::new(config.token),
                http,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Replace the bearer token used by all subsequent requests
    pub fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write() = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.inner.token.write() = None;
    }

    /// Send one request to `endpoint` (path plus any query string) and
    /// return the raw response text
    pub async fn request(&self, method: Method, endpoint: &str) -> Result<String> {
        self.send(method, endpoint, None).await
    }

    /// Like [`Client::request`], with `body` serialized to JSON. The body is
    /// dropped for `GET`.
    pub async fn request_json<B>(&self, method: Method, endpoint: &str, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let body = if method == Method::GET {
            None
        } else {
            Some(serde_json::to_string(body)?)
        };
        self.send(method, endpoint, body).await
    }

    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn send(&self, method: Method, endpoint: &str, body: Option<String>) -> Result<String> {
        let url = format!("{}{}", self.inner.base_url, endpoint);

        let mut req = self
            .inner
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        let token = self.inner.token.read().clone();
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        tracing::debug!(status = status.as_u16(), bytes = text.len(), "Response received");

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "Request rejected by server");
            return Err(ClientError::Server {
                status: status.as_u16(),
                // Canonical phrase for the code; reqwest does not expose the
                // server's own reason phrase
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: text,
            });
        }

        Ok(text)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            tracing::warn!(timeout = ?self.inner.timeout, "Request timed out");
            ClientError::Timeout(self.inner.timeout)
        } else {
            tracing::warn!(error = %err, "Request failed");
            ClientError::Request(err)
        }
    }

    // ----- Projects -----

    /// List all projects
    pub async fn list_projects(&self) -> Result<Vec<String>> {
        let body = self.request(Method::GET, &endpoint::projects()).await?;
        Ok(parse_name_list(&body, "projects"))
    }

    pub async fn create_project(&self, name: &str) -> Result<()> {
        self.request(Method::POST, &endpoint::project(name)?).await?;
        Ok(())
    }

    pub async fn delete_project(&self, name: &str) -> Result<()> {
        self.request(Method::DELETE, &endpoint::project(name)?).await?;
        Ok(())
    }

    // ----- Collections -----

    pub async fn list_collections(&self, project: &str) -> Result<Vec<String>> {
        let body = self
            .request(Method::GET, &endpoint::collections(project)?)
            .await?;
        Ok(parse_name_list(&body, "collections"))
    }

    pub async fn create_collection(&self, project: &str, collection: &str) -> Result<()> {
        self.request(Method::POST, &endpoint::collection(project, collection)?)
            .await?;
        Ok(())
    }

    /// Entire collection as returned by the server, excluding metadata
    pub async fn get_collection(&self, project: &str, collection: &str) -> Result<String> {
        self.request(Method::GET, &endpoint::collection(project, collection)?)
            .await
    }

    pub async fn delete_collection(&self, project: &str, collection: &str) -> Result<()> {
        self.request(Method::DELETE, &endpoint::collection(project, collection)?)
            .await?;
        Ok(())
    }

    // ----- Clusters -----

    pub async fn list_clusters(&self, project: &str, collection: &str) -> Result<Vec<String>> {
        let body = self
            .request(Method::GET, &endpoint::clusters(project, collection)?)
            .await?;
        Ok(parse_name_list(&body, "clusters"))
    }

    pub async fn create_cluster(&self, project: &str, collection: &str, cluster: &str) -> Result<()> {
        self.request(
            Method::POST,
            &endpoint::cluster(project, collection, cluster)?,
        )
        .await?;
        Ok(())
    }

    /// Contents of a cluster, excluding its name and id
    pub async fn get_cluster(&self, project: &str, collection: &str, cluster: &str) -> Result<String> {
        self.request(Method::GET, &endpoint::cluster(project, collection, cluster)?)
            .await
    }

    pub async fn delete_cluster(&self, project: &str, collection: &str, cluster: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &endpoint::cluster(project, collection, cluster)?,
        )
        .await?;
        Ok(())
    }

    // ----- Records -----

    pub async fn list_records(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
    ) -> Result<Vec<String>> {
        let body = self
            .request(Method::GET, &endpoint::records(project, collection, cluster)?)
            .await?;
        Ok(parse_name_list(&body, "records"))
    }

    /// List records narrowed by `options`. Results are always read as
    /// newline-separated text.
    pub async fn search_records(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        options: &SearchOptions,
    ) -> Result<Vec<String>> {
        let body = self
            .request(
                Method::GET,
                &endpoint::search_records(project, collection, cluster, options)?,
            )
            .await?;
        Ok(split_lines(&body))
    }

    /// Create a record. The type tag is upper-cased before sending; the
    /// value is passed through untouched.
    pub async fn create_record(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        name: &str,
        record_type: &str,
        value: &str,
    ) -> Result<()> {
        self.request(
            Method::POST,
            &endpoint::create_record(project, collection, cluster, name, record_type, value)?,
        )
        .await?;
        Ok(())
    }

    /// Fetch a record by name or id, returned verbatim in the form
    /// `<name> :<TYPE>: <value>`
    pub async fn get_record(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        record: impl Into<RecordId>,
    ) -> Result<String> {
        let record = record.into();
        self.request(
            Method::GET,
            &endpoint::record(project, collection, cluster, &record)?,
        )
        .await
    }

    pub async fn delete_record(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        name: &str,
    ) -> Result<()> {
        let record = RecordId::from(name);
        self.request(
            Method::DELETE,
            &endpoint::record(project, collection, cluster, &record)?,
        )
        .await?;
        Ok(())
    }

    // ----- Utility -----

    /// Ping `/health`
    pub async fn health_check(&self) -> Result<HealthCheck> {
        let body = self.request(Method::GET, endpoint::HEALTH).await?;
        Ok(HealthCheck::parse(&body))
    }

    /// Entry point of the builder chain
    pub fn project(&self, name: impl Into<String>) -> ProjectBuilder {
        ProjectBuilder::new(self.clone(), name.into(), None)
    }

    pub fn project_with_id(&self, name: impl Into<String>, id: impl Into<String>) -> ProjectBuilder {
        ProjectBuilder::new(self.clone(), name.into(), Some(id.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> Client {
        Client::with_config(
            ClientConfig::default()
                .with_base_url(server.base_url())
                .with_token("test-token")
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = Client::new("http://localhost:8042/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8042");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = Client::with_config(ClientConfig::default().with_token("secret")).unwrap();
        let printed = format!("{client:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("has_token: true"));
    }

    #[tokio::test]
    async fn test_get_sends_standard_headers() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/projects")
                .header("content-type", "application/json")
                .header("accept", "application/json")
                .header("authorization", "Bearer test-token");
            then.status(200).body("project1\nproject2\nproject3");
        });

        let projects = client_for(&server).list_projects().await.unwrap();

        assert_eq!(projects, vec!["project1", "project2", "project3"]);
        mock.assert();
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/health")
                .header_missing("authorization");
            then.status(200).body("OK");
        });

        let client = Client::new(server.base_url()).unwrap();
        let health = client.health_check().await.unwrap();

        assert_eq!(health, HealthCheck::Text("OK".to_string()));
        mock.assert();
    }

    #[tokio::test]
    async fn test_set_token_applies_to_later_requests() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/projects/p")
                .header("authorization", "Bearer rotated");
            then.status(201);
        });

        let client = client_for(&server);
        let clone = client.clone();
        clone.set_token("rotated");
        client.create_project("p").await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_json_project_list() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/projects");
            then.status(200)
                .json_body(json!({"projects": [{"name": "project1"}, {"name": "project2"}]}));
        });

        let projects = client_for(&server).list_projects().await.unwrap();
        assert_eq!(projects, vec!["project1", "project2"]);
    }

    #[tokio::test]
    async fn test_empty_project_list() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/projects");
            then.status(200).body("");
        });

        assert!(client_for(&server).list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_rejection_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/projects");
            then.status(404).body("Project not found");
        });

        let err = client_for(&server).list_projects().await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("Project not found"));
        assert_eq!(err.to_string(), "HTTP 404: Not Found - Project not found");
    }

    #[tokio::test]
    async fn test_connection_failure_has_no_status() {
        // Nothing listens on the discard port
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let err = client.list_projects().await.unwrap_err();

        assert!(matches!(err, ClientError::Request(_)));
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Request failed: "));
    }

    #[tokio::test]
    async fn test_timeout_aborts_request() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).delay(Duration::from_millis(1500)).body("OK");
        });

        let client = Client::with_config(
            ClientConfig::default()
                .with_base_url(server.base_url())
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let err = client.health_check().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_create_record_sends_query_not_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/projects/p/collections/c/clusters/k/records/greeting")
                .query_param("type", "STRING")
                .query_param("value", "hello world")
                .body("");
            then.status(201);
        });

        client_for(&server)
            .create_record("p", "c", "k", "greeting", "string", "hello world")
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_search_records_sends_filter_fields() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/projects/p/collections/c/clusters/k/records")
                .query_param("type", "INTEGER")
                .query_param("minValue", "10")
                .query_param("limit", "2")
                .query_param_missing("search");
            then.status(200).body("a :INTEGER: 11\nb :INTEGER: 12\n");
        });

        let options = SearchOptions::new()
            .record_type("INTEGER")
            .min_value("10")
            .limit(2);
        let found = client_for(&server)
            .search_records("p", "c", "k", &options)
            .await
            .unwrap();

        assert_eq!(found, vec!["a :INTEGER: 11", "b :INTEGER: 12"]);
        mock.assert();
    }

    #[tokio::test]
    async fn test_get_record_returns_raw_text() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/projects/p/collections/c/clusters/k/records/3");
            then.status(200).body("age :INTEGER: 42");
        });

        let raw = client_for(&server)
            .get_record("p", "c", "k", 3u64)
            .await
            .unwrap();
        assert_eq!(raw, "age :INTEGER: 42");
    }

    #[tokio::test]
    async fn test_delete_collection_uses_delete_verb() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/projects/p/collections/c");
            then.status(200);
        });

        client_for(&server).delete_collection("p", "c").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_request_json_skips_body_on_get() {
        let server = MockServer::start_async().await;
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/custom")
                .json_body(json!({"k": "v"}));
            then.status(200).body("posted");
        });
        // Only matches when no body was framed onto the GET
        let get = server.mock(|when, then| {
            when.method(GET)
                .path("/custom")
                .header_missing("content-length")
                .header_missing("transfer-encoding");
            then.status(200).body("fetched");
        });

        let client = client_for(&server);
        let body = json!({"k": "v"});
        assert_eq!(
            client.request_json(Method::POST, "/custom", &body).await.unwrap(),
            "posted"
        );
        assert_eq!(
            client.request_json(Method::GET, "/custom", &body).await.unwrap(),
            "fetched"
        );
        post.assert();
        get.assert();
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let client = Client::with_config(ClientConfig {
            timeout_ms: 0,
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_dot_segment_identifiers_never_reach_the_server() {
        let server = MockServer::start_async().await;
        let any = server.mock(|when, then| {
            when.path_includes("/api/v1");
            then.status(200);
        });

        let client = client_for(&server);
        let err = client.delete_record("p", "c", "k", "..").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidIdentifier(_)));
        assert_eq!(err.status(), None);

        let err = client.get_record("p", "c", "k", ".").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidIdentifier(_)));

        for result in [
            client.create_project("..").await,
            client.delete_collection("p", ".").await,
            client.delete_cluster("p", "c", "").await,
            client.create_record("p", "c", "k", "..", "STRING", "v").await,
        ] {
            assert!(matches!(result, Err(ClientError::InvalidIdentifier(_))));
        }
        assert!(matches!(
            client.list_records("p", "..", "k").await,
            Err(ClientError::InvalidIdentifier(_))
        ));

        any.assert_hits(0);
    }
}
