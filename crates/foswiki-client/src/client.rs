//! HTTP transport for talking to a Foswiki server.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::types::TextResponse;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Foswiki HTTP client.
///
/// Cheap to clone; clones share the underlying connection pool. Script
/// paths produced by [`crate::script_url`] are resolved against the base
/// URL, so relative (`/bin/view`) and absolute URLs both work.
///
/// # Example
///
/// ```no_run
/// use foswiki_client::FoswikiClient;
///
/// # async fn example() -> foswiki_client::Result<()> {
/// let client = FoswikiClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
///
/// let page = client.get_text("/bin/view/Main/WebHome").await?;
/// println!("{}", page.body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FoswikiClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for script paths.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
}

impl FoswikiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a script path or absolute URL against the base URL.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        self.inner.base_url.join(target).map_err(Error::from)
    }

    /// GET a URL and return its body as text.
    pub async fn get_text(&self, target: &str) -> Result<TextResponse> {
        let url = self.resolve(target)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        Self::into_text(response).await
    }

    /// GET a URL with query parameters appended.
    pub async fn get_text_with_query<Q>(&self, target: &str, query: &Q) -> Result<TextResponse>
    where
        Q: serde::Serialize + ?Sized,
    {
        let url = self.resolve(target)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        Self::into_text(response).await
    }

    /// POST form-encoded fields.
    pub async fn post_form<B>(&self, target: &str, fields: &B) -> Result<TextResponse>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.resolve(target)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .form(fields)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        Self::into_text(response).await
    }

    /// Read a response, turning non-success statuses into [`Error::Api`].
    async fn into_text(response: reqwest::Response) -> Result<TextResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if status.is_success() {
            Ok(TextResponse {
                status: status.as_u16(),
                headers,
                body,
            })
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                headers,
                body,
            })
        }
    }
}

/// Builder for creating a FoswikiClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<FoswikiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("foswiki-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(FoswikiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_malformed_url() {
        let result = ClientBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/foswiki")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/foswiki/");
    }

    #[test]
    fn test_resolve_script_paths() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.resolve("/bin/view/Main/WebHome").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/bin/view/Main/WebHome");

        let url = client.resolve("https://wiki.example.org/bin/save").unwrap();
        assert_eq!(url.as_str(), "https://wiki.example.org/bin/save");
    }
}
