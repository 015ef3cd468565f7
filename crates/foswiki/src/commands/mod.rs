//! CLI command handlers.

pub mod config;
pub mod id;
pub mod post;
pub mod pref;
pub mod ready;
pub mod url;

use anyhow::{Context as _, Result};
use foswiki_client::{FoswikiClient, Page, Session};
use foswiki_config::FoswikiConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// Page the session is bound to, if any.
    pub page: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Merged configuration.
    pub config: FoswikiConfig,
}

impl Context {
    /// Build an HTTP client from the server settings.
    pub fn client(&self) -> Result<FoswikiClient> {
        let server = self.config.server();
        let mut builder = FoswikiClient::builder()
            .base_url(&self.server_url)
            .timeout(server.timeout());
        if let Some(agent) = server.user_agent {
            builder = builder.user_agent(agent);
        }
        builder
            .build()
            .with_context(|| format!("invalid server URL '{}'", self.server_url))
    }

    /// Open a session on the configured page.
    ///
    /// Without a page the session is bound to a blank page and only
    /// configured preferences are known.
    pub async fn session(&self) -> Result<Session> {
        let client = self.client()?;
        let mut builder = Session::builder(client.clone()).preferences(
            self.config
                .preferences
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        if let Some(location) = &self.page {
            let response = client
                .get_text(location)
                .await
                .with_context(|| format!("failed to load page '{}'", location))?;
            builder = builder.page(Page::parse(location.clone(), response.body));
        }

        Ok(builder.build()?)
    }
}

/// Parse a `key=value` argument.
pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}
