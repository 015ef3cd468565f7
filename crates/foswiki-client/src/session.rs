//! A page session: one page plus everything scripts on it share.

use std::sync::Arc;

use crate::api::{FormsApi, PreferencesApi, ScriptsApi};
use crate::client::FoswikiClient;
use crate::error::Result;
use crate::forms::{ConfirmationPresenter, FormPoster, LogPresenter};
use crate::page::Page;
use crate::preferences::PreferenceResolver;
use crate::ready::{ReadyReport, on_ready};
use crate::validation::TokenTransform;

/// State shared by everything acting on one page.
///
/// Owns the preference cache, so preferences resolved through one session
/// are never seen by another.
///
/// # Example
///
/// ```no_run
/// use foswiki_client::{FormData, FoswikiClient, Session};
///
/// # async fn example() -> foswiki_client::Result<()> {
/// let client = FoswikiClient::builder()
///     .base_url("http://localhost:8080")
///     .build()?;
/// let session = Session::open(client, "/bin/view/Main/WebHome").await?;
///
/// let skin = session.preferences().get("SKIN", true).await?;
/// let url = session.scripts().url("view", Some("Main"), Some("WebHome"), &[]);
/// let outcome = session
///     .forms()
///     .post("save", FormData::new().with("web", "Main").with("topic", "WebHome"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: FoswikiClient,
    page: Arc<Page>,
    resolver: PreferenceResolver,
    transform: Option<Box<dyn TokenTransform>>,
    presenter: Box<dyn ConfirmationPresenter>,
}

impl Session {
    /// Start building a session.
    pub fn builder(client: FoswikiClient) -> SessionBuilder {
        SessionBuilder::new(client)
    }

    /// Fetch the page at `location` and open a session on it.
    pub async fn open(client: FoswikiClient, location: &str) -> Result<Self> {
        let response = client.get_text(location).await?;
        let page = Page::parse(location, response.body);
        Self::builder(client).page(page).build()
    }

    /// The HTTP client.
    pub fn client(&self) -> &FoswikiClient {
        &self.inner.client
    }

    /// The page this session is bound to.
    pub fn page(&self) -> &Page {
        &self.inner.page
    }

    /// The session's preference resolver.
    pub fn resolver(&self) -> &PreferenceResolver {
        &self.inner.resolver
    }

    /// Run the page's ready behaviors.
    pub fn ready(&self) -> ReadyReport {
        on_ready(&self.inner.page)
    }

    pub(crate) fn poster(&self) -> FormPoster<'_> {
        FormPoster::new(
            &self.inner.client,
            &self.inner.page,
            &self.inner.resolver,
            self.inner.presenter.as_ref(),
        )
        .with_transform(self.inner.transform.as_deref())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access preference lookups.
    pub fn preferences(&self) -> PreferencesApi {
        PreferencesApi::new(self.clone())
    }

    /// Access script URL construction.
    pub fn scripts(&self) -> ScriptsApi {
        ScriptsApi::new(self.clone())
    }

    /// Access validated form posts.
    pub fn forms(&self) -> FormsApi {
        FormsApi::new(self.clone())
    }
}

/// Builder for creating a Session.
pub struct SessionBuilder {
    client: FoswikiClient,
    page: Option<Page>,
    preferences: Vec<(String, Option<String>)>,
    transform: Option<Box<dyn TokenTransform>>,
    presenter: Option<Box<dyn ConfirmationPresenter>>,
}

impl SessionBuilder {
    /// Create a builder for a session using `client`.
    pub fn new(client: FoswikiClient) -> Self {
        Self {
            client,
            page: None,
            preferences: Vec::new(),
            transform: None,
            presenter: None,
        }
    }

    /// Bind the session to a page. Defaults to a blank page at the base URL.
    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Preload preferences. These take precedence over values the page
    /// inlines.
    pub fn preferences<I, K, V>(mut self, prefs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.preferences
            .extend(prefs.into_iter().map(|(k, v)| (k.into(), Some(v.into()))));
        self
    }

    /// Process validation tokens before they are sent.
    pub fn token_transform(mut self, transform: impl TokenTransform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Show confirmation dialogs with `presenter` instead of logging them.
    pub fn presenter(mut self, presenter: impl ConfirmationPresenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<Session> {
        let page = Arc::new(
            self.page
                .unwrap_or_else(|| Page::blank(self.client.base_url().as_str())),
        );

        let resolver = PreferenceResolver::new(self.client.clone(), page.clone());
        resolver.cache().seed(self.preferences);
        resolver
            .cache()
            .seed(page.preloaded_preferences().iter().cloned());
        tracing::debug!(
            location = page.location(),
            preloaded = resolver.cache().len(),
            "session ready"
        );

        Ok(Session {
            inner: Arc::new(SessionInner {
                client: self.client,
                page,
                resolver,
                transform: self.transform,
                presenter: self
                    .presenter
                    .unwrap_or_else(|| Box::new(LogPresenter) as Box<dyn ConfirmationPresenter>),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FoswikiClient {
        FoswikiClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_preferences_override_inline() {
        let html = r#"<html><head>
            <script class="foswikiPreferences" type="text/json">{"SKIN":"pattern","WEB":"Main"}</script>
        </head><body></body></html>"#;
        let session = Session::builder(client())
            .page(Page::parse("/bin/view/Main/WebHome", html))
            .preferences([("SKIN", "natskin")])
            .build()
            .unwrap();

        let prefs = session.resolver();
        assert_eq!(prefs.lookup_local("SKIN").as_deref(), Some("natskin"));
        assert_eq!(prefs.lookup_local("WEB").as_deref(), Some("Main"));
    }

    #[test]
    fn test_default_page_is_blank_at_base_url() {
        let session = Session::builder(client()).build().unwrap();
        assert_eq!(session.page().location(), "http://127.0.0.1:9/");
        assert_eq!(session.page().validation_key(), None);
    }

    #[test]
    fn test_sessions_do_not_share_caches() {
        let a = Session::builder(client())
            .preferences([("SKIN", "a")])
            .build()
            .unwrap();
        let b = Session::builder(client()).build().unwrap();

        assert_eq!(a.resolver().lookup_local("SKIN").as_deref(), Some("a"));
        assert_eq!(b.resolver().lookup_local("SKIN"), None);
    }
}
