//! Validated form posts.
//!
//! Every post carries the page's validation token. Whatever the outcome,
//! a fresh token sent back by the server is written into every validation
//! field of the page. A `419` response means the server wants the user to
//! confirm the action: its dialog is extracted and presented, and the page's
//! confirmation elements are revealed, instead of surfacing an error.

use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::client::FoswikiClient;
use crate::error::{Error, Result};
use crate::page::{Page, VALIDATION_FIELD};
use crate::preferences::PreferenceResolver;
use crate::script_url::build_script_url;
use crate::types::{FormData, TextResponse, header_value};
use crate::validation::{TokenTransform, VALIDATION_HEADER, ValidationToken};

/// Status the server uses to ask for confirmation.
pub const CONFIRMATION_REQUIRED: u16 = 419;

/// Class of page elements shown once a confirmation is pending.
pub const CONFIRMATION_CLASS: &str = "s1js_available";

/// A confirmation request to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationDialog {
    /// HTML fragment to render.
    pub html: String,
    /// Dialog title.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the dialog blocks the rest of the page.
    pub modal: bool,
}

impl ConfirmationDialog {
    /// Dialog with the standard geometry around `html`.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            title: "confirm change".to_string(),
            width: 600,
            height: 410,
            modal: true,
        }
    }

    /// Build the dialog from a `419` response body.
    ///
    /// The fragment is every top-level `.container-fluid` of the first
    /// top-level `.foswikiMain`; the whole body is used when there is none.
    pub fn from_response_body(body: &str) -> Self {
        match confirmation_fragment(body) {
            Some(fragment) => Self::new(fragment),
            None => {
                tracing::warn!("confirmation response has no dialog fragment; using full body");
                Self::new(body)
            }
        }
    }
}

fn confirmation_fragment(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let main = Selector::parse("body > .foswikiMain").ok()?;
    let fragment: String = document
        .select(&main)
        .next()?
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().classes().any(|c| c == "container-fluid"))
        .map(|el| el.html())
        .collect();
    (!fragment.is_empty()).then_some(fragment)
}

/// Shows confirmation dialogs to the user.
pub trait ConfirmationPresenter: Send + Sync {
    /// Present `dialog`.
    fn present(&self, dialog: &ConfirmationDialog);
}

/// Presenter that only records the dialog in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl ConfirmationPresenter for LogPresenter {
    fn present(&self, dialog: &ConfirmationDialog) {
        tracing::info!(title = %dialog.title, bytes = dialog.html.len(), "confirmation required");
    }
}

/// Result of a post that reached the server.
#[derive(Debug, Clone)]
pub enum PostOutcome {
    /// The server accepted the post.
    Completed(TextResponse),
    /// The server asked for confirmation; the dialog has been presented.
    ConfirmationRequired(ConfirmationDialog),
}

impl PostOutcome {
    /// Whether the post was accepted.
    pub fn is_completed(&self) -> bool {
        matches!(self, PostOutcome::Completed(_))
    }
}

/// Posts forms on behalf of one page.
pub struct FormPoster<'a> {
    client: &'a FoswikiClient,
    page: &'a Page,
    prefs: &'a PreferenceResolver,
    presenter: &'a dyn ConfirmationPresenter,
    transform: Option<&'a dyn TokenTransform>,
}

impl<'a> FormPoster<'a> {
    /// Create a poster with no token transform.
    pub fn new(
        client: &'a FoswikiClient,
        page: &'a Page,
        prefs: &'a PreferenceResolver,
        presenter: &'a dyn ConfirmationPresenter,
    ) -> Self {
        Self {
            client,
            page,
            prefs,
            presenter,
            transform: None,
        }
    }

    /// Process tokens with `transform` before sending.
    pub fn with_transform(mut self, transform: Option<&'a dyn TokenTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Post `payload` to `script`.
    ///
    /// The `web` and `topic` fields of the payload select the target topic.
    /// Failures other than a confirmation request are returned untouched as
    /// [`Error::Api`]; there is no retry.
    pub async fn post(&self, script: &str, mut payload: FormData) -> Result<PostOutcome> {
        match self.obtain_token().await? {
            Some(token) => {
                let token = token.transformed(self.transform);
                payload.set(VALIDATION_FIELD, token.as_str());
            }
            None => tracing::warn!(script, "no validation token available; posting without one"),
        }

        let url = build_script_url(
            self.prefs,
            true,
            script,
            payload.web(),
            payload.topic(),
            None,
        );

        match self.client.post_form(&url, payload.as_pairs()).await {
            Ok(response) => {
                self.refresh_tokens(&response.headers);
                Ok(PostOutcome::Completed(response))
            }
            Err(Error::Api {
                status,
                headers,
                body,
            }) => {
                self.refresh_tokens(&headers);
                if status == CONFIRMATION_REQUIRED {
                    let dialog = ConfirmationDialog::from_response_body(&body);
                    self.presenter.present(&dialog);
                    let shown = self.page.reveal(CONFIRMATION_CLASS);
                    tracing::debug!(script, shown, "confirmation requested");
                    Ok(PostOutcome::ConfirmationRequired(dialog))
                } else {
                    Err(Error::Api {
                        status,
                        headers,
                        body,
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Token from the page, or else from a fresh fetch of the page.
    async fn obtain_token(&self) -> Result<Option<ValidationToken>> {
        if let Some(key) = self.page.validation_key() {
            return Ok(Some(ValidationToken::new(key)));
        }

        tracing::debug!(location = self.page.location(), "fetching validation token");
        let headers = match self.client.get_text(self.page.location()).await {
            Ok(response) => response.headers,
            Err(Error::Api { headers, .. }) => headers,
            Err(e) => return Err(e),
        };
        Ok(header_value(&headers, VALIDATION_HEADER).map(ValidationToken::new))
    }

    fn refresh_tokens(&self, headers: &HeaderMap) {
        if let Some(key) = header_value(headers, VALIDATION_HEADER) {
            let updated = self.page.set_validation_keys(&ValidationToken::new(key).marked());
            tracing::debug!(updated, "validation token refreshed");
        }
    }
}
