//! The document a session is bound to.
//!
//! A [`Page`] is parsed once from the HTML of a rendered topic. The parts
//! that scripts read (meta tags, inline preferences) are captured up front;
//! the parts they change (validation fields, body classes, revealed
//! elements) live behind a lock so a shared session can update them.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use scraper::{ElementRef, Html, Selector};

/// Name of the hidden input carrying the validation token.
pub const VALIDATION_FIELD: &str = "validation_key";

/// Source of page meta-data, keyed by the meta tag's `name` attribute.
pub trait MetaSource: Send + Sync {
    /// Raw `content` of the meta tag named `name`, if present.
    fn meta(&self, name: &str) -> Option<String>;
}

/// A parsed wiki page.
#[derive(Debug)]
pub struct Page {
    location: String,
    html: String,
    meta: HashMap<String, String>,
    preloaded: Vec<(String, Option<String>)>,
    state: RwLock<PageState>,
}

#[derive(Debug, Default)]
struct PageState {
    validation_keys: Vec<String>,
    body_classes: Vec<String>,
    revealed: BTreeSet<String>,
}

impl Page {
    /// Parse a page fetched from `location`.
    pub fn parse(location: impl Into<String>, html: impl Into<String>) -> Self {
        let location = location.into();
        let html = html.into();
        let document = Html::parse_document(&html);

        // First tag wins for a repeated name.
        let mut meta = HashMap::new();
        for el in select_all(&document, "meta[name]") {
            let attrs = el.value();
            if let (Some(name), Some(content)) = (attrs.attr("name"), attrs.attr("content")) {
                meta.entry(name.to_string())
                    .or_insert_with(|| content.to_string());
            }
        }

        let validation_keys = select_all(&document, &format!("input[name=\"{VALIDATION_FIELD}\"]"))
            .into_iter()
            .map(|el| el.value().attr("value").unwrap_or_default().to_string())
            .collect();

        let body_classes = select_all(&document, "body")
            .first()
            .map(|el| el.value().classes().map(str::to_string).collect())
            .unwrap_or_default();

        let preloaded = inline_preferences(&document);

        tracing::debug!(%location, "parsed page");

        Self {
            location,
            html,
            meta,
            preloaded,
            state: RwLock::new(PageState {
                validation_keys,
                body_classes,
                revealed: BTreeSet::new(),
            }),
        }
    }

    /// An empty page at `location`.
    pub fn blank(location: impl Into<String>) -> Self {
        Self::parse(location, "<html><head></head><body></body></html>")
    }

    /// Where the page was fetched from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Re-parse the page source for ad-hoc queries.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Raw content of a meta tag, without unescaping.
    pub fn meta_tag(&self, name: &str) -> Option<&str> {
        self.meta.get(name).map(String::as_str)
    }

    /// Preferences inlined into the page as a JSON block.
    pub fn preloaded_preferences(&self) -> &[(String, Option<String>)] {
        &self.preloaded
    }

    /// Value of the first validation field, if the page has one.
    pub fn validation_key(&self) -> Option<String> {
        self.state.read().validation_keys.first().cloned()
    }

    /// Current value of every validation field.
    pub fn validation_keys(&self) -> Vec<String> {
        self.state.read().validation_keys.clone()
    }

    /// Overwrite every validation field. Returns how many were updated.
    pub fn set_validation_keys(&self, value: &str) -> usize {
        let mut state = self.state.write();
        for key in state.validation_keys.iter_mut() {
            *key = value.to_string();
        }
        state.validation_keys.len()
    }

    /// Current body classes.
    pub fn body_classes(&self) -> Vec<String> {
        self.state.read().body_classes.clone()
    }

    /// Whether the body carries `class`.
    pub fn has_body_class(&self, class: &str) -> bool {
        self.state.read().body_classes.iter().any(|c| c == class)
    }

    /// Remove one body class and add another.
    pub fn swap_body_class(&self, remove: &str, add: &str) {
        let mut state = self.state.write();
        state.body_classes.retain(|c| c != remove);
        if !state.body_classes.iter().any(|c| c == add) {
            state.body_classes.push(add.to_string());
        }
    }

    /// Show every element carrying `class`. Returns how many matched.
    pub fn reveal(&self, class: &str) -> usize {
        let count = select_all(&self.document(), &format!(".{class}")).len();
        self.state.write().revealed.insert(class.to_string());
        count
    }

    /// Whether elements carrying `class` have been revealed.
    pub fn is_revealed(&self, class: &str) -> bool {
        self.state.read().revealed.contains(class)
    }
}

impl MetaSource for Page {
    fn meta(&self, name: &str) -> Option<String> {
        self.meta_tag(name).map(str::to_string)
    }
}

/// All elements matching `css`; an unparsable selector matches nothing.
pub(crate) fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            tracing::warn!(css, error = %e, "invalid selector");
            Vec::new()
        }
    }
}

/// Parse `<script class="foswikiPreferences" type="text/json">` blocks.
fn inline_preferences(document: &Html) -> Vec<(String, Option<String>)> {
    let mut prefs = Vec::new();
    for el in select_all(document, "script.foswikiPreferences[type=\"text/json\"]") {
        let text: String = el.text().collect();
        let parsed: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&text)
        {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed inline preferences");
                continue;
            }
        };
        for (key, value) in parsed {
            let value = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            prefs.push((key, value));
        }
    }
    prefs
}
