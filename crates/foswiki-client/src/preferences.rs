//! Preference resolution.
//!
//! A preference is looked up, first hit wins, in:
//! 1. the session's [`PreferenceCache`]
//! 2. the page meta tag `foswiki.<KEY>` (URL-unescaped)
//! 3. the server, when the caller allows a remote lookup
//!
//! A miss with no remote lookup caches `None`, so the key is never
//! resolved again for the lifetime of the cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::FoswikiClient;
use crate::error::Result;
use crate::page::MetaSource;
use crate::script_url::build_script_url;

/// Prefix of meta tags carrying preferences.
pub const META_PREFIX: &str = "foswiki.";

/// Topic that expands preferences when fetched with the text skin.
pub const AJAX_HELPER_TOPIC: &str = "JQueryAjaxHelper";

/// Preference naming the web that holds [`AJAX_HELPER_TOPIC`].
pub const SYSTEM_WEB_KEY: &str = "SYSTEMWEB";

/// Lazily filled preference values for one page session.
///
/// Entries are write-once: the first value stored for a key (including
/// `None`) is the value every later lookup sees.
#[derive(Debug, Default)]
pub struct PreferenceCache {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl PreferenceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for `key`. The outer `None` means "not resolved yet".
    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.entries.lock().get(key).cloned()
    }

    /// Store `value` unless `key` already has an entry, and return the
    /// value that ends up cached.
    pub fn fill(&self, key: &str, value: Option<String>) -> Option<String> {
        self.entries
            .lock()
            .entry(key.to_string())
            .or_insert(value)
            .clone()
    }

    /// Fill many entries at once.
    pub fn seed<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.entry(key.into()).or_insert(value);
        }
    }

    /// Whether `key` has been resolved.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, Option<String>> {
        self.entries
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Resolves preferences against the cache, page meta-data and server.
pub struct PreferenceResolver {
    client: FoswikiClient,
    meta: Arc<dyn MetaSource>,
    cache: PreferenceCache,
}

impl PreferenceResolver {
    /// Create a resolver with an empty cache.
    pub fn new(client: FoswikiClient, meta: Arc<dyn MetaSource>) -> Self {
        Self {
            client,
            meta,
            cache: PreferenceCache::new(),
        }
    }

    /// The resolver's cache.
    pub fn cache(&self) -> &PreferenceCache {
        &self.cache
    }

    /// Resolve `key` without contacting the server.
    ///
    /// A miss is cached as `None`.
    pub fn lookup_local(&self, key: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(key) {
            return cached;
        }
        if let Some(value) = self.lookup_meta(key) {
            return Some(value);
        }
        tracing::debug!(key, "preference not found locally");
        self.cache.fill(key, None)
    }

    /// Resolve `key`, asking the server when `allow_remote` is set and no
    /// local source has it.
    ///
    /// Remote values must be awaited before use; a failed remote lookup
    /// leaves the key unresolved so a later call may try again.
    pub async fn get(&self, key: &str, allow_remote: bool) -> Result<Option<String>> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached);
        }
        if let Some(value) = self.lookup_meta(key) {
            return Ok(Some(value));
        }
        if allow_remote {
            return self.fetch_remote(key).await;
        }
        tracing::debug!(key, "preference not found locally");
        Ok(self.cache.fill(key, None))
    }

    fn lookup_meta(&self, key: &str) -> Option<String> {
        let raw = self.meta.meta(&format!("{META_PREFIX}{key}"))?;
        tracing::debug!(key, "preference from meta tag");
        self.cache.fill(key, Some(unescape(&raw)))
    }

    async fn fetch_remote(&self, key: &str) -> Result<Option<String>> {
        // SYSTEMWEB is only ever looked up locally, so this cannot recurse.
        let system_web = self.lookup_local(SYSTEM_WEB_KEY);
        if system_web.is_none() {
            tracing::warn!(key, "SYSTEMWEB unresolved; requesting helper without a web");
        }
        let url = build_script_url(
            self,
            true,
            "view",
            system_web.as_deref(),
            Some(AJAX_HELPER_TOPIC),
            None,
        );

        tracing::debug!(key, %url, "fetching preference from server");
        let response = self
            .client
            .get_text_with_query(
                &url,
                &[("skin", "text"), ("section", "expand"), ("expression", key)],
            )
            .await?;

        Ok(self.cache.fill(key, Some(response.body)))
    }
}

/// Decode `%XX` escapes. Invalid UTF-8 is replaced rather than rejected.
pub fn unescape(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}
