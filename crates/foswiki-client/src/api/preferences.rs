//! Preferences API.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::session::Session;

/// Preferences API client.
pub struct PreferencesApi {
    session: Session,
}

impl PreferencesApi {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Resolve a preference, asking the server when `allow_remote` is set.
    pub async fn get(&self, key: &str, allow_remote: bool) -> Result<Option<String>> {
        self.session.resolver().get(key, allow_remote).await
    }

    /// Resolve a preference from the cache and page only.
    pub fn get_local(&self, key: &str) -> Option<String> {
        self.session.resolver().lookup_local(key)
    }

    /// Every preference resolved so far.
    pub fn resolved(&self) -> BTreeMap<String, Option<String>> {
        self.session.resolver().cache().snapshot()
    }
}
