//! Scripts API.

use crate::script_url::{ScriptUrl, build_script_url};
use crate::session::Session;

/// Scripts API client.
pub struct ScriptsApi {
    session: Session,
}

impl ScriptsApi {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Absolute URL of a script.
    pub fn url(
        &self,
        script: &str,
        web: Option<&str>,
        topic: Option<&str>,
        params: &[(String, String)],
    ) -> String {
        build_script_url(self.session.resolver(), true, script, web, topic, Some(params))
    }

    /// Path of a script, relative to the server root.
    pub fn url_path(
        &self,
        script: &str,
        web: Option<&str>,
        topic: Option<&str>,
        params: &[(String, String)],
    ) -> String {
        build_script_url(self.session.resolver(), false, script, web, topic, Some(params))
    }

    /// Render a [`ScriptUrl`] against this session's preferences.
    pub fn build(&self, url: &ScriptUrl) -> String {
        url.build(self.session.resolver())
    }
}
