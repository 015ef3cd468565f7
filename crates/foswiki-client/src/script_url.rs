//! Script URL construction.
//!
//! Foswiki scripts live under a root taken from the `SCRIPTURL` (absolute)
//! or `SCRIPTURLPATH` (relative) preference. A per-script override such as
//! `SCRIPTURLPATH_EDIT` replaces the root and script name entirely.
//!
//! Query parameters are joined as `key=value` without escaping; callers that
//! need escaping must escape before handing values over.

use crate::preferences::PreferenceResolver;

/// Preference holding the absolute script root.
pub const SCRIPT_URL_KEY: &str = "SCRIPTURL";

/// Preference holding the relative script root.
pub const SCRIPT_URL_PATH_KEY: &str = "SCRIPTURLPATH";

/// Preference holding the script file suffix (e.g. `.pl`).
pub const SCRIPT_SUFFIX_KEY: &str = "SCRIPTSUFFIX";

/// Build the URL of `script`, optionally scoped to a web and topic.
///
/// `params` distinguishes "no parameters" (`None`) from an empty list; both
/// produce no `?`.
pub fn build_script_url(
    prefs: &PreferenceResolver,
    absolute: bool,
    script: &str,
    web: Option<&str>,
    topic: Option<&str>,
    params: Option<&[(String, String)]>,
) -> String {
    let root_key = if absolute {
        SCRIPT_URL_KEY
    } else {
        SCRIPT_URL_PATH_KEY
    };
    let suffix = prefs.lookup_local(SCRIPT_SUFFIX_KEY).unwrap_or_default();
    let override_key = format!("{}_{}", root_key, script.to_uppercase());

    let mut url = match prefs
        .lookup_local(&override_key)
        .filter(|url| !url.is_empty())
    {
        Some(url) => url,
        None => {
            let root = prefs.lookup_local(root_key).unwrap_or_else(|| {
                tracing::warn!(key = root_key, "script root preference missing");
                String::new()
            });
            format!("{}/{}{}", root, script, suffix)
        }
    };

    if let Some(web) = web {
        url.push('/');
        url.push_str(web);
    }
    if let Some(topic) = topic {
        url.push('/');
        url.push_str(topic);
    }
    if let Some(params) = params.filter(|p| !p.is_empty()) {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&query);
    }

    url
}

/// Builder over [`build_script_url`].
///
/// ```no_run
/// # use foswiki_client::{ScriptUrl, Session};
/// # fn example(session: &Session) {
/// let url = ScriptUrl::new("view")
///     .web("Main")
///     .topic("WebHome")
///     .param("skin", "text")
///     .build(session.resolver());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScriptUrl {
    absolute: bool,
    script: String,
    web: Option<String>,
    topic: Option<String>,
    params: Option<Vec<(String, String)>>,
}

impl ScriptUrl {
    /// An absolute URL for `script`.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            absolute: true,
            script: script.into(),
            web: None,
            topic: None,
            params: None,
        }
    }

    /// Use the relative script root instead.
    pub fn relative(mut self) -> Self {
        self.absolute = false;
        self
    }

    /// Scope to a web.
    pub fn web(mut self, web: impl Into<String>) -> Self {
        self.web = Some(web.into());
        self
    }

    /// Scope to a topic.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Append a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Append several query parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let list = self.params.get_or_insert_with(Vec::new);
        list.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve preferences and render the URL.
    pub fn build(&self, prefs: &PreferenceResolver) -> String {
        build_script_url(
            prefs,
            self.absolute,
            &self.script,
            self.web.as_deref(),
            self.topic.as_deref(),
            self.params.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FoswikiClient;
    use crate::page::Page;
    use std::sync::Arc;

    fn prefs(seed: &[(&str, &str)]) -> PreferenceResolver {
        let client = FoswikiClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let resolver = PreferenceResolver::new(client, Arc::new(Page::blank("/")));
        resolver
            .cache()
            .seed(seed.iter().map(|(k, v)| (*k, Some(v.to_string()))));
        resolver
    }

    #[test]
    fn test_full_url() {
        let prefs = prefs(&[("SCRIPTURL", "/bin")]);
        let params = vec![("skin".to_string(), "text".to_string())];
        let url = build_script_url(&prefs, true, "view", Some("Main"), Some("WebHome"), Some(params.as_slice()));
        assert_eq!(url, "/bin/view/Main/WebHome?skin=text");
    }

    #[test]
    fn test_script_only() {
        let prefs = prefs(&[("SCRIPTURL", "/bin")]);
        assert_eq!(build_script_url(&prefs, true, "view", None, None, None), "/bin/view");
        assert_eq!(build_script_url(&prefs, true, "view", None, None, Some(&[][..])), "/bin/view");
    }

    #[test]
    fn test_relative_root_and_suffix() {
        let prefs = prefs(&[
            ("SCRIPTURL", "http://wiki.example.org/bin"),
            ("SCRIPTURLPATH", "/bin"),
            ("SCRIPTSUFFIX", ".pl"),
        ]);
        let url = ScriptUrl::new("save").relative().web("Sandbox").build(&prefs);
        assert_eq!(url, "/bin/save.pl/Sandbox");

        let url = ScriptUrl::new("save").build(&prefs);
        assert_eq!(url, "http://wiki.example.org/bin/save.pl");
    }

    #[test]
    fn test_per_script_override() {
        let prefs = prefs(&[
            ("SCRIPTURLPATH", "/bin"),
            ("SCRIPTURLPATH_VIEW", "/view"),
            ("SCRIPTSUFFIX", ".pl"),
        ]);
        let url = ScriptUrl::new("view").relative().web("Main").topic("WebHome").build(&prefs);
        assert_eq!(url, "/view/Main/WebHome");
    }

    #[test]
    fn test_empty_override_falls_back_to_root() {
        let prefs = prefs(&[("SCRIPTURL", "/bin"), ("SCRIPTURL_EDIT", "")]);
        assert_eq!(ScriptUrl::new("edit").build(&prefs), "/bin/edit");
    }

    #[test]
    fn test_params_are_not_escaped_and_keep_order() {
        let prefs = prefs(&[("SCRIPTURL", "/bin")]);
        let url = ScriptUrl::new("view")
            .params([("b", "x y"), ("a", "1&2")])
            .build(&prefs);
        assert_eq!(url, "/bin/view?b=x y&a=1&2");
    }

    #[test]
    fn test_missing_root_yields_bare_path() {
        let prefs = prefs(&[]);
        assert_eq!(ScriptUrl::new("view").build(&prefs), "/view");
    }
}
