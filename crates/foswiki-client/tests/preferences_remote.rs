//! Integration tests for remote preference resolution.
//!
//! Uses wiremock to stand in for the server-side expansion helper.

use foswiki_client::{FoswikiClient, Page, Session};
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn session(mock_server: &MockServer, meta: &str) -> Session {
    let client = FoswikiClient::builder()
        .base_url(mock_server.uri())
        .build()
        .expect("failed to create client");
    let html = format!("<html><head>{meta}</head><body></body></html>");
    Session::builder(client)
        .page(Page::parse("/bin/view/Main/WebHome", html))
        .build()
        .expect("failed to create session")
}

#[tokio::test]
async fn test_remote_lookup_uses_helper_topic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bin/view/System/JQueryAjaxHelper"))
        .and(query_param("skin", "text"))
        .and(query_param("section", "expand"))
        .and(query_param("expression", "SKIN"))
        .respond_with(ResponseTemplate::new(200).set_body_string("natedit,pattern"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let meta = format!(
        r#"<meta name="foswiki.SCRIPTURL" content="{}/bin" /><meta name="foswiki.SYSTEMWEB" content="System" />"#,
        mock_server.uri()
    );
    let session = session(&mock_server, &meta).await;
    let prefs = session.preferences();

    let skin = prefs.get("SKIN", true).await.expect("lookup failed");
    assert_eq!(skin.as_deref(), Some("natedit,pattern"));

    // Served from the cache; the mock expects exactly one request.
    let again = prefs.get("SKIN", true).await.expect("lookup failed");
    assert_eq!(again, skin);
    assert_eq!(prefs.get_local("SKIN"), skin);
}

#[tokio::test]
async fn test_remote_lookup_without_system_web_omits_web_segment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bin/view/JQueryAjaxHelper"))
        .and(query_param("skin", "text"))
        .and(query_param("section", "expand"))
        .and(query_param("expression", "SKIN"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pattern"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let meta = r#"<meta name="foswiki.SCRIPTURL" content="/bin" />"#;
    let session = session(&mock_server, meta).await;

    let skin = session
        .preferences()
        .get("SKIN", true)
        .await
        .expect("lookup failed");
    assert_eq!(skin.as_deref(), Some("pattern"));

    // SYSTEMWEB was only looked up locally and its miss is cached.
    let cache = session.resolver().cache();
    assert_eq!(cache.get("SYSTEMWEB"), Some(None));
    assert_eq!(cache.get("SKIN"), Some(Some("pattern".to_string())));
}

#[tokio::test]
async fn test_remote_failure_leaves_key_unresolved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bin/view/System/JQueryAjaxHelper"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let meta = r#"<meta name="foswiki.SCRIPTURL" content="/bin" /><meta name="foswiki.SYSTEMWEB" content="System" />"#;
    let session = session(&mock_server, meta).await;

    let err = session
        .preferences()
        .get("SKIN", true)
        .await
        .expect_err("expected server error");
    assert!(err.is_server_error());
    assert!(!session.resolver().cache().contains("SKIN"));
}

#[tokio::test]
async fn test_local_lookup_never_contacts_server() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let meta = r#"<meta name="foswiki.WIKINAME" content="Jane%20Doe" />"#;
    let session = session(&mock_server, meta).await;
    let prefs = session.preferences();

    assert_eq!(prefs.get("MISSING", false).await.unwrap(), None);
    assert_eq!(prefs.resolved().get("MISSING"), Some(&None));

    assert_eq!(prefs.get("WIKINAME", false).await.unwrap().as_deref(), Some("Jane Doe"));

    // A cached miss is final even when remote lookups are allowed.
    assert_eq!(prefs.get("MISSING", true).await.unwrap(), None);
}

#[tokio::test]
async fn test_open_binds_session_to_fetched_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bin/view/Sandbox/WebHome"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><meta name="foswiki.WEB" content="Sandbox" /></head><body></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let client = FoswikiClient::builder()
        .base_url(mock_server.uri())
        .build()
        .unwrap();
    let session = Session::open(client, "/bin/view/Sandbox/WebHome")
        .await
        .expect("open failed");

    assert_eq!(session.page().location(), "/bin/view/Sandbox/WebHome");
    assert_eq!(session.preferences().get_local("WEB").as_deref(), Some("Sandbox"));
}
