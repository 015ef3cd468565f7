//! Client SDK for the Foswiki wiki.
//!
//! This crate gives programs the helpers Foswiki pages give their scripts:
//! preference lookup, script URL construction and validated form posts.
//!
//! # Example
//!
//! ```no_run
//! use foswiki_client::{FormData, FoswikiClient, PostOutcome, Result, Session};
//!
//! # async fn example() -> Result<()> {
//! let client = FoswikiClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! // Bind a session to a rendered topic
//! let session = Session::open(client, "/bin/view/Sandbox/WebHome").await?;
//!
//! // Preferences come from the page first, then (if allowed) the server
//! let web = session.preferences().get("WEB", false).await?;
//! println!("web: {:?}", web);
//!
//! // Post with the page's validation token
//! let payload = FormData::new()
//!     .with("web", "Sandbox")
//!     .with("topic", "TestTopic")
//!     .with("text", "Hello");
//! match session.forms().post("save", payload).await? {
//!     PostOutcome::Completed(response) => println!("saved ({})", response.status),
//!     PostOutcome::ConfirmationRequired(dialog) => println!("{}", dialog.html),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **preferences**: cache → meta tag → server resolution
//! - **script_url**: script URLs from `SCRIPTURL`/`SCRIPTURLPATH`
//! - **forms**: validated posts and confirmation handling
//! - **page**: the document a session is bound to
//! - **ready**: one-shot page behaviors

pub mod api;
pub mod client;
pub mod error;
pub mod forms;
pub mod page;
pub mod preferences;
pub mod ready;
pub mod script_url;
pub mod session;
pub mod types;
pub mod util;
pub mod validation;

pub use client::{ClientBuilder, FoswikiClient};
pub use error::{Error, Result};
pub use forms::{
    CONFIRMATION_REQUIRED, ConfirmationDialog, ConfirmationPresenter, LogPresenter, PostOutcome,
};
pub use page::{MetaSource, Page};
pub use preferences::{PreferenceCache, PreferenceResolver};
pub use ready::ReadyReport;
pub use script_url::{ScriptUrl, build_script_url};
pub use session::{Session, SessionBuilder};
pub use types::{FormData, TextResponse};
pub use util::unique_id;
pub use validation::{TokenTransform, ValidationToken};
