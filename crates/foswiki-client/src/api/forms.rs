//! Forms API.

use crate::error::Result;
use crate::forms::PostOutcome;
use crate::session::Session;
use crate::types::FormData;

/// Forms API client.
pub struct FormsApi {
    session: Session,
}

impl FormsApi {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Post `payload` to `script` with the page's validation token.
    ///
    /// A confirmation request is presented and returned as
    /// [`PostOutcome::ConfirmationRequired`]; other failures come back as
    /// errors carrying the untouched response.
    pub async fn post(&self, script: &str, payload: FormData) -> Result<PostOutcome> {
        self.session.poster().post(script, payload).await
    }
}
