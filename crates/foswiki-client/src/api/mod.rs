//! Session-scoped API handles.

mod forms;
mod preferences;
mod scripts;

pub use forms::FormsApi;
pub use preferences::PreferencesApi;
pub use scripts::ScriptsApi;
