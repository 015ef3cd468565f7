//! Id command - print a fresh unique id.

use anyhow::Result;

use super::Context;

/// Run the id command.
pub fn run(ctx: &Context) -> Result<()> {
    let id = foswiki_client::unique_id();
    if ctx.json_output {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("{}", id);
    }
    Ok(())
}
