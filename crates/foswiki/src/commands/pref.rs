//! Pref command - resolve a preference.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the pref command.
#[derive(Args, Debug)]
pub struct PrefArgs {
    /// Preference name (e.g. SKIN, WEB, SCRIPTURLPATH)
    pub key: String,

    /// Ask the server when the page does not define it
    #[arg(short, long)]
    pub remote: bool,
}

/// Run the pref command.
pub async fn run(args: PrefArgs, ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    let value = session.preferences().get(&args.key, args.remote).await?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "key": args.key, "value": value })
        );
        return Ok(());
    }

    match value {
        Some(value) => println!("{}", value),
        None => {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("{} is not set", args.key)));
        }
    }
    Ok(())
}
