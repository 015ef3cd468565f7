//! Url command - build a script URL.

use anyhow::Result;
use clap::Args;

use super::{Context, parse_key_val};

/// Arguments for the url command.
#[derive(Args, Debug)]
pub struct UrlArgs {
    /// Script name (e.g. view, edit, save)
    pub script: String,

    /// Web the script acts on
    #[arg(long)]
    pub web: Option<String>,

    /// Topic the script acts on
    #[arg(long)]
    pub topic: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Build a server-relative path from SCRIPTURLPATH
    #[arg(long)]
    pub relative: bool,
}

/// Run the url command.
pub async fn run(args: UrlArgs, ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    let scripts = session.scripts();
    let (web, topic) = (args.web.as_deref(), args.topic.as_deref());

    let url = if args.relative {
        scripts.url_path(&args.script, web, topic, &args.params)
    } else {
        scripts.url(&args.script, web, topic, &args.params)
    };

    if ctx.json_output {
        println!("{}", serde_json::json!({ "url": url }));
    } else {
        println!("{}", url);
    }
    Ok(())
}
