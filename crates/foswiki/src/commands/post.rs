//! Post command - submit a form with the page's validation token.

use anyhow::Result;
use clap::Args;
use console::Style;
use foswiki_client::{FormData, PostOutcome};

use super::{Context, parse_key_val};

/// Arguments for the post command.
#[derive(Args, Debug)]
pub struct PostArgs {
    /// Script to post to (e.g. save, rename)
    pub script: String,

    /// Web field of the form
    #[arg(long)]
    pub web: Option<String>,

    /// Topic field of the form
    #[arg(long)]
    pub topic: Option<String>,

    /// Form fields as key=value
    #[arg(value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,
}

/// Run the post command.
pub async fn run(args: PostArgs, ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;

    let mut payload: FormData = args.fields.into_iter().collect();
    if let Some(web) = args.web {
        payload.set("web", web);
    }
    if let Some(topic) = args.topic {
        payload.set("topic", topic);
    }

    tracing::debug!(script = %args.script, fields = payload.len(), "posting form");
    let outcome = session.forms().post(&args.script, payload).await?;

    match outcome {
        PostOutcome::Completed(response) => {
            if ctx.json_output {
                println!(
                    "{}",
                    serde_json::json!({
                        "outcome": "completed",
                        "status": response.status,
                        "body": response.body,
                    })
                );
            } else {
                let green = Style::new().green();
                println!("{} {} ({})", green.apply_to("✓"), args.script, response.status);
                if ctx.verbose {
                    println!("{}", response.body);
                }
            }
        }
        PostOutcome::ConfirmationRequired(dialog) => {
            if ctx.json_output {
                println!(
                    "{}",
                    serde_json::json!({ "outcome": "confirmation_required", "dialog": dialog })
                );
            } else {
                let yellow = Style::new().yellow().bold();
                println!("{} {}", yellow.apply_to("?"), dialog.title);
                println!("{}", dialog.html);
            }
        }
    }
    Ok(())
}
