//! Ready command - run the page's ready behaviors.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the ready command.
#[derive(Args, Debug)]
pub struct ReadyArgs {}

/// Run the ready command.
pub async fn run(_args: ReadyArgs, ctx: &Context) -> Result<()> {
    if ctx.page.is_none() {
        anyhow::bail!("no page given; pass --page or set session.page in the config");
    }

    let session = ctx.session().await?;
    let report = session.ready();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let label = Style::new().bold();
    println!("{} {}", label.apply_to("body:"), report.body_classes.join(" "));
    for attachments in &report.attachments {
        println!("{} {}", label.apply_to("attachments:"), attachments.label);
    }
    if let Some(banner) = &report.results_banner {
        println!("{} {}", label.apply_to("results:"), banner);
    }
    if let Some(focus) = &report.focus {
        println!("{} {}", label.apply_to("focus:"), focus);
    }
    if report.suppress_enter {
        println!("{} enter suppressed", label.apply_to("keys:"));
    }
    if report.change_form_button {
        println!("{} change form disables validation", label.apply_to("form:"));
    }
    Ok(())
}
