use clap::Args;
use serde_json::json;

use super::open_store;
use crate::cli::OutputFormat;
use crate::database::{seed, Store};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[arg(long, help = "Also overwrite the home page with default content")]
    pub force: bool,
}

pub async fn handle(args: SeedArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store().await?;

    let result = async {
        let report = seed::reconcile(store.as_ref()).await?;
        if args.force && !report.home_created {
            seed::reset_home(store.as_ref()).await?;
        }
        Ok::<_, anyhow::Error>(report)
    }
    .await;
    store.close().await;
    let report = result?;

    output_format.print(
        &format!(
            "Starter shift: {}. Home content: {}.",
            if report.shift_created { "created" } else { "present" },
            if report.home_created {
                "created"
            } else if args.force {
                "reset to defaults"
            } else {
                "present"
            },
        ),
        json!({
            "shiftCreated": report.shift_created,
            "homeCreated": report.home_created,
            "homeReset": args.force && !report.home_created,
        }),
    );
    Ok(())
}
