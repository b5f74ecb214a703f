pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "novator")]
#[command(about = "Novator CLI - maintenance commands for the camp CMS database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create an admin-panel account (no-op when the email exists)")]
    CreateAdmin(commands::admin::CreateAdminArgs),

    #[command(about = "Create the starter shift and home content when missing")]
    Seed(commands::seed::SeedArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Prints `text` or the JSON value depending on the format.
    pub fn print(self, text: &str, json: serde_json::Value) {
        match self {
            OutputFormat::Text => println!("{}", text),
            OutputFormat::Json => println!("{}", json),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::CreateAdmin(args) => commands::admin::handle(args, output_format).await,
        Commands::Seed(args) => commands::seed::handle(args, output_format).await,
    }
}
