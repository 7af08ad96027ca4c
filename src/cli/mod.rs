pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "coursemart")]
#[command(about = "Coursemart CLI - operator tools for the course marketplace API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a signed bearer token for local development")]
    Token(commands::token::TokenArgs),

    #[command(about = "Validate a course payload file (JSON or YAML) offline")]
    Validate(commands::validate::ValidateArgs),

    #[command(about = "Browse the live catalog with filters and sorting")]
    Browse(commands::browse::BrowseArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Validate(args) => commands::validate::handle(args, output_format),
        Commands::Browse(args) => commands::browse::handle(args, output_format).await,
    }
}
