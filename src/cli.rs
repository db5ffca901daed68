use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "tapepivot")]
#[command(about = "Done-trade pivot aggregation server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8888)]
        port: u16,
    },
    /// Show tape data status
    Status,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port).await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
    }
}
