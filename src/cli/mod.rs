mod auth;
mod invoke;
mod serve;
mod show;

use crate::error::Result;
use clap::{Parser, Subcommand};

pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "cell-incrementer")]
#[command(about = "Increment a Google Sheets cell on every invocation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Runs as a Lambda function when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            None | Some(Commands::Serve) => serve::execute().await,
            Some(Commands::Invoke { target }) => invoke::execute(target).await,
            Some(Commands::Auth { reset }) => auth::execute(*reset).await,
            Some(Commands::Show { resource }) => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle invocations from the Lambda runtime
    Serve,
    /// Run the handler once for a target cell
    Invoke {
        /// Cell to increment, e.g. B2
        #[arg(long)]
        target: String,
    },
    /// Authorize with Google and cache the token
    Auth {
        /// Discard the cached token first
        #[arg(long)]
        reset: bool,
    },
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
