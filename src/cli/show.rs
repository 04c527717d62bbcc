use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show configuration, credentials and token paths
    Paths,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<()> {
        match self {
            ShowResource::Paths => show_paths(),
        }
    }
}

fn show_paths() -> Result<()> {
    let config_path = Config::config_file()?;
    let config = Config::read()?;

    info!(path = ?config_path, "Config path");
    info!(path = ?config.credentials_path, "Credentials path");
    info!(path = ?config.token_path, "Token path");

    Ok(())
}
